//! Transports that put a 3-byte register frame on the wire.
//!
//! [`BusInterface`] owns the chip select line and drives it around every
//! frame. Use it when the HAL only hands out an `SpiBus` and the expander is
//! the only device on that bus.
//!
//! [`DeviceInterface`] wraps an `SpiDevice`, which manages chip select and
//! bus locking itself (e.g. `embedded_hal_bus::spi::ExclusiveDevice` or one of
//! the shared bus devices). See
//! [this](https://github.com/rust-embedded/embedded-hal/blob/master/docs/migrating-from-0.2-to-1.0.md#for-end-users)
//! on how to convert a `SpiBus` into a `SpiDevice`.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{SpiBus, SpiDevice};

use crate::error::DriverError;

/// Register-level access to the expander.
///
/// A frame is `[opcode, register, data]`. Implementations must send all three
/// bytes inside one chip select assertion.
pub trait RegisterInterface {
    /// Prepare the transport. Called from `begin()` and may be called again.
    fn init(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    /// Send a write frame.
    fn write_frame(&mut self, frame: &[u8; 3]) -> Result<(), DriverError>;

    /// Send a read frame, the reply byte is clocked into `frame[2]`.
    fn transfer_frame(&mut self, frame: &mut [u8; 3]) -> Result<(), DriverError>;
}

/// An `SpiBus` plus a chip select pin owned by the driver.
pub struct BusInterface<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> BusInterface<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    pub fn new(spi: SPI, cs: CS) -> Self {
        BusInterface { spi, cs }
    }

    fn select(&mut self) -> Result<(), DriverError> {
        self.cs.set_low().map_err(|_| DriverError::ChipSelect)
    }

    fn deselect(&mut self) -> Result<(), DriverError> {
        self.cs.set_high().map_err(|_| DriverError::ChipSelect)
    }

    // Destroys the interface and releases the peripherals
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> RegisterInterface for BusInterface<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    fn init(&mut self) -> Result<(), DriverError> {
        // Idle level, the chip only listens while CS is low
        self.deselect()
    }

    fn write_frame(&mut self, frame: &[u8; 3]) -> Result<(), DriverError> {
        self.select()?;
        let result = self
            .spi
            .write(frame)
            .and_then(|_| self.spi.flush())
            .map_err(|_| DriverError::SpiWrite);
        // Release CS even if the bus failed, the bus error wins
        let deselected = self.deselect();
        result.and(deselected)
    }

    fn transfer_frame(&mut self, frame: &mut [u8; 3]) -> Result<(), DriverError> {
        self.select()?;
        let result = self
            .spi
            .transfer_in_place(frame)
            .and_then(|_| self.spi.flush())
            .map_err(|_| DriverError::SpiRead);
        let deselected = self.deselect();
        result.and(deselected)
    }
}

/// An `SpiDevice` that frames transactions itself.
pub struct DeviceInterface<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> DeviceInterface<SPI> {
    pub fn new(spi: SPI) -> Self {
        DeviceInterface { spi }
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> RegisterInterface for DeviceInterface<SPI> {
    fn write_frame(&mut self, frame: &[u8; 3]) -> Result<(), DriverError> {
        self.spi.write(frame).map_err(|_| DriverError::SpiWrite)
    }

    fn transfer_frame(&mut self, frame: &mut [u8; 3]) -> Result<(), DriverError> {
        self.spi
            .transfer_in_place(frame)
            .map_err(|_| DriverError::SpiRead)
    }
}
