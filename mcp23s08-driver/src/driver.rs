use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{SpiBus, SpiDevice};

use crate::error::DriverError;
use crate::fmt::trace;
use crate::interface::{BusInterface, DeviceInterface, RegisterInterface};
use crate::pins::{update_bits, PinMode, PinPolicy};
use crate::registers::{iodir_to_mode, mode_to_iodir, Iocon, Opcode, Register};

/// A structure that represents an instance of the MCP23S08 I/O expander chip.
///
/// Every method performs fresh SPI transactions, nothing is cached. Single bit
/// updates are read-modify-write and are not atomic against other masters
/// changing the same register.
pub struct Mcp23s08<I> {
    interface: I,
    opcode: Opcode,
    policy: PinPolicy,
}

impl<SPI, CS> Mcp23s08<BusInterface<SPI, CS>>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Create a driver for a chip at hardware address 0 that owns `cs`.
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self::with_address(spi, cs, 0)
    }

    /// Create a driver for a chip whose A1/A0 pins are strapped to `address`.
    ///
    /// Only the low two bits of `address` are used. The chip ignores the
    /// straps until [`Mcp23s08::enable_hardware_address`] has been called.
    pub fn with_address(spi: SPI, cs: CS, address: u8) -> Self {
        Self::from_interface(BusInterface::new(spi, cs), address)
    }

    // Destroys the driver and releases the peripherals
    pub fn release(self) -> (SPI, CS) {
        self.interface.release()
    }
}

impl<SPI: SpiDevice> Mcp23s08<DeviceInterface<SPI>> {
    /// Create a driver on an `SpiDevice`, which handles chip select.
    pub fn from_device(spi: SPI, address: u8) -> Self {
        Self::from_interface(DeviceInterface::new(spi), address)
    }

    pub fn release(self) -> SPI {
        self.interface.release()
    }
}

impl<I: RegisterInterface> Mcp23s08<I> {
    pub fn from_interface(interface: I, address: u8) -> Self {
        Mcp23s08 {
            interface,
            opcode: Opcode::new(address),
            policy: PinPolicy::default(),
        }
    }

    /// Use `policy` for out-of-range pin indices.
    pub fn with_policy(mut self, policy: PinPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: PinPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> PinPolicy {
        self.policy
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// This should be called once after power up, before any other method.
    pub fn begin(&mut self) -> Result<(), DriverError> {
        self.interface.init()
    }

    /// Write `value` to `register` in a single transaction.
    pub fn write_register(&mut self, register: Register, value: u8) -> Result<(), DriverError> {
        trace!("write {:?} <- {=u8:#x}", register, value);
        let frame = self.opcode.write_frame(register, value);
        self.interface.write_frame(&frame)
    }

    /// Read `register` in a single transaction.
    pub fn read_register(&mut self, register: Register) -> Result<u8, DriverError> {
        let mut frame = self.opcode.read_frame(register);
        self.interface.transfer_frame(&mut frame)?;
        trace!("read {:?} -> {=u8:#x}", register, frame[2]);
        Ok(frame[2])
    }

    /// Returns the level present at `pin` (`true == HIGH`).
    pub fn read(&mut self, pin: u8) -> Result<bool, DriverError> {
        match self.policy.mask(pin)? {
            Some(mask) => Ok(self.input()? & mask != 0),
            None => Ok(false),
        }
    }

    /// Drive the output latch of `pin` to `state`, leaving the other pins as they are.
    pub fn write(&mut self, pin: u8, state: bool) -> Result<(), DriverError> {
        let Some(mask) = self.policy.mask(pin)? else {
            return Ok(());
        };
        let latch = self.output()?;
        self.set_output(update_bits(latch, mask, state))
    }

    /// Configure `pin` with a given [PinMode].
    ///
    /// | mode                     | direction | pull-up  |
    /// |--------------------------|:---------:|:--------:|
    /// | [`PinMode::Input`]       |  input    | disabled |
    /// | [`PinMode::Output`]      |  output   | disabled |
    /// | [`PinMode::InputPullup`] |  input    | enabled  |
    pub fn pin_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), DriverError> {
        let Some(mask) = self.policy.mask(pin)? else {
            return Ok(());
        };
        let direction = self.mode()?;
        self.set_mode(update_bits(direction, mask, mode.is_output()))?;
        let pullup = self.pullup()?;
        self.set_pullup(update_bits(pullup, mask, mode.has_pullup()))
    }

    /// Set the direction of all pins. 1 = output, 0 = input.
    pub fn set_mode(&mut self, mode: u8) -> Result<(), DriverError> {
        self.write_register(Register::IODIR, mode_to_iodir(mode))
    }

    /// Get the direction of all pins. 1 = output, 0 = input.
    pub fn mode(&mut self) -> Result<u8, DriverError> {
        Ok(iodir_to_mode(self.read_register(Register::IODIR)?))
    }

    /// Set the output latches. 1 = high.
    pub fn set_output(&mut self, state: u8) -> Result<(), DriverError> {
        self.write_register(Register::OLAT, state)
    }

    /// Read output latches. This essentially reads the values set from
    /// calling `set_output()`
    pub fn output(&mut self) -> Result<u8, DriverError> {
        self.read_register(Register::OLAT)
    }

    /// Read the level of all pins.
    pub fn input(&mut self) -> Result<u8, DriverError> {
        self.read_register(Register::GPIO)
    }

    /// Set the pull-ups. A value of 1 enables the 100KOhm pull-up.
    pub fn set_pullup(&mut self, state: u8) -> Result<(), DriverError> {
        self.write_register(Register::GPPU, state)
    }

    pub fn pullup(&mut self) -> Result<u8, DriverError> {
        self.read_register(Register::GPPU)
    }

    /// Set polarity allows inverting the values from input pins. A
    /// value of 1 will flip the polarity.
    pub fn set_polarity(&mut self, polarity: u8) -> Result<(), DriverError> {
        self.write_register(Register::IPOL, polarity)
    }

    pub fn polarity(&mut self) -> Result<u8, DriverError> {
        self.read_register(Register::IPOL)
    }

    pub fn set_config(&mut self, config: Iocon) -> Result<(), DriverError> {
        self.write_register(Register::IOCON, config.bits())
    }

    pub fn config(&mut self) -> Result<Iocon, DriverError> {
        Ok(Iocon::from_bits_truncate(
            self.read_register(Register::IOCON)?,
        ))
    }

    /// Set `IOCON.HAEN` so the chip honours its A1/A0 address straps.
    ///
    /// While HAEN is clear every MCP23S08 on the bus answers to address 0, so
    /// this is sent with the address 0 opcode regardless of the configured
    /// address. Devices sharing the chip select all receive it.
    pub fn enable_hardware_address(&mut self) -> Result<(), DriverError> {
        let broadcast = Opcode::default();
        let mut frame = broadcast.read_frame(Register::IOCON);
        self.interface.transfer_frame(&mut frame)?;
        let config = Iocon::from_bits_truncate(frame[2]) | Iocon::HAEN;
        let frame = broadcast.write_frame(Register::IOCON, config.bits());
        self.interface.write_frame(&frame)
    }

    /// Restore the power-on register values: all pins input, everything else 0.
    pub fn reset(&mut self) -> Result<(), DriverError> {
        self.write_register(Register::IODIR, 0xFF)?;
        for register in &Register::ALL[1..] {
            self.write_register(*register, 0x00)?;
        }
        Ok(())
    }
}
