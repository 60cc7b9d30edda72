//! Asynchronous driver for use with `embedded-hal-async` (e.g. under embassy).
//!
//! Frames, transaction order and pin policy are the same as for the blocking
//! [`Mcp23s08`](crate::Mcp23s08). Chip select is handled by the `SpiDevice`.

use embedded_hal_async::spi::SpiDevice;

use crate::error::DriverError;
use crate::fmt::trace;
use crate::pins::{update_bits, PinMode, PinPolicy};
use crate::registers::{iodir_to_mode, mode_to_iodir, Iocon, Opcode, Register};

pub struct Mcp23s08Async<SPI> {
    spi: SPI,
    opcode: Opcode,
    policy: PinPolicy,
}

impl<SPI: SpiDevice> Mcp23s08Async<SPI> {
    /// Create an MCP23S08 instance. `address` is the A1/A0 strapping.
    pub fn new(spi: SPI, address: u8) -> Self {
        Mcp23s08Async {
            spi,
            opcode: Opcode::new(address),
            policy: PinPolicy::default(),
        }
    }

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

    pub async fn write_register(&mut self, register: Register, value: u8) -> Result<(), DriverError> {
        trace!("write {:?} <- {=u8:#x}", register, value);
        let frame = self.opcode.write_frame(register, value);
        self.spi
            .write(&frame)
            .await
            .map_err(|_| DriverError::SpiWrite)
    }

    pub async fn read_register(&mut self, register: Register) -> Result<u8, DriverError> {
        let mut frame = self.opcode.read_frame(register);
        self.spi
            .transfer_in_place(&mut frame)
            .await
            .map_err(|_| DriverError::SpiRead)?;
        trace!("read {:?} -> {=u8:#x}", register, frame[2]);
        Ok(frame[2])
    }

    /// Returns the digital value present at the pin as a [bool] `(true == HIGH)`.
    pub async fn read(&mut self, pin: u8) -> Result<bool, DriverError> {
        match self.policy.mask(pin)? {
            Some(mask) => Ok(self.input().await? & mask != 0),
            None => Ok(false),
        }
    }

    pub async fn write(&mut self, pin: u8, state: bool) -> Result<(), DriverError> {
        let Some(mask) = self.policy.mask(pin)? else {
            return Ok(());
        };
        let latch = self.output().await?;
        self.set_output(update_bits(latch, mask, state)).await
    }

    /// Configure the pin with a given [PinMode]
    pub async fn pin_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), DriverError> {
        let Some(mask) = self.policy.mask(pin)? else {
            return Ok(());
        };
        let direction = self.mode().await?;
        self.set_mode(update_bits(direction, mask, mode.is_output()))
            .await?;
        let pullup = self.pullup().await?;
        self.set_pullup(update_bits(pullup, mask, mode.has_pullup()))
            .await
    }

    pub async fn set_mode(&mut self, mode: u8) -> Result<(), DriverError> {
        self.write_register(Register::IODIR, mode_to_iodir(mode))
            .await
    }

    pub async fn mode(&mut self) -> Result<u8, DriverError> {
        Ok(iodir_to_mode(self.read_register(Register::IODIR).await?))
    }

    pub async fn set_output(&mut self, state: u8) -> Result<(), DriverError> {
        self.write_register(Register::OLAT, state).await
    }

    pub async fn output(&mut self) -> Result<u8, DriverError> {
        self.read_register(Register::OLAT).await
    }

    pub async fn input(&mut self) -> Result<u8, DriverError> {
        self.read_register(Register::GPIO).await
    }

    pub async fn set_pullup(&mut self, state: u8) -> Result<(), DriverError> {
        self.write_register(Register::GPPU, state).await
    }

    pub async fn pullup(&mut self) -> Result<u8, DriverError> {
        self.read_register(Register::GPPU).await
    }

    pub async fn set_polarity(&mut self, polarity: u8) -> Result<(), DriverError> {
        self.write_register(Register::IPOL, polarity).await
    }

    pub async fn polarity(&mut self) -> Result<u8, DriverError> {
        self.read_register(Register::IPOL).await
    }

    pub async fn set_config(&mut self, config: Iocon) -> Result<(), DriverError> {
        self.write_register(Register::IOCON, config.bits()).await
    }

    pub async fn config(&mut self) -> Result<Iocon, DriverError> {
        Ok(Iocon::from_bits_truncate(
            self.read_register(Register::IOCON).await?,
        ))
    }

    /// Set `IOCON.HAEN` using the address 0 opcode, see
    /// [`Mcp23s08::enable_hardware_address`](crate::Mcp23s08::enable_hardware_address).
    pub async fn enable_hardware_address(&mut self) -> Result<(), DriverError> {
        let broadcast = Opcode::default();
        let mut frame = broadcast.read_frame(Register::IOCON);
        self.spi
            .transfer_in_place(&mut frame)
            .await
            .map_err(|_| DriverError::SpiRead)?;
        let config = Iocon::from_bits_truncate(frame[2]) | Iocon::HAEN;
        self.spi
            .write(&broadcast.write_frame(Register::IOCON, config.bits()))
            .await
            .map_err(|_| DriverError::SpiWrite)
    }

    pub async fn reset(&mut self) -> Result<(), DriverError> {
        self.write_register(Register::IODIR, 0xFF).await?;
        for register in &Register::ALL[1..] {
            self.write_register(*register, 0x00).await?;
        }
        Ok(())
    }

    // Destroys the driver and releases the peripherals
    pub fn release(self) -> SPI {
        self.spi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    fn write(frame: [u8; 3]) -> Vec<SpiTransaction<u8>> {
        vec![
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(frame.to_vec()),
            SpiTransaction::transaction_end(),
        ]
    }

    fn read(frame: [u8; 3], reply: u8) -> Vec<SpiTransaction<u8>> {
        vec![
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer_in_place(frame.to_vec(), vec![0x00, 0x00, reply]),
            SpiTransaction::transaction_end(),
        ]
    }

    #[async_std::test]
    async fn write_pin_test() {
        let expectations = [
            read([0x43, 0x0A, 0x00], 0b0000_0001),
            write([0x42, 0x0A, 0b0100_0001]),
        ]
        .concat();
        let spi = SpiMock::new(&expectations);

        let mut driver = Mcp23s08Async::new(spi, 1);
        driver.write(6, true).await.unwrap();

        let mut spi = driver.release();
        spi.done();
    }

    #[async_std::test]
    async fn read_pin_test() {
        let spi = SpiMock::new(&read([0x41, 0x09, 0x00], 0b1000_0000));

        let mut driver = Mcp23s08Async::new(spi, 0);
        assert!(driver.read(7).await.unwrap());
        // Out of range, no transaction
        assert!(!driver.read(8).await.unwrap());

        let mut spi = driver.release();
        spi.done();
    }

    #[async_std::test]
    async fn pin_mode_test() {
        let expectations = [
            read([0x41, 0x00, 0x00], 0xFF),
            write([0x40, 0x00, 0b0111_1111]),
            read([0x41, 0x06, 0x00], 0x80),
            write([0x40, 0x06, 0x00]),
        ]
        .concat();
        let spi = SpiMock::new(&expectations);

        let mut driver = Mcp23s08Async::new(spi, 0);
        driver.pin_mode(7, PinMode::Output).await.unwrap();

        let mut spi = driver.release();
        spi.done();
    }

    #[async_std::test]
    async fn strict_policy_test() {
        let spi = SpiMock::new(&[]);

        let mut driver = Mcp23s08Async::new(spi, 0).with_policy(PinPolicy::Strict);
        assert_eq!(
            driver.pin_mode(8, PinMode::InputPullup).await,
            Err(DriverError::InvalidPin(8))
        );
        assert_eq!(driver.write(12, false).await, Err(DriverError::InvalidPin(12)));

        let mut spi = driver.release();
        spi.done();
    }

    #[async_std::test]
    async fn reset_test() {
        let mut expectations = write([0x46, 0x00, 0xFF]);
        for addr in 0x01..=0x0A {
            expectations.extend(write([0x46, addr, 0x00]));
        }
        let spi = SpiMock::new(&expectations);

        let mut driver = Mcp23s08Async::new(spi, 3);
        driver.reset().await.unwrap();

        let mut spi = driver.release();
        spi.done();
    }

    #[async_std::test]
    async fn hardware_address_test() {
        let expectations = [
            read([0x41, 0x05, 0x00], 0b0010_0000),
            write([0x40, 0x05, 0b0010_1000]),
        ]
        .concat();
        let spi = SpiMock::new(&expectations);

        // Configured for address 3, HAEN still goes out on address 0
        let mut driver = Mcp23s08Async::new(spi, 3);
        driver.enable_hardware_address().await.unwrap();

        let mut spi = driver.release();
        spi.done();
    }

    #[async_std::test]
    async fn bulk_mode_test() {
        let expectations = [
            write([0x42, 0x00, 0b1100_0011]),
            read([0x43, 0x00, 0x00], 0b1100_0011),
        ]
        .concat();
        let spi = SpiMock::new(&expectations);

        let mut driver = Mcp23s08Async::new(spi, 1);
        driver.set_mode(0b0011_1100).await.unwrap();
        assert_eq!(driver.mode().await.unwrap(), 0b0011_1100);

        let mut spi = driver.release();
        spi.done();
    }

    #[async_std::test]
    async fn bulk_registers_test() {
        let expectations = [
            write([0x40, 0x0A, 0xAA]),
            read([0x41, 0x0A, 0x00], 0xAA),
            write([0x40, 0x06, 0x0F]),
            read([0x41, 0x06, 0x00], 0x0F),
            write([0x40, 0x01, 0x80]),
            read([0x41, 0x01, 0x00], 0x80),
            write([0x40, 0x05, 0b0010_0010]),
            read([0x41, 0x05, 0x00], 0b1110_0011),
            read([0x41, 0x09, 0x00], 0x5A),
        ]
        .concat();
        let spi = SpiMock::new(&expectations);

        let mut driver = Mcp23s08Async::new(spi, 0);
        driver.set_output(0xAA).await.unwrap();
        assert_eq!(driver.output().await.unwrap(), 0xAA);
        driver.set_pullup(0x0F).await.unwrap();
        assert_eq!(driver.pullup().await.unwrap(), 0x0F);
        driver.set_polarity(0x80).await.unwrap();
        assert_eq!(driver.polarity().await.unwrap(), 0x80);
        driver.set_config(Iocon::SEQOP | Iocon::INTPOL).await.unwrap();
        assert_eq!(driver.config().await.unwrap(), Iocon::SEQOP | Iocon::INTPOL);
        assert_eq!(driver.input().await.unwrap(), 0x5A);

        let mut spi = driver.release();
        spi.done();
    }

    #[async_std::test]
    async fn set_policy_test() {
        let spi = SpiMock::new(&[]);

        let mut driver = Mcp23s08Async::new(spi, 0);
        assert_eq!(driver.policy(), PinPolicy::Ignore);
        driver.write(8, true).await.unwrap();

        driver.set_policy(PinPolicy::Strict);
        assert_eq!(driver.policy(), PinPolicy::Strict);
        assert_eq!(driver.read(8).await, Err(DriverError::InvalidPin(8)));

        let mut spi = driver.release();
        spi.done();
    }
}
