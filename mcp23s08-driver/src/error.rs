use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// The SPI bus failed during a read transaction
    SpiRead,
    /// The SPI bus failed during a write transaction
    SpiWrite,
    /// Driving the chip select line failed
    ChipSelect,
    /// Pin index outside 0..8, only raised with `PinPolicy::Strict`
    InvalidPin(u8),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::SpiRead => write!(f, "SPI read failed"),
            DriverError::SpiWrite => write!(f, "SPI write failed"),
            DriverError::ChipSelect => write!(f, "could not drive chip select"),
            DriverError::InvalidPin(pin) => write!(f, "pin {} out of range 0..8", pin),
        }
    }
}
