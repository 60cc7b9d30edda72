use crate::error::DriverError;
use crate::fmt::debug;

/// Number of GPIO pins on the MCP23S08.
pub const PIN_COUNT: u8 = 8;

/// The possible configurations of a pin. [PinMode::InputPullup]
/// uses the 100k internal pullup resistor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Floating input
    Input,
    /// Digital output
    Output,
    /// Pulled-up input
    InputPullup,
}

impl PinMode {
    /// Direction bit in driver sense (1 = output).
    pub const fn is_output(self) -> bool {
        matches!(self, PinMode::Output)
    }

    /// Whether the 100k pull-up is enabled in this mode.
    pub const fn has_pullup(self) -> bool {
        matches!(self, PinMode::InputPullup)
    }
}

/// What to do with a pin index outside `0..PIN_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinPolicy {
    /// Reads return `false`, writes and mode changes do nothing.
    #[default]
    Ignore,
    /// Return [`DriverError::InvalidPin`].
    Strict,
}

impl PinPolicy {
    /// Returns the bit mask for `pin`, or `None` if the operation should be skipped.
    ///
    /// No SPI transaction may be issued when this returns `None` or an error.
    pub(crate) fn mask(self, pin: u8) -> Result<Option<u8>, DriverError> {
        if pin < PIN_COUNT {
            return Ok(Some(pin_mask(pin)));
        }
        debug!("pin {=u8} out of range ({:?})", pin, self);
        match self {
            PinPolicy::Ignore => Ok(None),
            PinPolicy::Strict => Err(DriverError::InvalidPin(pin)),
        }
    }
}

#[inline]
pub(crate) fn pin_mask(pin: u8) -> u8 {
    0b1 << pin
}

/// Set or clear the bits of `mask` in `value`.
#[inline]
pub(crate) fn update_bits(value: u8, mask: u8, set: bool) -> u8 {
    if set {
        value | mask
    } else {
        value & !mask
    }
}
