use bitflags::bitflags;

/// Fixed high bits of the device opcode (`0b0100_0AAR`).
pub const OPCODE_PREFIX: u8 = 0b0100_0000;

const READ_BIT: u8 = 0b0000_0001;
const ADDRESS_MASK: u8 = 0b0000_0011;

/// The register addresses within the device.
///
/// Bit `n` of each register refers to pin `GPn`.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// I/O direction. 1 = input, power-on 0xFF
    IODIR = 0x00,
    /// Input polarity. 1 = GPIO reads the inverted pin level
    IPOL = 0x01,
    /// Interrupt on change enable
    GPINTEN = 0x02,
    /// Default compare value for interrupt on change
    DEFVAL = 0x03,
    /// Interrupt control. 1 = compare against `DEFVAL`, 0 = compare against previous value
    INTCON = 0x04,
    /// Chip configuration, see [`Iocon`]
    IOCON = 0x05,
    /// Internal 100 kOhm pull-ups. 1 = enabled
    GPPU = 0x06,
    /// Interrupt flags (read only)
    INTF = 0x07,
    /// Port value captured at interrupt time (read only)
    INTCAP = 0x08,
    /// Port value. Reading returns the pin levels, writing modifies `OLAT`
    GPIO = 0x09,
    /// Output latch. 1 = high
    OLAT = 0x0A,
}

impl Register {
    /// The complete register map in ascending address order.
    pub const ALL: [Register; 11] = [
        Register::IODIR,
        Register::IPOL,
        Register::GPINTEN,
        Register::DEFVAL,
        Register::INTCON,
        Register::IOCON,
        Register::GPPU,
        Register::INTF,
        Register::INTCAP,
        Register::GPIO,
        Register::OLAT,
    ];

    /// Address byte sent in the second byte of a frame.
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Look up a register by its address.
    pub fn from_addr(addr: u8) -> Option<Register> {
        Register::ALL.get(addr as usize).copied()
    }
}

impl From<Register> for u8 {
    fn from(register: Register) -> u8 {
        register as u8
    }
}

bitflags! {
    /// I/O Expander Configuration Register (`IOCON`) bit definitions.
    ///
    /// Bits 7, 6 and 0 are unimplemented on the MCP23S08 and read as 0.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Iocon: u8 {
        /// Sequential Operation mode bit:
        ///
        ///   1 = Sequential operation disabled, address pointer does not increment.
        ///
        ///   0 = Sequential operation enabled, address pointer increments.
        const SEQOP = 0b0010_0000;

        /// Slew Rate control bit for SDA output (I2C variant only).
        const DISSLW = 0b0001_0000;

        /// Hardware Address Enable bit:
        ///
        ///   1 = Enables the A1/A0 address pins.
        ///
        ///   0 = Disables the address pins, the device answers to address 0.
        const HAEN = 0b0000_1000;

        /// Configures the `INT` pin as an open-drain output.
        const ODR = 0b0000_0100;

        /// Sets the polarity of the `INT` output pin. 1 = active-high.
        const INTPOL = 0b0000_0010;
    }
}

/// The first byte of every SPI frame.
///
/// Holds the fixed prefix and the 2-bit hardware address strapped on pins A1/A0.
/// The read/write bit is filled in per transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Opcode(u8);

impl Opcode {
    /// Build the opcode for `address`. Only the two low bits are used.
    pub const fn new(address: u8) -> Self {
        Opcode(OPCODE_PREFIX | ((address & ADDRESS_MASK) << 1))
    }

    /// The hardware address encoded in this opcode.
    pub const fn address(self) -> u8 {
        (self.0 >> 1) & ADDRESS_MASK
    }

    /// Opcode byte for a write transaction (R bit clear).
    pub const fn write(self) -> u8 {
        self.0
    }

    /// Opcode byte for a read transaction (R bit set).
    pub const fn read(self) -> u8 {
        self.0 | READ_BIT
    }

    pub(crate) const fn write_frame(self, register: Register, value: u8) -> [u8; 3] {
        [self.write(), register.addr(), value]
    }

    pub(crate) const fn read_frame(self, register: Register) -> [u8; 3] {
        [self.read(), register.addr(), 0x00]
    }
}

impl Default for Opcode {
    fn default() -> Self {
        Opcode::new(0)
    }
}

// The driver exposes directions as 1 = output while IODIR uses 1 = input.
// These two functions are the only places where the byte is inverted.

/// Convert a driver direction byte (1 = output) to the `IODIR` value.
pub const fn mode_to_iodir(mode: u8) -> u8 {
    !mode
}

/// Convert an `IODIR` value to a driver direction byte (1 = output).
pub const fn iodir_to_mode(iodir: u8) -> u8 {
    !iodir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_for_each_address() {
        for address in 0..4u8 {
            let opcode = Opcode::new(address);
            assert_eq!(opcode.write(), 0x40 | (address << 1));
            assert_eq!(opcode.read(), 0x40 | (address << 1) | 1);
            assert_eq!(opcode.address(), address);
        }
    }

    #[test]
    fn opcode_masks_address_to_two_bits() {
        assert_eq!(Opcode::new(0b111).write(), 0b0100_0110);
        assert_eq!(Opcode::new(0xFF).address(), 3);
    }

    #[test]
    fn register_map_is_contiguous() {
        for (index, register) in Register::ALL.iter().enumerate() {
            assert_eq!(register.addr() as usize, index);
            assert_eq!(Register::from_addr(index as u8), Some(*register));
        }
        assert_eq!(Register::from_addr(0x0B), None);
        assert_eq!(u8::from(Register::OLAT), 0x0A);
    }

    #[test]
    fn direction_inversion() {
        assert_eq!(mode_to_iodir(0x00), 0xFF);
        assert_eq!(mode_to_iodir(0b0000_0101), 0b1111_1010);
        assert_eq!(iodir_to_mode(0xFF), 0x00);
    }

    #[test]
    fn frames() {
        let opcode = Opcode::new(2);
        assert_eq!(opcode.write_frame(Register::OLAT, 0xAA), [0x44, 0x0A, 0xAA]);
        assert_eq!(opcode.read_frame(Register::GPIO), [0x45, 0x09, 0x00]);
    }
}
