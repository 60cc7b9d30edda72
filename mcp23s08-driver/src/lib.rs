#![cfg_attr(not(test), no_std)]

//! # MCP23S08 driver
//!
//! A driver for the MCP23S08 8 bit I/O expander which is accessed over an SPI bus.
//!
//! Every call is translated into one or more register transactions of the form
//! `[opcode, register, data]`, framed by chip select. The opcode is
//! `0b0100_0AAR`, where `AA` is the address strapped on pins A1/A0 and `R` is
//! set for reads.
//!
//! ## Bus setup
//!
//! embedded-hal carries no runtime bus settings, so configure the SPI
//! peripheral with [`SPI_MODE`], MSB first and at most [`SPI_FREQUENCY_HZ`]
//! before handing it to the driver.
//!
//! ## Example usage
//!
//! ```ignore
//! // spi implements SpiBus and cs implements OutputPin from embedded_hal >= 1.0.0
//! let mut expander = mcp23s08_driver::Mcp23s08::new(spi, cs);
//! expander.begin()?;
//!
//! // Configure pin GP0 as an output and set it high
//! expander.pin_mode(0, mcp23s08_driver::PinMode::Output)?;
//! expander.write(0, true)?;
//!
//! // Configure pin GP1 as a pullup input and read its level
//! expander.pin_mode(1, mcp23s08_driver::PinMode::InputPullup)?;
//! let is_high = expander.read(1)?;
//! ```
//!
//! With an `SpiDevice` (which handles chip select and bus sharing itself) use
//! [`Mcp23s08::from_device`], or [`asynch::Mcp23s08Async`] under
//! `embedded-hal-async`.
//!
//! ## Features
//!
//! - `async` (default): the [`asynch`] module.
//! - `defmt`: `defmt::Format` on public types and register tracing.

mod fmt;

mod driver;
mod error;
pub mod interface;
mod pins;
pub mod registers;

#[cfg(feature = "async")]
pub mod asynch;

pub use driver::Mcp23s08;
pub use error::DriverError;
pub use interface::{BusInterface, DeviceInterface, RegisterInterface};
pub use pins::{PinMode, PinPolicy, PIN_COUNT};
pub use registers::{Iocon, Opcode, Register};

/// Maximum SPI clock supported by the MCP23S08.
pub const SPI_FREQUENCY_HZ: u32 = 10_000_000;

/// The MCP23S08 samples on the rising edge with the clock idling low.
pub const SPI_MODE: embedded_hal::spi::Mode = embedded_hal::spi::MODE_0;
