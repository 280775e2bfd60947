//! Second stage boot loader core that takes an Intel HEX image over a serial
//! line and writes it straight into memory, plus the host side tools that
//! prepare and check images for it.
//!
//! The device side is [`Decoder`] and [`Loader`], which need neither `alloc`
//! nor `std`. A board provides [`hal::Platform`] and calls [`boot`].

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod checksum;
pub mod decoder;
pub mod error;
pub mod hal;
#[cfg(feature = "alloc")]
pub mod hosted;
pub mod ihex;
#[cfg(feature = "alloc")]
pub mod lint;
pub mod loader;
pub mod nibble;
pub mod parser;
pub mod serializer;
pub mod types;

pub use decoder::{Decoder, Event};
pub use error::{ParseError, SerializeError};
pub use ihex::Record;
pub use loader::{boot, Config, Jump, Loader};
pub use parser::Parser;
#[cfg(feature = "alloc")]
pub use serializer::encode_image;
