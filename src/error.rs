use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    MissingColon,
    TooShort,
    BadHex,
    BadChecksum(u8, u8),
    BadLength,
    BadType,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingColon => f.write_str("record does not start with ':'"),
            ParseError::TooShort => f.write_str("record is shorter than its header"),
            ParseError::BadHex => f.write_str("record contains a non-hex character"),
            ParseError::BadChecksum(computed, expected) => write!(
                f,
                "checksum mismatch: computed {:02X}, record says {:02X}",
                computed, expected
            ),
            ParseError::BadLength => f.write_str("payload length does not match byte count"),
            ParseError::BadType => f.write_str("unknown record type"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializeError {
    BufferTooSmall { needed: usize },
    /// The address cannot be reached with a 16-bit offset and an extended
    /// segment address.
    OutOfRange(u32),
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeError::BufferTooSmall { needed } => {
                write!(f, "output buffer too small, need {} bytes", needed)
            }
            SerializeError::OutOfRange(address) => {
                write!(f, "address {:#x} is beyond the 1 MiB segment range", address)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SerializeError {}
