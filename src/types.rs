pub const DATA: u8 = 0x00;
pub const END_OF_FILE: u8 = 0x01;
pub const EXTENDED_SEGMENT_ADDRESS: u8 = 0x02;
pub const START_SEGMENT_ADDRESS: u8 = 0x03;
pub const EXTENDED_LINEAR_ADDRESS: u8 = 0x04;
pub const START_LINEAR_ADDRESS: u8 = 0x05;

/// The record types the loader acts on. Everything else is carried as
/// `Unsupported` and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Data,
    EndOfFile,
    ExtendedSegmentAddress,
    Unsupported(u8),
}

impl From<u8> for RecordKind {
    fn from(record_type: u8) -> Self {
        match record_type {
            DATA => RecordKind::Data,
            END_OF_FILE => RecordKind::EndOfFile,
            EXTENDED_SEGMENT_ADDRESS => RecordKind::ExtendedSegmentAddress,
            other => RecordKind::Unsupported(other),
        }
    }
}
