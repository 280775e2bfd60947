//! Checks an image against what the loader will actually do with it.
//!
//! The loader trusts its input, so anything it would silently mishandle is
//! worth catching on the host before the image goes down the wire.

use crate::decoder;
use crate::error::ParseError;
use crate::ihex::Record;
use crate::parser::Parser;
use alloc::vec::Vec;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finding {
    /// Payload is not a whole number of words. The tail is dropped, or with
    /// three bytes left over it is stored together with the checksum byte.
    PartialWord { line: usize, length: u8 },
    /// Words are stored wherever the offset says, aligned or not.
    UnalignedAddress { line: usize, offset: u16 },
    /// The loader ORs the segment into every address digit as it shifts in,
    /// so a segment with bits below bit 16 lands the record somewhere other
    /// than segment plus offset.
    SegmentOverlap {
        line: usize,
        loaded: u32,
        intended: u32,
    },
    /// A record type the loader skips.
    Ignored { line: usize, record_type: u8 },
    MissingEndOfFile,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Finding::PartialWord { line, length } => write!(
                f,
                "line {}: {} data bytes is not a multiple of 4",
                line, length
            ),
            Finding::UnalignedAddress { line, offset } => {
                write!(f, "line {}: offset {:#06x} is not word aligned", line, offset)
            }
            Finding::SegmentOverlap {
                line,
                loaded,
                intended,
            } => write!(
                f,
                "line {}: loads at {:#x} instead of {:#x}",
                line, loaded, intended
            ),
            Finding::Ignored { line, record_type } => {
                write!(f, "line {}: record type {:02X} is ignored", line, record_type)
            }
            Finding::MissingEndOfFile => f.write_str("no end of file record"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Report {
    pub records: usize,
    pub words: usize,
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintError {
    pub line: usize,
    pub error: ParseError,
}

impl fmt::Display for LintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Parses every record strictly and collects findings. Stops at the first
/// record that does not parse.
pub fn check(text: &str) -> Result<Report, LintError> {
    let mut report = Report::default();
    let mut parser = Parser::new(text);
    let mut segment = 0u32;
    let mut end_of_file = false;

    while let Some(record) = parser.next() {
        let line = parser.line();
        let record = record.map_err(|error| LintError { line, error })?;
        report.records += 1;

        match record {
            Record::Data { length, offset, .. } => {
                // Three leftover bytes still make a word: the checksum byte
                // completes it.
                report.words += length as usize / 4 + usize::from(length % 4 == 3);

                if length % 4 != 0 {
                    report.findings.push(Finding::PartialWord { line, length });
                }

                if offset % 4 != 0 {
                    report
                        .findings
                        .push(Finding::UnalignedAddress { line, offset });
                }

                let loaded = decoder::load_address(segment, offset);
                let intended = segment + u32::from(offset);
                if loaded != intended {
                    report.findings.push(Finding::SegmentOverlap {
                        line,
                        loaded,
                        intended,
                    });
                }
            }
            Record::EndOfFile => end_of_file = true,
            Record::ExtendedSegmentAddress(base) => segment = u32::from(base) << 4,
            ref other => report.findings.push(Finding::Ignored {
                line,
                record_type: other.record_type(),
            }),
        }
    }

    if !end_of_file {
        report.findings.push(Finding::MissingEndOfFile);
    }

    Ok(report)
}
