use crate::checksum::checksum;
use crate::error::ParseError;
use crate::ihex::Record;
use crate::types;
use core::iter::FusedIterator;
use core::str::FromStr;

type ParseResult = Result<Record, ParseError>;

/// Largest record on the wire: count, address, type, 255 data bytes, checksum.
const MAX_RECORD: usize = 1 + 2 + 1 + 0xFF + 1;

impl Record {
    /// Parses one line strictly: checksum, byte count and record type are all
    /// checked.
    pub fn parse<T: AsRef<[u8]>>(line: T) -> ParseResult {
        let line = match line.as_ref().split_first() {
            Some((b':', rest)) => rest,
            Some(_) => return Err(ParseError::MissingColon),
            None => return Err(ParseError::TooShort),
        };

        let length = line.len() / 2;

        if length < 5 {
            return Err(ParseError::TooShort);
        }

        if line.len() % 2 != 0 {
            return Err(ParseError::BadLength);
        }

        if length > MAX_RECORD {
            return Err(ParseError::BadLength);
        }

        let mut bytes = [0; MAX_RECORD];

        if hex::decode_to_slice(line, &mut bytes[..length]).is_err() {
            return Err(ParseError::BadHex);
        }

        let expected_checksum = bytes[length - 1];
        let bytes = &bytes[..length - 1];

        let checksum = checksum(bytes);

        if checksum != expected_checksum {
            return Err(ParseError::BadChecksum(checksum, expected_checksum));
        }

        let length = bytes[0];
        let address = u16::from_be_bytes([bytes[1], bytes[2]]);
        let record_type = bytes[3];
        let data = &bytes[4..];

        if data.len() != length as usize {
            return Err(ParseError::BadLength);
        }

        match record_type {
            types::DATA => Record::data(address, data).ok_or(ParseError::BadLength),
            types::END_OF_FILE => Ok(Record::EndOfFile),
            types::EXTENDED_SEGMENT_ADDRESS => {
                let [hi, lo] = exactly::<2>(data)?;
                Ok(Record::ExtendedSegmentAddress(u16::from_be_bytes([hi, lo])))
            }
            types::START_SEGMENT_ADDRESS => {
                let [a, b, c, d] = exactly::<4>(data)?;
                Ok(Record::StartSegmentAddress {
                    cs: u16::from_be_bytes([a, b]),
                    ip: u16::from_be_bytes([c, d]),
                })
            }
            types::EXTENDED_LINEAR_ADDRESS => {
                let [hi, lo] = exactly::<2>(data)?;
                Ok(Record::ExtendedLinearAddress(u16::from_be_bytes([hi, lo])))
            }
            types::START_LINEAR_ADDRESS => {
                let word = exactly::<4>(data)?;
                Ok(Record::StartLinearAddress(u32::from_be_bytes(word)))
            }
            _ => Err(ParseError::BadType),
        }
    }
}

fn exactly<const N: usize>(data: &[u8]) -> Result<[u8; N], ParseError> {
    let mut out = [0; N];

    if data.len() != N {
        return Err(ParseError::BadLength);
    }

    out.copy_from_slice(data);
    Ok(out)
}

impl FromStr for Record {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Record::parse(s)
    }
}

/// Parses a whole image, one record per non-empty line.
pub struct Parser<'a> {
    inner: core::str::Lines<'a>,
    line: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Parser {
            inner: s.lines(),
            line: 0,
        }
    }

    /// 1-based number of the line the last record came from.
    pub fn line(&self) -> usize {
        self.line
    }

    fn next_line(&mut self) -> Option<&'a str> {
        for line in &mut self.inner {
            self.line += 1;
            let line = line.trim();
            if !line.is_empty() {
                return Some(line);
            }
        }

        None
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = ParseResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().map(Record::parse)
    }
}

impl<'a> FusedIterator for Parser<'a> {}
