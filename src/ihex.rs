use crate::types;

/// One fully parsed Intel HEX record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Data {
        bytes: [u8; 0xFF],
        length: u8,
        offset: u16,
    },
    EndOfFile,
    ExtendedSegmentAddress(u16),
    StartSegmentAddress {
        cs: u16,
        ip: u16,
    },
    ExtendedLinearAddress(u16),
    StartLinearAddress(u32),
}

impl Record {
    /// Builds a data record. `None` if `data` does not fit in one record.
    pub fn data(offset: u16, data: &[u8]) -> Option<Record> {
        if data.len() > 0xFF {
            return None;
        }

        let mut bytes = [0; 0xFF];
        bytes[..data.len()].copy_from_slice(data);

        Some(Record::Data {
            bytes,
            length: data.len() as u8,
            offset,
        })
    }

    pub fn record_type(&self) -> u8 {
        match self {
            Self::Data { .. } => types::DATA,
            Self::EndOfFile => types::END_OF_FILE,
            Self::ExtendedSegmentAddress(_) => types::EXTENDED_SEGMENT_ADDRESS,
            Self::StartSegmentAddress { .. } => types::START_SEGMENT_ADDRESS,
            Self::ExtendedLinearAddress(_) => types::EXTENDED_LINEAR_ADDRESS,
            Self::StartLinearAddress(_) => types::START_LINEAR_ADDRESS,
        }
    }

    /// The data bytes of a data record, empty for everything else.
    pub fn payload(&self) -> &[u8] {
        match self {
            Self::Data { bytes, length, .. } => &bytes[..*length as usize],
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_constructor() {
        let record = Record::data(0x0010, &[1, 2, 3]).unwrap();

        assert_eq!(record.record_type(), types::DATA);
        assert_eq!(record.payload(), &[1, 2, 3]);
        assert_eq!(Record::data(0, &[0; 0x100]), None);
    }

    #[test]
    fn non_data_has_no_payload() {
        assert_eq!(Record::EndOfFile.payload(), &[] as &[u8]);
        assert_eq!(
            Record::StartLinearAddress(0x8000).record_type(),
            types::START_LINEAR_ADDRESS
        );
    }
}
