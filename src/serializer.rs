use crate::checksum::checksum;
use crate::error::SerializeError;
use crate::ihex::Record;

#[cfg(feature = "alloc")]
use alloc::string::String;

/// Data bytes per record written by [`encode_image`].
#[cfg(feature = "alloc")]
pub const RECORD_DATA: usize = 16;

impl Record {
    /// Writes the record as `:` followed by uppercase hex, without a line
    /// break. Returns the number of bytes written.
    pub fn serialize<T>(&self, buffer: &mut T) -> Result<usize, SerializeError>
    where
        T: AsMut<[u8]>,
    {
        let record_type = self.record_type();

        match self {
            Self::Data { offset, .. } => format(record_type, *offset, self.payload(), buffer),
            Self::EndOfFile => format(record_type, 0, &[], buffer),
            Self::ExtendedSegmentAddress(address) => {
                format(record_type, 0, &address.to_be_bytes(), buffer)
            }
            Self::StartSegmentAddress { cs, ip } => {
                let mut word = [0; 4];
                word[..2].copy_from_slice(&cs.to_be_bytes());
                word[2..].copy_from_slice(&ip.to_be_bytes());

                format(record_type, 0, &word, buffer)
            }
            Self::ExtendedLinearAddress(address) => {
                format(record_type, 0, &address.to_be_bytes(), buffer)
            }
            Self::StartLinearAddress(address) => {
                format(record_type, 0, &address.to_be_bytes(), buffer)
            }
        }
    }
}

fn format<T>(
    record_type: u8,
    offset: u16,
    data: &[u8],
    buffer: &mut T,
) -> Result<usize, SerializeError>
where
    T: AsMut<[u8]>,
{
    let buffer = buffer.as_mut();
    let data_length = 1 + 2 + 1 + data.len() + 1;

    let buffer_length = 2 * data_length + 1;
    if buffer.len() < buffer_length {
        return Err(SerializeError::BufferTooSmall {
            needed: buffer_length,
        });
    }

    let mut bytes = [0; 0x104];
    bytes[0] = data.len() as u8;
    bytes[1..3].copy_from_slice(&offset.to_be_bytes());
    bytes[3] = record_type;
    bytes[4..data_length - 1].copy_from_slice(data);
    bytes[data_length - 1] = checksum(&bytes[..data_length - 1]);

    buffer[0] = b':';

    hex::encode_to_slice(&bytes[..data_length], &mut buffer[1..buffer_length]).map_err(|_| {
        SerializeError::BufferTooSmall {
            needed: buffer_length,
        }
    })?;
    buffer[1..buffer_length].make_ascii_uppercase();

    Ok(buffer_length)
}

/// Encodes a flat binary image loaded at `base` into records this loader can
/// consume.
///
/// The tail is zero padded to a whole word since the loader drops partial
/// words. The image always opens with an extended segment address record
/// because the loader keeps its segment between records. Addresses above
/// 64 KiB are reached with segments that are a multiple of 64 KiB, so OR-ing
/// the segment into the offset gives the same result as adding it.
#[cfg(feature = "alloc")]
pub fn encode_image(base: u32, image: &[u8]) -> Result<String, SerializeError> {
    let end = base as u64 + image.len() as u64;
    if base % 4 != 0 || end > 0x10_0000 {
        return Err(SerializeError::OutOfRange(base));
    }

    let mut out = String::new();
    let mut buffer = [0u8; 2 * 0x104 + 1];
    let mut segment = None;

    let mut push = |record: &Record, out: &mut String| -> Result<(), SerializeError> {
        let length = record.serialize(&mut buffer)?;
        // Hex digits and ':' only.
        out.extend(buffer[..length].iter().map(|&byte| byte as char));
        out.push_str("\r\n");
        Ok(())
    };

    let mut address = base;
    let mut rest = image;

    while !rest.is_empty() {
        let window = address & !0xFFFF;
        if segment != Some(window) {
            segment = Some(window);
            push(&Record::ExtendedSegmentAddress((window >> 4) as u16), &mut out)?;
        }

        let room = (0x1_0000 - (address & 0xFFFF)) as usize;
        let take = rest.len().min(RECORD_DATA).min(room);

        let mut chunk = [0u8; RECORD_DATA];
        chunk[..take].copy_from_slice(&rest[..take]);
        let padded = (take + 3) & !3;

        let record = Record::data((address & 0xFFFF) as u16, &chunk[..padded])
            .ok_or(SerializeError::OutOfRange(address))?;
        push(&record, &mut out)?;

        address += take as u32;
        rest = &rest[take..];
    }

    push(&Record::EndOfFile, &mut out)?;

    Ok(out)
}
