//! Byte-at-a-time Intel HEX record decoder.
//!
//! The decoder never buffers a line. Each character either advances the
//! position inside the current record or is one of the control characters
//! that are honoured anywhere in the stream:
//!
//! * `:` starts a new record at the byte count field, abandoning whatever was
//!   in flight.
//! * `\r` and `\n` drop back to idle.
//! * `g` and `G` request the jump to the loaded program.
//!
//! Neither the byte count nor the trailing checksum byte is checked. A record
//! ends when the next `:` or line terminator arrives.

use crate::nibble;
use crate::types::RecordKind;
use log::{debug, trace, warn};

/// A field of the record that is built up one hex digit at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ByteCount,
    Address,
    RecordType,
    Segment,
    Data,
}

impl Field {
    /// Number of digits accumulated before the field is complete.
    pub const fn width(self) -> u8 {
        match self {
            Field::ByteCount | Field::RecordType => 2,
            Field::Address | Field::Segment => 4,
            Field::Data => 8,
        }
    }

    /// Mask applied after every digit.
    pub const fn mask(self) -> u32 {
        match self {
            Field::ByteCount | Field::RecordType => 0xFF,
            Field::Address | Field::Segment => 0xFFFF,
            Field::Data => 0xFFFF_FFFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for `:`.
    Idle,
    /// Accumulating `field`; `digit` digits of it have been consumed so far.
    Field { field: Field, digit: u8 },
    /// One more character after an extended segment address. Its value is
    /// discarded, it only shifts the segment up by a nibble.
    SegmentFinal,
}

impl State {
    const fn start(field: Field) -> Self {
        State::Field { field, digit: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A complete data word, already converted to native order.
    Word { address: u32, value: u32 },
    /// An end of file record was seen. Carries the running sum of every
    /// address and value written so far.
    EndOfFile { checksum: u32 },
    /// The command character was received.
    Go,
}

#[derive(Debug, Clone)]
pub struct Decoder {
    state: State,
    byte_count: u32,
    address: u32,
    record_type: u32,
    segment: u32,
    data: u32,
    sum: u32,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub const fn new() -> Self {
        Decoder {
            state: State::Idle,
            byte_count: 0,
            address: 0,
            record_type: 0,
            segment: 0,
            data: 0,
            sum: 0,
        }
    }

    /// Back to the power-on state, segment and running sum included.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Running write pointer, segment already folded in.
    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn segment(&self) -> u32 {
        self.segment
    }

    pub fn checksum(&self) -> u32 {
        self.sum
    }

    pub fn byte_count(&self) -> u8 {
        self.byte_count as u8
    }

    pub fn record_type(&self) -> u8 {
        self.record_type as u8
    }

    /// Consumes one character of input.
    pub fn push(&mut self, byte: u8) -> Option<Event> {
        match byte {
            b':' => {
                self.abandon_partial_word();
                self.state = State::start(Field::ByteCount);
                return None;
            }
            b'\r' | b'\n' => {
                self.abandon_partial_word();
                self.state = State::Idle;
                return None;
            }
            b'g' | b'G' => {
                self.state = State::Idle;
                return Some(Event::Go);
            }
            _ => {}
        }

        match self.state {
            State::Idle => None,
            State::SegmentFinal => {
                self.segment <<= 4;
                self.state = State::Idle;
                debug!("segment base {:#x}", self.segment);
                None
            }
            State::Field { field, digit } => self.accumulate(field, digit, nibble::fold(byte)),
        }
    }

    fn slot(&mut self, field: Field) -> &mut u32 {
        match field {
            Field::ByteCount => &mut self.byte_count,
            Field::Address => &mut self.address,
            Field::RecordType => &mut self.record_type,
            Field::Segment => &mut self.segment,
            Field::Data => &mut self.data,
        }
    }

    fn accumulate(&mut self, field: Field, digit: u8, nibble: u8) -> Option<Event> {
        if field == Field::Address {
            self.address = address_digit(self.address, nibble, self.segment);
        } else {
            let slot = self.slot(field);
            *slot = ((*slot << 4) | u32::from(nibble)) & field.mask();
        }

        let digit = digit + 1;
        if digit < field.width() {
            self.state = State::Field { field, digit };
            return None;
        }

        self.complete(field)
    }

    fn complete(&mut self, field: Field) -> Option<Event> {
        match field {
            Field::ByteCount => {
                self.state = State::start(Field::Address);
                None
            }
            Field::Address => {
                self.state = State::start(Field::RecordType);
                None
            }
            Field::RecordType => self.dispatch(),
            Field::Segment => {
                self.state = State::SegmentFinal;
                None
            }
            Field::Data => {
                let address = self.address;
                let value = self.data.swap_bytes();

                self.sum = self.sum.wrapping_add(address).wrapping_add(value);
                self.address = address.wrapping_add(4);
                self.data = 0;
                self.state = State::start(Field::Data);

                trace!("word {:#010x} -> {:#010x}", value, address);
                Some(Event::Word { address, value })
            }
        }
    }

    fn dispatch(&mut self) -> Option<Event> {
        debug!(
            "record type {:#04x}, {} bytes at {:#x}",
            self.record_type, self.byte_count, self.address
        );

        match RecordKind::from(self.record_type as u8) {
            RecordKind::Data => {
                self.state = State::start(Field::Data);
                None
            }
            RecordKind::EndOfFile => {
                self.state = State::Idle;
                Some(Event::EndOfFile { checksum: self.sum })
            }
            RecordKind::ExtendedSegmentAddress => {
                self.state = State::start(Field::Segment);
                None
            }
            RecordKind::Unsupported(record_type) => {
                warn!("ignoring record type {:#04x}", record_type);
                self.state = State::Idle;
                None
            }
        }
    }

    fn abandon_partial_word(&self) {
        if let State::Field {
            field: Field::Data,
            digit,
        } = self.state
        {
            if digit > 0 {
                warn!("dropping {} digits of a partial word at {:#x}", digit, self.address);
            }
        }
    }
}

/// One address digit: shift, mask to 16 bits, then OR the whole segment back
/// in. Segment bits below bit 16 are shifted along with the offset by the
/// next digit, so they end up smeared across the address.
fn address_digit(address: u32, nibble: u8, segment: u32) -> u32 {
    (((address << 4) | u32::from(nibble)) & Field::Address.mask()) | segment
}

/// Where a record with `offset` lands while `segment` is in force. Equals
/// `segment + offset` only when the segment's low 16 bits are clear or do not
/// collide with the shifted copies.
pub fn load_address(segment: u32, offset: u16) -> u32 {
    [12, 8, 4, 0].iter().fold(0, |address, &shift| {
        address_digit(address, ((offset >> shift) & 0xF) as u8, segment)
    })
}
