//! In-memory stand-ins for the board, for running the loader on a host.

use crate::hal::{Memory, Platform, Serial};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// Serial line fed from a fixed buffer. Output is captured.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSerial {
    input: Vec<u8>,
    position: usize,
    output: String,
}

impl ScriptedSerial {
    pub fn new(input: Vec<u8>) -> Self {
        ScriptedSerial {
            input,
            position: 0,
            output: String::new(),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.position
    }
}

impl Serial for ScriptedSerial {
    /// Panics once the buffer is used up. A real line would block forever.
    fn read_byte(&mut self) -> u8 {
        match self.input.get(self.position) {
            Some(&byte) => {
                self.position += 1;
                byte
            }
            None => panic!("serial input exhausted after {} bytes", self.position),
        }
    }

    fn write_str(&mut self, s: &str) {
        self.output.push_str(s);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SparseMemory {
    writes: Vec<(u32, u32)>,
    image: BTreeMap<u32, u32>,
}

impl SparseMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every store, in the order it happened.
    pub fn writes(&self) -> &[(u32, u32)] {
        &self.writes
    }

    /// Final contents, one entry per word address.
    pub fn image(&self) -> &BTreeMap<u32, u32> {
        &self.image
    }

    pub fn read_word(&self, address: u32) -> Option<u32> {
        self.image.get(&address).copied()
    }
}

impl Memory for SparseMemory {
    fn write_word(&mut self, address: u32, value: u32) {
        self.writes.push((address, value));
        self.image.insert(address, value);
    }
}

/// A serial line and a memory glued into one board.
#[derive(Debug, Default, Clone)]
pub struct Bench {
    pub serial: ScriptedSerial,
    pub memory: SparseMemory,
}

impl Bench {
    pub fn new(serial: ScriptedSerial) -> Self {
        Bench {
            serial,
            memory: SparseMemory::new(),
        }
    }
}

impl Serial for Bench {
    fn read_byte(&mut self) -> u8 {
        self.serial.read_byte()
    }

    fn write_str(&mut self, s: &str) {
        self.serial.write_str(s)
    }
}

impl Memory for Bench {
    fn write_word(&mut self, address: u32, value: u32) {
        self.memory.write_word(address, value)
    }
}

impl Platform for Bench {
    fn branch_to(&mut self, address: u32) -> ! {
        panic!("branch to {:#x}", address)
    }
}
