use crate::decoder::{Decoder, Event};
use crate::hal::{Memory, Platform, Serial};
use log::info;

/// Where the loaded program is entered on the reference board.
pub const BOOT_ADDRESS: u32 = 0x8000;

pub const BANNER: &str = "Bootloader waiting (press \"g\" once you've loaded your program)\r\n";

pub const ACKNOWLEDGE: &str = "\r--\r\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config<'a> {
    pub entry: u32,
    pub banner: &'a str,
    pub acknowledge: &'a str,
}

impl Default for Config<'static> {
    fn default() -> Self {
        Config {
            entry: BOOT_ADDRESS,
            banner: BANNER,
            acknowledge: ACKNOWLEDGE,
        }
    }
}

/// The loader has finished and the program at `entry` should be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jump {
    pub entry: u32,
}

#[derive(Debug, Clone)]
pub struct Loader<'a> {
    decoder: Decoder,
    config: Config<'a>,
}

impl<'a> Loader<'a> {
    pub fn new(config: Config<'a>) -> Self {
        Loader {
            decoder: Decoder::new(),
            config,
        }
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn config(&self) -> &Config<'a> {
        &self.config
    }

    /// Feeds one byte through the decoder and carries out whatever it asks
    /// for.
    pub fn step<T>(&mut self, byte: u8, io: &mut T) -> Option<Jump>
    where
        T: Serial + Memory + ?Sized,
    {
        match self.decoder.push(byte)? {
            Event::Word { address, value } => {
                io.write_word(address, value);
                None
            }
            Event::EndOfFile { checksum } => {
                let mut buffer = [0; 10];
                io.write_str(hex_word(checksum, &mut buffer));
                None
            }
            Event::Go => {
                io.write_str(self.config.acknowledge);
                info!("jumping to {:#x}", self.config.entry);
                Some(Jump {
                    entry: self.config.entry,
                })
            }
        }
    }

    /// Drives a finite input. Returns `None` if it runs dry before `g`.
    pub fn pump<I, T>(&mut self, input: I, io: &mut T) -> Option<Jump>
    where
        I: IntoIterator<Item = u8>,
        T: Serial + Memory + ?Sized,
    {
        input
            .into_iter()
            .find_map(|byte| self.step(byte, &mut *io))
    }

    /// Reads from the serial line until `g` arrives.
    pub fn run<T>(&mut self, io: &mut T) -> Jump
    where
        T: Serial + Memory + ?Sized,
    {
        loop {
            let byte = io.read_byte();
            if let Some(jump) = self.step(byte, &mut *io) {
                return jump;
            }
        }
    }
}

/// The whole second stage: prompt, load, and start the program.
pub fn boot<P: Platform>(platform: &mut P, config: Config<'_>) -> ! {
    platform.write_str(config.banner);

    let jump = Loader::new(config).run(&mut *platform);
    platform.branch_to(jump.entry)
}

/// Formats `value` as eight uppercase hex digits and a line break.
fn hex_word(value: u32, buffer: &mut [u8; 10]) -> &str {
    if hex::encode_to_slice(value.to_be_bytes(), &mut buffer[..8]).is_err() {
        return "";
    }

    buffer[..8].make_ascii_uppercase();
    buffer[8] = b'\r';
    buffer[9] = b'\n';

    core::str::from_utf8(&buffer[..]).unwrap_or("")
}
