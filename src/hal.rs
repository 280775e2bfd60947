//! The pieces of the board the loader talks to.

/// A character transport, normally the UART.
pub trait Serial {
    /// Blocks until a byte is available.
    fn read_byte(&mut self) -> u8;

    fn write_str(&mut self, s: &str);
}

/// Somewhere to put decoded words.
pub trait Memory {
    fn write_word(&mut self, address: u32, value: u32);
}

/// A whole board: transport, memory, and a way to start the loaded program.
pub trait Platform: Serial + Memory {
    fn branch_to(&mut self, address: u32) -> !;
}

/// Physical memory, written with volatile 32-bit stores.
#[derive(Debug)]
pub struct PhysicalMemory {
    _private: (),
}

impl PhysicalMemory {
    /// # Safety
    ///
    /// Every address later handed to `write_word` is stored to as-is. The
    /// caller must be running without an MMU mapping that forbids it, and
    /// must not be executing from the region being loaded.
    pub const unsafe fn new() -> Self {
        PhysicalMemory { _private: () }
    }
}

impl Memory for PhysicalMemory {
    fn write_word(&mut self, address: u32, value: u32) {
        unsafe { core::ptr::write_volatile(address as usize as *mut u32, value) }
    }
}

/// Starts executing at `address`.
///
/// # Safety
///
/// `address` must hold code for the current instruction set that never
/// returns.
pub unsafe fn jump(address: u32) -> ! {
    let entry: extern "C" fn() -> ! = core::mem::transmute(address as usize);
    entry()
}
