use crate::error::{EmuError, Stop};

/// The capability set the CPU core needs from its surroundings, mirroring
/// the reference implementation's `RISC_IO` function-pointer table. A
/// single concrete `Machine` (see `machine.rs`) implements this for
/// production use; tests can substitute a small mock to pin ALU/FPU/branch
/// semantics without wiring up RAM or the file service.
///
/// Only writes can report a [`Stop`]: `halt`/`trap` are reached by writing
/// to the syscall-trigger MMIO slot, never by a read.
pub trait Bus {
    fn read_program(&mut self, word_addr: u32) -> Result<u32, EmuError>;
    fn read_word(&mut self, adr: u32) -> Result<u32, EmuError>;
    fn read_byte(&mut self, adr: u32) -> Result<u32, EmuError>;
    fn write_word(&mut self, adr: u32, val: u32) -> Result<Option<Stop>, EmuError>;
    fn write_byte(&mut self, adr: u32, val: u32) -> Result<Option<Stop>, EmuError>;
}
