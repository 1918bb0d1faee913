use crate::bus::Bus;
use crate::error::{EmuError, Stop};
use crate::inst::Inst;
use crate::pc::ProgramCounter;
use crate::regs::Registers;

/// The RISC core: the register file, the program counter, and the
/// fetch-decode-execute step. It owns no memory or I/O of its own —
/// every access to the outside world goes through the [`Bus`] passed
/// into `step`/`run`, so the same core drives both the real `Machine`
/// and unit tests with a mock bus.
pub struct Cpu {
    pub pc: ProgramCounter,
    pub regs: Registers,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            pc: ProgramCounter::new(),
            regs: Registers::new(),
        }
    }

    /// Fetches, decodes and executes one instruction. Returns
    /// `Ok(Some(stop))` when the guest halted or trapped, `Ok(None)` to
    /// keep running, and an `Err` only for host-side failures (bad
    /// memory range, unimplemented MMIO slot, unknown syscall).
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<Option<Stop>, EmuError> {
        let word_addr = self.pc.inc();
        let ir = bus.read_program(word_addr)?;
        let inst = Inst::decode(ir);
        inst.execute(&mut self.regs, &mut self.pc, bus)
    }

    /// Runs until the guest stops or a host error occurs.
    pub fn run<B: Bus>(&mut self, bus: &mut B) -> Result<Stop, EmuError> {
        loop {
            if let Some(stop) = self.step(bus)? {
                return Ok(stop);
            }
        }
    }
}
