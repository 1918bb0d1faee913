use crate::bus::Bus;
use crate::direnum::Enumerator;
use crate::error::{EmuError, Stop};
use crate::fs::FileTable;
use crate::memory::Ram;
use crate::mmio::{self, Mmio};
use crate::syscall::{self, Context};
use log::trace;

/// Everything the reference implementation keeps at process scope —
/// RAM, the MMIO slot set, the open-file table, the directory
/// enumerator, and the guest argv vector — collected into one value
/// per the spec's design note, instead of ambient mutable statics.
/// `Machine` is the sole production implementation of [`Bus`].
pub struct Machine {
    ram: Ram,
    mmio: Mmio,
    files: FileTable,
    dirs: Enumerator,
    argv: Vec<String>,
}

impl Machine {
    pub fn new(argv: Vec<String>) -> Self {
        Machine {
            ram: Ram::new(),
            mmio: Mmio::new(),
            files: FileTable::new(),
            dirs: Enumerator::new(),
            argv,
        }
    }

    pub fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    /// Writing the syscall-trigger slot (slot 1) invokes the dispatcher
    /// synchronously with the current argument slots and stores the
    /// result back into the result slot, per spec §4.3/§4.4.
    fn trigger(&mut self, code: u32) -> Result<Option<Stop>, EmuError> {
        trace!("syscall: dispatching {code}({:?})", self.mmio.sysarg);
        let ctx = Context {
            ram: &mut self.ram,
            files: &mut self.files,
            dirs: &mut self.dirs,
            argv: &self.argv,
        };
        let (result, stop) = syscall::dispatch(code, self.mmio.sysarg, ctx)?;
        trace!("syscall: {code} => {result:#010x}");
        self.mmio.sysres = result;
        Ok(stop)
    }
}

impl Bus for Machine {
    fn read_program(&mut self, word_addr: u32) -> Result<u32, EmuError> {
        self.ram.read_word(word_addr.wrapping_mul(4))
    }

    fn read_word(&mut self, adr: u32) -> Result<u32, EmuError> {
        if (adr as i32) >= 0 {
            self.ram.read_word(adr)
        } else {
            self.mmio.read(mmio::slot(adr))
        }
    }

    /// Byte reads on a negative address fall through to the *word*
    /// MMIO handler and ignore the byte lane, matching the reference's
    /// `cpu_read_byte` — byte-level MMIO is never expected to exist.
    fn read_byte(&mut self, adr: u32) -> Result<u32, EmuError> {
        if (adr as i32) >= 0 {
            self.ram.read_byte(adr)
        } else {
            self.mmio.read(mmio::slot(adr))
        }
    }

    fn write_word(&mut self, adr: u32, val: u32) -> Result<Option<Stop>, EmuError> {
        if (adr as i32) >= 0 {
            self.ram.write_word(adr, val)?;
            Ok(None)
        } else {
            let slot = mmio::slot(adr);
            if slot == mmio::SLOT_TRIGGER {
                self.trigger(val)
            } else {
                self.mmio.write(slot, val)?;
                Ok(None)
            }
        }
    }

    fn write_byte(&mut self, adr: u32, val: u32) -> Result<Option<Stop>, EmuError> {
        if (adr as i32) >= 0 {
            self.ram.write_byte(adr, val)?;
            Ok(None)
        } else {
            let slot = mmio::slot(adr);
            if slot == mmio::SLOT_TRIGGER {
                self.trigger(val)
            } else {
                self.mmio.write(slot, val)?;
                Ok(None)
            }
        }
    }
}
