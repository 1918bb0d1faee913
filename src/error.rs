// Fatal, host-side failures. Guest-observable failures (bad handle, bad
// name, missing file, end of enumeration) are never represented here —
// they travel back to the guest as a plain `0xFFFFFFFF` result word.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmuError {
    #[error("{proc}: memory access out of bounds (address {address:#010x})")]
    MemoryAccess { proc: &'static str, address: u32 },

    #[error("{proc}: memory access out of bounds")]
    RangeOutOfBounds { proc: &'static str },

    #[error("unimplemented read of I/O address {0}")]
    UnknownMmioRead(i32),

    #[error("unimplemented write of I/O address {0}")]
    UnknownMmioWrite(i32),

    #[error("unimplemented sysreq {0}")]
    UnknownSyscall(u32),

    #[error("{proc}: invalid file handle")]
    InvalidFileHandle { proc: &'static str },

    #[error("Files.Allocate: too many open files")]
    TooManyOpenFiles,

    #[error("Files.Purge not implemented")]
    FilesPurgeNotImplemented,

    #[error("can't open directory for enumeration: {0}")]
    OpenDir(#[source] std::io::Error),

    #[error("can't create file {name}: {source}")]
    CreateFile {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Files.{proc}: {source}")]
    FileIo {
        proc: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("can't load {image}: {source}")]
    ImageOpen {
        image: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected end of file while reading {0}")]
    ImageTruncated(&'static str),

    #[error("error while reading {image}: {source}")]
    ImageRead {
        image: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// A reason the emulator stops running, as opposed to an [`EmuError`]:
/// both `halt` and `trap` are specified guest-initiated terminations,
/// not host-side bugs, so each carries its own exit code instead of
/// being printed as a bare diagnostic.
#[derive(Debug)]
pub enum Stop {
    Halt { code: u32 },
    Trap { code: u32, message: String },
}

impl Stop {
    pub fn exit_code(&self) -> i32 {
        match self {
            Stop::Halt { code } => *code as i32,
            Stop::Trap { code, .. } => 100 + *code as i32,
        }
    }
}
