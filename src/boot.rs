use crate::error::EmuError;
use crate::memory::Ram;
use crate::search_path;
use log::debug;
use std::fs::File;
use std::io::{ErrorKind, Read};

/// The fixed filename `load_inner_core` looks for, first in the current
/// directory and then along `NOREBO_PATH`.
pub const INNER_CORE: &str = "InnerCore";

/// Reads the length-prefixed relocation stream described in spec §4.5
/// into `ram`: `(size:u32, addr:u32, bytes[size])*` terminated by a
/// zero-size record. Every multi-byte integer on disk is little-endian.
pub fn load_inner_core(ram: &mut Ram) -> Result<(), EmuError> {
    let mut file = open_inner_core()?;

    let mut segments = 0u32;
    loop {
        let size = match read_u32(&mut file) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(EmuError::ImageTruncated(INNER_CORE));
            }
            Err(source) => return Err(EmuError::ImageRead { image: INNER_CORE, source }),
        };
        if size == 0 {
            break;
        }
        let addr = read_u32(&mut file).map_err(|source| match source.kind() {
            ErrorKind::UnexpectedEof => EmuError::ImageTruncated(INNER_CORE),
            _ => EmuError::ImageRead { image: INNER_CORE, source },
        })?;
        ram.check_range(addr, size, INNER_CORE)?;
        let mut buf = vec![0u8; size as usize];
        file.read_exact(&mut buf).map_err(|source| match source.kind() {
            ErrorKind::UnexpectedEof => EmuError::ImageTruncated(INNER_CORE),
            _ => EmuError::ImageRead { image: INNER_CORE, source },
        })?;
        ram.write_slice(addr, &buf)?;
        segments += 1;
        debug!("boot: loaded segment {segments} ({size} bytes at {addr:#010x})");
    }
    debug!("boot: {segments} segment(s) loaded from {INNER_CORE}");
    Ok(())
}

fn open_inner_core() -> Result<File, EmuError> {
    if let Ok(file) = File::open(INNER_CORE) {
        return Ok(file);
    }
    for candidate in search_path::candidates(INNER_CORE).into_iter().skip(1) {
        if let Ok(file) = File::open(&candidate) {
            return Ok(file);
        }
    }
    File::open(INNER_CORE).map_err(|source| EmuError::ImageOpen { image: INNER_CORE, source })
}

fn read_u32<R: Read>(r: &mut R) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
