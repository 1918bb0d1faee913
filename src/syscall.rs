use crate::direnum::Enumerator;
use crate::error::{EmuError, Stop};
use crate::fs::{self, FileTable};
use crate::memory::Ram;
use crate::name::{check_name, NAME_LENGTH};

pub const HALT: u32 = 1;
pub const ARGC: u32 = 2;
pub const ARGV: u32 = 3;
pub const TRAP: u32 = 4;

pub const FILES_NEW: u32 = 11;
pub const FILES_OLD: u32 = 12;
pub const FILES_REGISTER: u32 = 13;
pub const FILES_CLOSE: u32 = 14;
pub const FILES_SEEK: u32 = 15;
pub const FILES_TELL: u32 = 16;
pub const FILES_READ: u32 = 17;
pub const FILES_WRITE: u32 = 18;
pub const FILES_LENGTH: u32 = 19;
pub const FILES_DATE: u32 = 20;
pub const FILES_DELETE: u32 = 21;
pub const FILES_PURGE: u32 = 22;
pub const FILES_RENAME: u32 = 23;

pub const DIR_BEGIN: u32 = 31;
pub const DIR_NEXT: u32 = 32;
pub const DIR_END: u32 = 33;

/// Reads a fixed [`NAME_LENGTH`]-byte guest name buffer and validates
/// it with [`check_name`]; `Ok(None)` is the guest-observable "bad
/// name" outcome every caller in the reference handles by returning
/// `-1`, not a host error.
fn read_name(ram: &Ram, adr: u32) -> Result<Option<String>, EmuError> {
    let bytes = ram.read_slice(adr, NAME_LENGTH as u32)?.to_vec();
    if !check_name(&bytes) {
        return Ok(None);
    }
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok(Some(String::from_utf8_lossy(&bytes[..end]).into_owned()))
}

fn trap_message(code: u32) -> String {
    match code {
        1 => "array index out of range".to_string(),
        2 => "type guard failure".to_string(),
        3 => "array or string copy overflow".to_string(),
        4 => "access via NIL pointer".to_string(),
        5 => "illegal procedure call".to_string(),
        6 => "integer division by zero".to_string(),
        7 => "assertion violated".to_string(),
        other => format!("unknown trap {other}"),
    }
}

/// Everything the syscall-trigger MMIO write needs from the rest of
/// the machine, bundled so `dispatch` has one signature instead of
/// five loose parameters.
pub struct Context<'a> {
    pub ram: &'a mut Ram,
    pub files: &'a mut FileTable,
    pub dirs: &'a mut Enumerator,
    pub argv: &'a [String],
}

/// Runs the numbered syscall `n` with its three argument words,
/// returning the result word for the trigger slot's read-back and,
/// for `Halt`/`Trap`, the [`Stop`] that ends the run.
pub fn dispatch(n: u32, args: [u32; 3], ctx: Context) -> Result<(u32, Option<Stop>), EmuError> {
    let Context { ram, files, dirs, argv } = ctx;
    match n {
        HALT => Ok((0, Some(Stop::Halt { code: args[0] }))),
        ARGC => Ok((argv.len() as u32, None)),
        ARGV => {
            let (idx, adr, siz) = (args[0], args[1], args[2]);
            ram.check_range(adr, siz, "Norebo.Argv")?;
            let res = if (idx as usize) < argv.len() {
                let arg = &argv[idx as usize];
                if siz > 0 {
                    let bytes = arg.as_bytes();
                    let n = (siz as usize - 1).min(bytes.len());
                    let mut buf = vec![0u8; siz as usize];
                    buf[..n].copy_from_slice(&bytes[..n]);
                    ram.write_slice(adr, &buf)?;
                }
                arg.len() as u32
            } else {
                u32::MAX
            };
            Ok((res, None))
        }
        TRAP => {
            let (trap, name_adr, pos) = (args[0], args[1], args[2]);
            let name = read_name(ram, name_adr)?.unwrap_or_else(|| "(unknown)".to_string());
            let message = trap_message(trap);
            Ok((
                0,
                Some(Stop::Trap {
                    code: trap,
                    message: format!("{message} at {name} pos {pos}"),
                }),
            ))
        }
        FILES_NEW => match read_name(ram, args[0])? {
            Some(name) => files.new_file(&name).map(|h| (h, None)),
            None => Ok((u32::MAX, None)),
        },
        FILES_OLD => match read_name(ram, args[0])? {
            Some(name) => files.old(&name).map(|h| (h, None)),
            None => Ok((u32::MAX, None)),
        },
        FILES_REGISTER => files.register(args[0]).map(|r| (r, None)),
        FILES_CLOSE => files.close(args[0]).map(|r| (r, None)),
        FILES_SEEK => files.seek(args[0], args[1], args[2]).map(|r| (r, None)),
        FILES_TELL => files.tell(args[0]).map(|r| (r, None)),
        FILES_READ => {
            let (h, adr, siz) = (args[0], args[1], args[2]);
            ram.check_range(adr, siz, "Files.Read")?;
            let (buf, n) = files.read(h, siz)?;
            ram.write_slice(adr, &buf)?;
            Ok((n, None))
        }
        FILES_WRITE => {
            let (h, adr, siz) = (args[0], args[1], args[2]);
            ram.check_range(adr, siz, "Files.Write")?;
            let data = ram.read_slice(adr, siz)?.to_vec();
            files.write(h, &data).map(|r| (r, None))
        }
        FILES_LENGTH => files.length(args[0]).map(|r| (r, None)),
        FILES_DATE => files.date(args[0]).map(|r| (r, None)),
        FILES_DELETE => match read_name(ram, args[0])? {
            Some(name) => Ok((fs::delete(&name), None)),
            None => Ok((u32::MAX, None)),
        },
        FILES_PURGE => Err(EmuError::FilesPurgeNotImplemented),
        FILES_RENAME => {
            let old_name = read_name(ram, args[0])?;
            let new_name = read_name(ram, args[1])?;
            match (old_name, new_name) {
                (Some(o), Some(nw)) => Ok((fs::rename(&o, &nw), None)),
                _ => Ok((u32::MAX, None)),
            }
        }
        DIR_BEGIN => {
            dirs.begin()?;
            Ok((0, None))
        }
        DIR_NEXT => {
            let adr = args[0];
            ram.check_range(adr, NAME_LENGTH as u32, "FileDir.EnumerateNext")?;
            match dirs.next() {
                Some(name) => {
                    let mut buf = vec![0u8; NAME_LENGTH];
                    let bytes = name.as_bytes();
                    let n = bytes.len().min(NAME_LENGTH);
                    buf[..n].copy_from_slice(&bytes[..n]);
                    ram.write_slice(adr, &buf)?;
                    Ok((0, None))
                }
                None => {
                    ram.write_byte(adr, 0)?;
                    Ok((u32::MAX, None))
                }
            }
        }
        DIR_END => {
            dirs.end();
            Ok((0, None))
        }
        other => Err(EmuError::UnknownSyscall(other)),
    }
}
