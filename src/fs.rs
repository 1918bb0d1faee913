use crate::error::EmuError;
use crate::search_path;
use chrono::{DateTime, Datelike, Local, Timelike};
use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::time::SystemTime;

/// Matches the reference's fixed-size file table; a guest handle is
/// just an index into it.
pub const MAX_FILES: usize = 500;

struct FileEntry {
    file: std::fs::File,
    name: String,
    registered: bool,
}

/// The guest's open-file table. An unregistered entry (from
/// `Files.New`) is backed by an anonymous temp file that vanishes on
/// close; `Files.Register` is what gives it a real name on disk,
/// atomically by copying the temp file's bytes into the freshly
/// created real one.
pub struct FileTable {
    files: Vec<Option<FileEntry>>,
}

impl FileTable {
    pub fn new() -> Self {
        FileTable {
            files: (0..MAX_FILES).map(|_| None).collect(),
        }
    }

    fn allocate(&mut self, name: String, registered: bool, file: std::fs::File) -> Result<u32, EmuError> {
        for (h, slot) in self.files.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(FileEntry { file, name, registered });
                return Ok(h as u32);
            }
        }
        Err(EmuError::TooManyOpenFiles)
    }

    fn get(&mut self, h: u32, proc: &'static str) -> Result<&mut FileEntry, EmuError> {
        self.files
            .get_mut(h as usize)
            .and_then(|slot| slot.as_mut())
            .ok_or(EmuError::InvalidFileHandle { proc })
    }

    pub fn new_file(&mut self, name: &str) -> Result<u32, EmuError> {
        let tmp = tempfile::tempfile().map_err(|source| EmuError::CreateFile {
            name: name.to_string(),
            source,
        })?;
        self.allocate(name.to_string(), false, tmp)
    }

    /// Tries a direct read-write open in the current directory first
    /// (so a file opened this way can later be registered in place
    /// without rewriting a path), then falls back to a read-only
    /// search along `NOREBO_PATH`.
    pub fn old(&mut self, name: &str) -> Result<u32, EmuError> {
        if let Ok(file) = OpenOptions::new().read(true).write(true).open(name) {
            return self.allocate(name.to_string(), true, file);
        }
        for candidate in search_path::candidates(name).into_iter().skip(1) {
            if let Ok(file) = OpenOptions::new().read(true).open(&candidate) {
                return self.allocate(name.to_string(), true, file);
            }
        }
        Ok(u32::MAX)
    }

    pub fn register(&mut self, h: u32) -> Result<u32, EmuError> {
        let entry = self.get(h, "Files.Register")?;
        if !entry.registered && !entry.name.is_empty() {
            let mut real = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&entry.name)
                .map_err(|source| EmuError::CreateFile {
                    name: entry.name.clone(),
                    source,
                })?;
            entry
                .file
                .seek(SeekFrom::Start(0))
                .map_err(|source| EmuError::FileIo { proc: "Register", source })?;
            io::copy(&mut entry.file, &mut real)
                .map_err(|source| EmuError::FileIo { proc: "Register", source })?;
            real.flush()
                .map_err(|source| EmuError::FileIo { proc: "Register", source })?;
            entry.file = real;
            entry.registered = true;
        }
        Ok(0)
    }

    pub fn close(&mut self, h: u32) -> Result<u32, EmuError> {
        self.get(h, "Files.Close")?;
        self.files[h as usize] = None;
        Ok(0)
    }

    pub fn seek(&mut self, h: u32, pos: u32, whence: u32) -> Result<u32, EmuError> {
        let entry = self.get(h, "Files.Seek")?;
        let seek_from = match whence {
            0 => SeekFrom::Start(pos as u64),
            1 => SeekFrom::Current(pos as i32 as i64),
            2 => SeekFrom::End(pos as i32 as i64),
            _ => return Ok(u32::MAX),
        };
        Ok(match entry.file.seek(seek_from) {
            Ok(_) => 0,
            Err(_) => u32::MAX,
        })
    }

    pub fn tell(&mut self, h: u32) -> Result<u32, EmuError> {
        let entry = self.get(h, "Files.Tell")?;
        entry
            .file
            .stream_position()
            .map(|p| p as u32)
            .map_err(|source| EmuError::FileIo { proc: "Tell", source })
    }

    /// Reads up to `siz` bytes, returning a buffer of exactly `siz`
    /// bytes (zero-padded past whatever was actually read) and the
    /// count actually read, mirroring the reference's
    /// `fread` + `memset` pair.
    pub fn read(&mut self, h: u32, siz: u32) -> Result<(Vec<u8>, u32), EmuError> {
        let entry = self.get(h, "Files.Read")?;
        let mut buf = vec![0u8; siz as usize];
        let mut total = 0usize;
        while total < buf.len() {
            match entry.file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(source) => return Err(EmuError::FileIo { proc: "Read", source }),
            }
        }
        Ok((buf, total as u32))
    }

    pub fn write(&mut self, h: u32, data: &[u8]) -> Result<u32, EmuError> {
        let entry = self.get(h, "Files.Write")?;
        entry
            .file
            .write(data)
            .map(|n| n as u32)
            .map_err(|source| EmuError::FileIo { proc: "Write", source })
    }

    pub fn length(&mut self, h: u32) -> Result<u32, EmuError> {
        let entry = self.get(h, "Files.Length")?;
        entry
            .file
            .flush()
            .map_err(|source| EmuError::FileIo { proc: "Length", source })?;
        let meta = entry
            .file
            .metadata()
            .map_err(|source| EmuError::FileIo { proc: "Length", source })?;
        Ok(meta.len() as u32)
    }

    pub fn date(&mut self, h: u32) -> Result<u32, EmuError> {
        let entry = self.get(h, "Files.Date")?;
        entry
            .file
            .flush()
            .map_err(|source| EmuError::FileIo { proc: "Date", source })?;
        let system_time = if entry.registered {
            entry
                .file
                .metadata()
                .and_then(|m| m.modified())
                .map_err(|source| EmuError::FileIo { proc: "Date", source })?
        } else {
            SystemTime::now()
        };
        Ok(time_to_oberon(system_time))
    }
}

/// Packs a timestamp the way the reference's `time_to_oberon` does, in
/// local time: `(year%100)<<26 | (month-1)<<22 | day<<17 | hour<<12 |
/// minute<<6 | second`. `chrono`'s month is 1-based where the
/// reference's `tm_mon` is 0-based, hence the `-1`.
fn time_to_oberon(t: SystemTime) -> u32 {
    let dt: DateTime<Local> = t.into();
    ((dt.year() as u32 % 100) * 0x0400_0000)
        | ((dt.month() - 1) * 0x0040_0000)
        | (dt.day() * 0x0002_0000)
        | (dt.hour() * 0x0000_1000)
        | (dt.minute() * 0x0000_0040)
        | dt.second()
}

/// Deletes a real file by guest-visible name; returns the guest
/// `0xFFFFFFFF` sentinel on any failure rather than a host error,
/// since a missing or unremovable file is an ordinary outcome here.
pub fn delete(name: &str) -> u32 {
    if std::fs::remove_file(name).is_ok() {
        0
    } else {
        u32::MAX
    }
}

pub fn rename(old_name: &str, new_name: &str) -> u32 {
    if std::fs::rename(old_name, new_name).is_ok() {
        0
    } else {
        u32::MAX
    }
}
