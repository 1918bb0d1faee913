use crate::error::EmuError;
use crate::name::check_str;
use std::fs::ReadDir;

/// The single, process-wide directory cursor `FileDir.Enumerate*`
/// drives: one enumeration live at a time, exactly like the
/// reference's single static `DIR *dir`. Starting a new enumeration
/// silently closes whatever was in progress.
pub struct Enumerator {
    dir: Option<ReadDir>,
}

impl Enumerator {
    pub fn new() -> Self {
        Enumerator { dir: None }
    }

    pub fn begin(&mut self) -> Result<(), EmuError> {
        self.dir = Some(std::fs::read_dir(".").map_err(EmuError::OpenDir)?);
        Ok(())
    }

    /// Returns the next directory entry whose name passes the guest
    /// filename syntax, skipping any that don't, or `None` once the
    /// directory is exhausted.
    pub fn next(&mut self) -> Option<String> {
        let dir = self.dir.as_mut()?;
        for entry in dir.by_ref() {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            if check_str(&name) {
                return Some(name);
            }
        }
        None
    }

    pub fn end(&mut self) {
        self.dir = None;
    }
}
