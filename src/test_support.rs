//! Shared fixtures for `#[cfg(test)]` modules across the crate.

#[cfg(test)]
use std::sync::Mutex;

/// Changing the process's current directory is global state; any test
/// that does it (file service, directory enumeration) locks this
/// first so two such tests never race each other.
#[cfg(test)]
pub static CWD_LOCK: Mutex<()> = Mutex::new(());
