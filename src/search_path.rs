use std::env;
use std::path::{Path, PathBuf};

/// Environment variable consulted when a filename isn't found in the
/// current directory, same purpose as the reference's `path_fopen`.
pub const NOREBO_PATH_VAR: &str = "NOREBO_PATH";

/// Every path worth trying to find `filename`, in lookup order: first
/// the bare name (current directory), then each non-empty
/// `NOREBO_PATH` component joined with it. `NOREBO_PATH` is split on
/// `;` if the value contains one, `:` otherwise, matching the
/// reference's separator sniffing; an empty component in the list
/// means "current directory" too and is already covered by the first
/// entry, so it contributes nothing further here.
pub fn candidates(filename: &str) -> Vec<PathBuf> {
    let mut out = vec![PathBuf::from(filename)];
    if let Ok(path_var) = env::var(NOREBO_PATH_VAR) {
        let sep = if path_var.contains(';') { ';' } else { ':' };
        for part in path_var.split(sep) {
            if !part.is_empty() {
                out.push(Path::new(part).join(filename));
            }
        }
    }
    out
}
