//! Temp-file lifecycle for fragment downloads.
//!
//! Each fragment is written sequentially to `<final>.partial`; the length of
//! that file is the only resume state. On success the temp file is renamed
//! atomically to its final name.

mod writer;

pub use writer::PartialFile;

use std::io;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".partial";

/// Path for the temp file: appends `.partial` to the final path (e.g. `a.mp4` → `a.mp4.partial`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Length of the file at `path`, or `None` if it does not exist.
pub fn file_len(path: &Path) -> io::Result<Option<u64>> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.len())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
