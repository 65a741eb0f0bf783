//! Sequential append writer for a fragment temp file.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// An open `.partial` file owned by exactly one fetch.
///
/// The handle is closed when the value is dropped, on every path. Only
/// [`PartialFile::finalize`] renames it to the final name.
#[derive(Debug)]
pub struct PartialFile {
    file: File,
    temp_path: PathBuf,
    len: u64,
}

impl PartialFile {
    /// Create (or truncate) the temp file for a fresh fetch.
    pub fn create(temp_path: &Path) -> io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        Ok(Self {
            file,
            temp_path: temp_path.to_path_buf(),
            len: 0,
        })
    }

    /// Open an existing temp file for append; its current length is the resume offset.
    pub fn open_append(temp_path: &Path) -> io::Result<Self> {
        let file = File::options().append(true).open(temp_path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            temp_path: temp_path.to_path_buf(),
            len,
        })
    }

    /// Append `data` at the end of the file.
    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.len += data.len() as u64;
        Ok(())
    }

    /// Bytes on disk, including any resumed prefix.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    /// Close the file, then atomically rename it to `final_path`.
    /// Fails if `final_path` is on a different filesystem.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        let Self {
            file, temp_path, ..
        } = self;
        drop(file);
        std::fs::rename(&temp_path, final_path)
    }
}
