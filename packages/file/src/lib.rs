//! The backing-file collaborator.
//!
//! A store persists through exactly this surface: read the whole file as
//! text, overwrite the whole file with text, report existence and length.
//! There are no partial or streaming reads anywhere in the system, so none
//! are offered here. Failures surface as plain [`std::io::Error`]s.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// A handle on the file a store pulls from and pushes to.
///
/// Opening binds a path and creates the file when it does not exist yet;
/// the handle stays usable until [`close`](BackingFile::close). The actual
/// reads and writes happen per call, whole-file at a time.
#[derive(Debug, Default)]
pub struct BackingFile {
    path: Option<PathBuf>,
}

impl BackingFile {
    /// A closed handle, not yet bound to any path.
    pub fn new() -> Self {
        BackingFile::default()
    }

    /// Bind a path, creating the file if it is missing.
    ///
    /// Re-opening an already open handle rebinds it to the new path.
    pub fn open(&mut self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Whether a path is currently bound.
    pub fn is_open(&self) -> bool {
        self.path.is_some()
    }

    /// Read the file's full contents as text.
    pub fn read_all(&self) -> io::Result<String> {
        fs::read_to_string(self.require_path()?)
    }

    /// Replace the file's full contents.
    pub fn write_all(&self, text: &str) -> io::Result<()> {
        fs::write(self.require_path()?, text)
    }

    /// Current length of the file in bytes.
    pub fn len(&self) -> io::Result<u64> {
        Ok(fs::metadata(self.require_path()?)?.len())
    }

    /// True when the file is currently zero bytes long.
    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Unbind the path. Returns false when the handle was already closed.
    pub fn close(&mut self) -> bool {
        self.path.take().is_some()
    }

    fn require_path(&self) -> io::Result<&Path> {
        self.path.as_deref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "no backing file is open")
        })
    }
}
