//! Session slot backed by a single JSON file on disk.

use std::io;
use std::path::PathBuf;
use vp_editor::SessionSlot;

pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionSlot for FileSlot {
    fn save(&mut self, json: &str) -> io::Result<()> {
        std::fs::write(&self.path, json)
    }

    /// A missing file is an empty slot, not an error.
    fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
