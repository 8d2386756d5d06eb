//! Named persistence slot the host saves the session document into.

use std::io;

/// A single named slot holding one session document.
pub trait SessionSlot {
    /// Replace the slot's contents.
    fn save(&mut self, json: &str) -> io::Result<()>;

    /// Current contents, or `None` when nothing has been saved yet.
    fn load(&self) -> io::Result<Option<String>>;
}

/// In-memory slot, for tests and for hosts that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    contents: Option<String>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(json: impl Into<String>) -> Self {
        Self {
            contents: Some(json.into()),
        }
    }
}

impl SessionSlot for MemorySlot {
    fn save(&mut self, json: &str) -> io::Result<()> {
        self.contents = Some(json.to_string());
        Ok(())
    }

    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.contents.clone())
    }
}
