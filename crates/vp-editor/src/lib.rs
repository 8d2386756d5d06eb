pub mod codec;
pub mod commands;
pub mod config;
pub mod enhance;
pub mod error;
pub mod session;
pub mod slot;
pub mod store;

pub use codec::{RestoredSession, SessionDocument};
pub use commands::UndoStack;
pub use config::EditorConfig;
pub use enhance::{EnhanceRequest, EnhanceResponse, EnhanceSettings};
pub use error::{CodecError, ValidationError};
pub use session::EditorSession;
pub use slot::{MemorySlot, SessionSlot};
pub use store::{AnnotationStore, SelectionSet};
