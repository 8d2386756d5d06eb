/// User-facing reasons generation cannot run. Nothing is mutated when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("select at least one annotation before running \"{operation}\"")]
    SelectionRequired { operation: String },
    #[error("choose an editing operation or select annotations first")]
    MissingOperation,
    #[error("describe the edit to apply to the whole image")]
    MissingDescription,
    #[error("unknown editing operation \"{operation}\"")]
    UnknownOperation { operation: String },
}

/// A persisted document that could not be read at all.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("session document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session document must be a JSON object")]
    NotAnObject,
    #[error("session slot I/O error: {0}")]
    Io(#[from] std::io::Error),
}
