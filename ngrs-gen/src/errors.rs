use std::path::PathBuf;
use thiserror::Error;

/// Per-title failures raised before any file work happens.  Either kind
/// aborts the title and lets the batch continue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TitleError {
    /// The set is an encrypted variant the core cannot load; the message
    /// names the decrypted set to use instead.
    #[error("set '{set}' is encrypted, use decrypted set '{replacement}' instead")]
    BlockedTitle { set: String, replacement: String },

    /// The database record breaks the loader contract (missing name or
    /// size, a continuation with nothing to continue, an unknown
    /// dataarea).
    #[error("malformed record for '{set}': {reason}")]
    Malformed { set: String, reason: String },
}

/// Failures while materializing a title's files.  A missing source aborts
/// the title before anything is written.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("could not find rom '{name}' in {}", .source_path.display())]
    MissingSource { name: String, source_path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}
