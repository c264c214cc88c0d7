use thiserror::Error;

/// Errors returned by the team file store.
///
/// Authorization is not represented here: the store assumes the caller has
/// already passed the token gate.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file or model directory with the same name already exists
    #[error("Target already exists: {path}")]
    Conflict { path: String },

    /// The requested file, model or team does not exist
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// A name or path parameter is not acceptable (traversal, separators, empty)
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The uploaded archive could not be opened as a zip file
    #[error("Invalid archive: {0}")]
    InvalidArchive(#[from] ArchiveError),

    /// Unexpected filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        StoreError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Errors raised while reading a zip archive.
#[derive(Debug, Clone, Error)]
pub enum ArchiveError {
    /// The byte stream is not a readable zip archive
    #[error("not a readable zip archive: {0}")]
    Malformed(String),

    /// An entry name is neither UTF-8 nor EUC-KR
    #[error("entry name could not be decoded")]
    UndecodableName,

    /// An entry name escapes the destination directory
    #[error("entry path is not a safe relative path: {0}")]
    UnsafePath(String),

    /// Reading or writing a single entry failed
    #[error("failed to extract entry: {0}")]
    Entry(String),
}

/// Errors from the heatmap compositor.
#[derive(Debug, Clone, Error)]
pub enum HeatmapError {
    /// A required base or overlay image is absent from the asset directory
    #[error("Missing heatmap asset: {0}")]
    MissingAsset(String),

    /// An asset exists but could not be decoded as an image
    #[error("Failed to decode heatmap asset {name}: {message}")]
    DecodeAsset { name: String, message: String },

    /// PNG encoding of the composited image failed
    #[error("Failed to encode heatmap: {0}")]
    Encode(String),
}
