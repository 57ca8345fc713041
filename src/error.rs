//! Error types for framescale

use thiserror::Error;

/// Result type alias for framescale operations
pub type Result<T> = std::result::Result<T, Error>;

/// framescale error type
#[derive(Error, Debug)]
pub enum Error {
    // Negotiation errors
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Every method covers every format, so this only shows up on a broken
    /// kernel table.
    #[error("Unsupported format {format} for scaling method {method}")]
    UnsupportedMethodForFormat { format: String, method: String },

    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Format mismatch: source {src}, destination {dst}")]
    FormatMismatch { src: String, dst: String },

    // Processing errors
    #[error("Geometry mismatch: {0}")]
    GeometryMismatch(String),

    // Pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    // General errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error is raised while negotiating caps, before any
    /// frame is processed
    pub fn is_negotiation_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFormat(_)
                | Error::NumericOverflow(_)
                | Error::InvalidDimensions(_)
                | Error::FormatMismatch { .. }
        )
    }

    /// Check if this error points at a caller bug (wrongly sized buffers)
    pub fn is_caller_bug(&self) -> bool {
        matches!(
            self,
            Error::GeometryMismatch(_) | Error::UnsupportedMethodForFormat { .. }
        )
    }
}
