//! Error types shared across SlideKit crates.

use std::path::PathBuf;

/// Top-level error type for SlideKit operations.
#[derive(Debug, thiserror::Error)]
pub enum SlideError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Failed to decode image '{source_ref}': {message}")]
    Decode { source_ref: String, message: String },

    #[error("Drawing surface unavailable: {message}")]
    SurfaceUnavailable { message: String },

    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("Record store error: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SlideError.
pub type SlideResult<T> = Result<T, SlideError>;

impl SlideError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn decode(source_ref: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            source_ref: source_ref.into(),
            message: msg.into(),
        }
    }

    pub fn surface_unavailable(msg: impl Into<String>) -> Self {
        Self::SurfaceUnavailable {
            message: msg.into(),
        }
    }

    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive {
            message: msg.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error should be shown to the user as a notice rather
    /// than treated as an internal failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::SurfaceUnavailable { .. } | Self::Archive { .. }
        )
    }
}
