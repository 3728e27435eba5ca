//! Error types for Tubetally core operations.
//!
//! Every failure a caller can observe is a variant of [`Error`]. Callers that
//! need to branch on the category (for example to decide whether a retry makes
//! sense) use [`Error::kind`] and [`Error::is_retryable`] instead of matching on
//! messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Tubetally core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The URL did not match any known playlist URL shape.
    #[error("Invalid YouTube playlist URL '{url}': {reason}")]
    InvalidReference {
        /// The rejected input.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No API key was supplied.
    #[error("YouTube API key is required")]
    MissingCredential,

    /// The upstream API failed or reported an error payload.
    #[error("YouTube API error: {message}")]
    Remote {
        /// HTTP status, when the failure came with one.
        status: Option<u16>,
        /// Upstream-provided message when available.
        message: String,
    },

    /// The playlist was fetched successfully but contained no videos.
    #[error("No videos found in playlist {playlist_id}")]
    EmptyResult {
        /// The playlist that turned out empty.
        playlist_id: String,
    },

    /// Playback speed must be strictly positive.
    #[error("Invalid playback speed {0}: must be greater than zero")]
    InvalidSpeed(f64),

    /// The upstream kept returning continuation tokens past the page cap.
    #[error("Pagination exceeded {max_pages} pages")]
    PaginationExceeded {
        /// The configured cap.
        max_pages: usize,
    },

    /// The operation was cancelled at a page boundary.
    #[error("Operation cancelled")]
    Cancelled,

    /// A stored item was looked up and is not there.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File system operation failed.
    #[error("File system error at {path}: {reason}")]
    FileSystem {
        /// Path where the error occurred.
        path: PathBuf,
        /// Error message.
        reason: String,
    },

    /// Export rendering failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Fieldless error category, stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`Error::InvalidReference`].
    InvalidReference,
    /// See [`Error::MissingCredential`].
    MissingCredential,
    /// See [`Error::Remote`].
    Remote,
    /// See [`Error::EmptyResult`].
    EmptyResult,
    /// See [`Error::InvalidSpeed`].
    InvalidSpeed,
    /// See [`Error::PaginationExceeded`].
    PaginationExceeded,
    /// See [`Error::Cancelled`].
    Cancelled,
    /// See [`Error::NotFound`].
    NotFound,
    /// See [`Error::Configuration`].
    Configuration,
    /// File system and IO failures.
    FileSystem,
    /// See [`Error::Export`].
    Export,
    /// See [`Error::Serialization`].
    Serialization,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidReference => "invalid_reference",
            Self::MissingCredential => "missing_credential",
            Self::Remote => "remote",
            Self::EmptyResult => "empty_result",
            Self::InvalidSpeed => "invalid_speed",
            Self::PaginationExceeded => "pagination_exceeded",
            Self::Cancelled => "cancelled",
            Self::NotFound => "not_found",
            Self::Configuration => "configuration",
            Self::FileSystem => "file_system",
            Self::Export => "export",
            Self::Serialization => "serialization",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Build a [`Error::Remote`] without an HTTP status.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            status: None,
            message: message.into(),
        }
    }

    /// Build a [`Error::InvalidReference`].
    pub fn invalid_reference(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// The category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidReference { .. } => ErrorKind::InvalidReference,
            Self::MissingCredential => ErrorKind::MissingCredential,
            Self::Remote { .. } => ErrorKind::Remote,
            Self::EmptyResult { .. } => ErrorKind::EmptyResult,
            Self::InvalidSpeed(_) => ErrorKind::InvalidSpeed,
            Self::PaginationExceeded { .. } => ErrorKind::PaginationExceeded,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::FileSystem { .. } | Self::Io(_) => ErrorKind::FileSystem,
            Self::Export(_) => ErrorKind::Export,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Whether rerunning the whole operation from scratch may succeed.
    ///
    /// Input-validation failures never become valid on retry; upstream and
    /// network failures might.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Cancelled)
    }
}
