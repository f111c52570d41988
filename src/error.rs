//! Error types for vrt-results
//!
//! This module provides the error taxonomy for classification and retrieval:
//! - Fatal conditions (invalid input shape, invalid image kind, nothing to retrieve)
//! - Per-item download failures, isolated and aggregated by the retriever
//! - Directory layout failures
//! - Machine-readable error codes and process exit codes for callers

use crate::classifier::StepSignals;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vrt-results operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vrt-results
///
/// Each variant includes contextual information to help diagnose issues.
/// Credential tokens never appear in any variant: URLs are redacted before
/// they are stored.
#[derive(Debug, Error)]
pub enum Error {
    /// The test-result record does not have the expected shape
    #[error("malformed test result: {message}")]
    InputShape {
        /// Human-readable description of the mismatch
        message: String,
    },

    /// Image kind outside `baseline`, `current`, `diff`
    #[error("invalid image kind '{0}': expected one of baseline, current, diff")]
    InvalidKind(String),

    /// Nothing left to download after URL resolution and filtering
    #[error("no {kind} images were found")]
    NoArtifacts {
        /// The image kind that was requested
        kind: String,
    },

    /// A step's signals match none of the defined status patterns
    #[error("step {step} has an unclassifiable signal combination {signals}")]
    ClassificationAmbiguity {
        /// 1-based step number
        step: usize,
        /// The signals that could not be classified
        signals: StepSignals,
    },

    /// Directory layout error
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Download of a single artifact failed
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_concurrent_downloads")
        key: Option<String>,
    },

    /// URL could not be parsed or joined
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL, with any query string removed
        url: String,
        /// Parser error
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Directory layout errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The root directory does not exist (and the CWD fallback is disabled)
    #[error("root directory {path} does not exist")]
    RootMissing {
        /// The root that was requested
        path: PathBuf,
    },

    /// A directory level could not be created
    #[error("failed to create {path}: {reason}")]
    CreateFailed {
        /// The directory that could not be created
        path: PathBuf,
        /// The underlying I/O failure
        reason: String,
    },

    /// A path segment would escape or collapse the layout
    #[error("invalid path segment {segment:?}: {reason}")]
    InvalidSegment {
        /// The segment as supplied
        segment: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Per-artifact download errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The request could not be sent or the body could not be read
    #[error("request to {url} failed: {reason}")]
    Request {
        /// Source URL with the query string removed
        url: String,
        /// Transport error, without the URL
        reason: String,
    },

    /// The artifact store answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Source URL with the query string removed
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The request exceeded the configured fetch timeout
    #[error("request to {url} timed out")]
    Timeout {
        /// Source URL with the query string removed
        url: String,
    },

    /// Writing the destination file failed
    #[error("failed to write {path}: {reason}")]
    Write {
        /// Destination file
        path: PathBuf,
        /// The underlying I/O failure
        reason: String,
    },
}

impl Error {
    /// Get the machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InputShape { .. } => "input_shape",
            Error::InvalidKind(_) => "invalid_kind",
            Error::NoArtifacts { .. } => "no_artifacts",
            Error::ClassificationAmbiguity { .. } => "classification_ambiguity",
            Error::Directory(e) => match e {
                DirectoryError::RootMissing { .. } => "root_missing",
                DirectoryError::CreateFailed { .. } => "directory_create_failed",
                DirectoryError::InvalidSegment { .. } => "invalid_segment",
            },
            Error::Download(e) => match e {
                DownloadError::Request { .. } => "download_request_failed",
                DownloadError::Status { .. } => "download_bad_status",
                DownloadError::Timeout { .. } => "download_timeout",
                DownloadError::Write { .. } => "download_write_failed",
            },
            Error::Config { .. } => "config_error",
            Error::InvalidUrl { .. } => "invalid_url",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
        }
    }

    /// Whether this error aborts a whole retrieval rather than a single item
    ///
    /// Per-item download failures are collected into the retrieval report;
    /// everything else terminates the call.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Download(_))
    }

    /// Non-zero process exit code for callers that terminate on error
    ///
    /// Each fatal condition gets its own code so scripts can tell "nothing to
    /// do" apart from "something failed".
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InputShape { .. } | Error::Serialization(_) => 2,
            Error::InvalidKind(_) | Error::Config { .. } => 3,
            Error::NoArtifacts { .. } => 4,
            Error::ClassificationAmbiguity { .. } => 5,
            Error::Directory(_) => 6,
            Error::Download(_) | Error::InvalidUrl { .. } | Error::Io(_) => 1,
        }
    }
}
