//! # vrt-results
//!
//! Step classification and artifact retrieval for visual-regression test results.
//!
//! ## Design Philosophy
//!
//! vrt-results is designed to be:
//! - **Pure where possible** - Classification is a function of each step's signals, no I/O
//! - **Deterministic on disk** - Artifacts land in a stable directory taxonomy with stable names
//! - **Explicit** - Behavior is set by a [`RetrievalConfig`] passed in, errors are returned, never exits
//! - **Library-first** - No CLI, purely a Rust crate for embedding in test harnesses
//!
//! ## Quick Start
//!
//! ```no_run
//! use vrt_results::{ArtifactRetriever, ImageKind, RetrievalConfig, TestResultRecord};
//! use vrt_results::classifier::{classify, statuses};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let json = std::fs::read_to_string("result.json")?;
//!     let record: TestResultRecord = serde_json::from_str(&json)?;
//!
//!     let steps = classify(&record)?;
//!     println!("statuses: {:?}", statuses(&steps));
//!
//!     let config = RetrievalConfig::default().with_diffs_only(true);
//!     let retriever = ArtifactRetriever::new(record, config)?;
//!     let report = retriever
//!         .download_images(Path::new("downloads"), ImageKind::Diff, "VIEW-KEY", &steps)
//!         .await?;
//!
//!     println!("{} files written", report.files_written());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Step status classification
pub mod classifier;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Artifact fetching
pub mod fetcher;
/// Directory layout and file naming
pub mod layout;
/// Artifact retrieval orchestration
pub mod retriever;
/// Provider session URLs
pub mod session;
/// Core types
pub mod types;

// Re-export commonly used types
pub use classifier::{StatusSummary, StepSignals, classify, classify_strict, statuses};
pub use config::RetrievalConfig;
pub use error::{DirectoryError, DownloadError, Error, Result};
pub use fetcher::{ArtifactFetcher, HttpFetcher};
pub use retriever::ArtifactRetriever;
pub use types::{
    ArtifactTarget, DownloadFailure, DownloadPlan, ImageKind, RetrievalReport, Status,
    StepResult, TestResultRecord,
};
