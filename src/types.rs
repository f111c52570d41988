//! Core types for vrt-results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;

/// Completed visual-regression test result, as reported by the provider
///
/// Field names follow the provider's camelCase JSON so a record can be
/// deserialized directly from the session report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultRecord {
    /// Test name
    pub name: String,
    /// Application name
    pub app_name: String,
    /// Viewport size of the host display
    pub host_display_size: DisplaySize,
    /// Host operating system
    #[serde(rename = "hostOS")]
    pub host_os: String,
    /// Host application (browser)
    pub host_app: String,
    /// Provider web UI links
    pub app_urls: AppUrls,
    /// Batch identifier
    pub batch_id: String,
    /// Session identifier
    pub id: String,
    /// Declared number of steps
    pub steps: usize,
    /// Per-step signals and artifact links
    #[serde(default)]
    pub steps_info: Vec<StepInfo>,
}

/// Width and height in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl std::fmt::Display for DisplaySize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Provider web UI links for a session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppUrls {
    /// Session page, e.g. `https://eyes.example.com/app/batches/123/456`
    pub session: String,
}

/// Signals and artifact links for one step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInfo {
    /// Step (checkpoint) name
    pub name: String,
    /// Current image differs from baseline
    pub is_different: bool,
    /// A baseline image exists
    pub has_baseline_image: bool,
    /// A current image was captured
    pub has_current_image: bool,
    /// Artifact download links
    #[serde(default)]
    pub api_urls: ApiUrls,
}

/// Artifact download links; each may be absent
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUrls {
    /// Baseline image URL
    #[serde(default)]
    pub baseline_image: Option<String>,
    /// Current image URL
    #[serde(default)]
    pub current_image: Option<String>,
    /// Diff image URL
    #[serde(default)]
    pub diff_image: Option<String>,
}

/// Outcome of a single step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Matches the baseline
    Pass,
    /// Baseline exists but no current image was captured
    Missing,
    /// Current image without a baseline
    New,
    /// Current image differs from the baseline
    Fail,
    /// Signals match none of the defined patterns
    Unknown,
}

impl Status {
    /// Status string as reported to callers
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Missing => "MISSING",
            Status::New => "NEW",
            Status::Fail => "FAIL",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which artifact of a step to retrieve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Accepted reference image
    Baseline,
    /// Image captured by the run under test
    Current,
    /// Difference rendering
    Diff,
}

impl ImageKind {
    /// All kinds in retrieval order
    pub const ALL: [ImageKind; 3] = [ImageKind::Baseline, ImageKind::Current, ImageKind::Diff];

    /// Lowercase name used in file names and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Baseline => "baseline",
            ImageKind::Current => "current",
            ImageKind::Diff => "diff",
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baseline" => Ok(ImageKind::Baseline),
            "current" => Ok(ImageKind::Current),
            "diff" => Ok(ImageKind::Diff),
            other => Err(Error::InvalidKind(other.to_string())),
        }
    }
}

/// Classified step, immutable once built
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// 1-based step number
    pub step_number: usize,
    /// Classified outcome
    pub status: Status,
    /// Step name
    pub name: String,
    /// Copied from the step signals; drives the diff-only filter
    pub is_different: bool,
    /// Baseline image URL
    pub baseline_image_url: Option<String>,
    /// Current image URL
    pub current_image_url: Option<String>,
    /// Diff image URL
    pub diff_image_url: Option<String>,
}

impl StepResult {
    /// URL field matching `kind`
    pub fn image_url(&self, kind: ImageKind) -> Option<&str> {
        match kind {
            ImageKind::Baseline => self.baseline_image_url.as_deref(),
            ImageKind::Current => self.current_image_url.as_deref(),
            ImageKind::Diff => self.diff_image_url.as_deref(),
        }
    }
}

/// One planned download
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactTarget {
    /// 1-based step number
    pub step_number: usize,
    /// Destination file name (no directory)
    pub file_name: String,
    /// Source URL including the credential query parameter
    pub source_url: url::Url,
}

/// Downloads planned for one kind
///
/// Steps whose link could not be turned into a URL are kept in
/// `unresolved` rather than failing the whole plan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DownloadPlan {
    /// Items to fetch, in ascending step order
    pub targets: Vec<ArtifactTarget>,
    /// Items with an unusable link, in ascending step order
    pub unresolved: Vec<DownloadFailure>,
}

/// A download that did not produce a file
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DownloadFailure {
    /// 1-based step number
    pub step_number: usize,
    /// Destination file name
    pub file_name: String,
    /// Machine-readable error code
    pub code: String,
    /// Error message (credential-free)
    pub error: String,
}

/// Outcome of one retrieval call
#[derive(Clone, Debug, Serialize)]
pub struct RetrievalReport {
    /// Directory the artifacts were written to
    pub directory: PathBuf,
    /// Kind that was retrieved
    pub kind: ImageKind,
    /// Files written, in step order
    pub written: Vec<PathBuf>,
    /// Items that failed, in step order
    pub failures: Vec<DownloadFailure>,
    /// When the first download started
    pub started_at: DateTime<Utc>,
    /// When the last download finished
    pub finished_at: DateTime<Utc>,
}

impl RetrievalReport {
    /// Number of files successfully written
    pub fn files_written(&self) -> usize {
        self.written.len()
    }

    /// True when every planned item was written
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
