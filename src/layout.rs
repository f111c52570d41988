//! On-disk layout for retrieved artifacts
//!
//! Artifacts for a session land in
//! `root/testName/appName/{w}x{h}/hostOS/hostApp/batchId/sessionId/`, or in
//! `root/<override...>/batchId/sessionId/` when the caller supplies its own
//! leading segments. File names are `{step}-{name}-{kind}.png`.

use crate::error::{DirectoryError, Error, Result};
use crate::types::{ImageKind, TestResultRecord};
use std::path::{Path, PathBuf};

/// Directory segments below the root, in order
///
/// Segments are taken verbatim from the record; see [`validate_segment`] for
/// what is rejected when the directory is built.
#[must_use]
pub fn directory_segments(
    record: &TestResultRecord,
    override_segments: Option<&[String]>,
) -> Vec<String> {
    match override_segments {
        Some(prefix) => prefix
            .iter()
            .cloned()
            .chain([record.batch_id.clone(), record.id.clone()])
            .collect(),
        None => vec![
            record.name.clone(),
            record.app_name.clone(),
            record.host_display_size.to_string(),
            record.host_os.clone(),
            record.host_app.clone(),
            record.batch_id.clone(),
            record.id.clone(),
        ],
    }
}

/// Reject segments that would escape or collapse the layout
///
/// Segments are not rewritten: an empty segment, `.`, `..`, or one holding a
/// path separator or NUL byte is an error.
pub fn validate_segment(segment: &str) -> Result<()> {
    let reason = if segment.is_empty() {
        Some("segment is empty")
    } else if segment == "." || segment == ".." {
        Some("segment is a relative directory reference")
    } else if segment.contains('/') || segment.contains('\\') {
        Some("segment contains a path separator")
    } else if segment.contains('\0') {
        Some("segment contains a NUL byte")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::Directory(DirectoryError::InvalidSegment {
            segment: segment.to_string(),
            reason: reason.to_string(),
        })),
        None => Ok(()),
    }
}

/// Resolve the root directory for a retrieval
///
/// A missing root (absent, or not a directory) is an error unless
/// `fallback_to_current_dir` is set, in which case the process working
/// directory is used and a warning is logged. Any other failure to inspect
/// the root, such as permission denied, is always an error.
pub async fn resolve_root(root: &Path, fallback_to_current_dir: bool) -> Result<PathBuf> {
    let is_dir = match tokio::fs::metadata(root).await {
        Ok(meta) => meta.is_dir(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            return Err(Error::Directory(DirectoryError::CreateFailed {
                path: root.to_path_buf(),
                reason: e.to_string(),
            }));
        }
    };

    if is_dir {
        tracing::info!(root = %root.display(), "saving images");
        return Ok(std::path::absolute(root)?);
    }

    if !fallback_to_current_dir {
        return Err(Error::Directory(DirectoryError::RootMissing {
            path: root.to_path_buf(),
        }));
    }

    let cwd = std::env::current_dir()?;
    tracing::warn!(
        requested = %root.display(),
        fallback = %cwd.display(),
        "root directory missing, saving images to the current working directory"
    );
    Ok(cwd)
}

/// Build (and create) the artifact directory for a session
///
/// Every missing level is created; existing levels are reused untouched, so
/// calling this twice with the same inputs returns the same path.
///
/// # Errors
///
/// - [`DirectoryError::RootMissing`] if `root` is not an existing directory
/// - [`DirectoryError::InvalidSegment`] if any segment fails [`validate_segment`]
/// - [`DirectoryError::CreateFailed`] if a level cannot be created, or exists
///   as something other than a directory
pub async fn build_path(
    root: &Path,
    record: &TestResultRecord,
    override_segments: Option<&[String]>,
) -> Result<PathBuf> {
    let root = resolve_root(root, false).await?;
    create_levels(root, &directory_segments(record, override_segments)).await
}

/// Create `segments` below an already-resolved root
pub(crate) async fn create_levels(root: PathBuf, segments: &[String]) -> Result<PathBuf> {
    for segment in segments {
        validate_segment(segment)?;
    }

    let mut path = root;
    for segment in segments {
        path.push(segment);
        match tokio::fs::create_dir(&path).await {
            Ok(()) => tracing::debug!(dir = %path.display(), "created directory"),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let is_dir = tokio::fs::metadata(&path)
                    .await
                    .map(|m| m.is_dir())
                    .unwrap_or(false);
                if !is_dir {
                    return Err(Error::Directory(DirectoryError::CreateFailed {
                        path,
                        reason: "exists and is not a directory".to_string(),
                    }));
                }
            }
            Err(e) => {
                return Err(Error::Directory(DirectoryError::CreateFailed {
                    path,
                    reason: e.to_string(),
                }));
            }
        }
    }

    Ok(path)
}

/// File name for one artifact: `{step}-{name}-{kind}.png`
#[must_use]
pub fn artifact_file_name(step_number: usize, name: &str, kind: ImageKind) -> String {
    format!("{step_number}-{name}-{kind}.png")
}
