//! Artifact retrieval.
//!
//! [`ArtifactRetriever`] takes classified steps for one test result and
//! writes the requested image kind into the session directory:
//! - [`plan`] - URL resolution, credential, kind filtering
//! - download orchestration (here) - bounded, in step order, per-item isolation
//!
//! A failure on one artifact never stops the others; failures are collected
//! into the [`RetrievalReport`]. Conditions that make the whole retrieval
//! meaningless (invalid kind, nothing to download, unusable root) are
//! returned as errors before any file is written.

mod plan;


use crate::config::RetrievalConfig;
use crate::error::{DownloadError, Error, Result};
use crate::fetcher::{ArtifactFetcher, HttpFetcher};
use crate::layout::{create_levels, directory_segments, resolve_root, validate_segment};
use crate::session::{SessionRef, redact_url, server_url};
use crate::types::{
    ArtifactTarget, DownloadFailure, DownloadPlan, ImageKind, RetrievalReport, StepResult,
    TestResultRecord,
};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Downloads step artifacts of one test result into a deterministic layout
pub struct ArtifactRetriever {
    record: TestResultRecord,
    config: RetrievalConfig,
    server: Option<Url>,
    fetcher: Arc<dyn ArtifactFetcher>,
}

impl ArtifactRetriever {
    /// Create a retriever that fetches over HTTP(S)
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `config` fails validation or the HTTP client
    /// cannot be built.
    pub fn new(record: TestResultRecord, config: RetrievalConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.fetch_timeout)?;
        Self::with_fetcher(record, config, Arc::new(fetcher))
    }

    /// Create a retriever with a custom fetcher
    pub fn with_fetcher(
        record: TestResultRecord,
        config: RetrievalConfig,
        fetcher: Arc<dyn ArtifactFetcher>,
    ) -> Result<Self> {
        config.validate()?;

        let server = match server_url(&record.app_urls.session) {
            Ok(server) => Some(server),
            Err(e) => {
                tracing::debug!(error = %e, "no provider server URL, relative links will fail");
                None
            }
        };

        if let Ok(session) = SessionRef::parse(&record.app_urls.session)
            && (session.batch_id != record.batch_id || session.session_id != record.id)
        {
            tracing::warn!(
                record_batch = %record.batch_id,
                record_session = %record.id,
                url_batch = %session.batch_id,
                url_session = %session.session_id,
                "session URL disagrees with record identifiers, using record identifiers"
            );
        }

        Ok(Self {
            record,
            config,
            server,
            fetcher,
        })
    }

    /// The configuration this retriever was built with
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Plan the downloads for `kind` without touching the filesystem
    ///
    /// # Errors
    ///
    /// [`Error::NoArtifacts`] if no step has a link of `kind` after
    /// filtering. Links that cannot be resolved are listed in
    /// [`DownloadPlan::unresolved`].
    pub fn resolve_artifacts(
        &self,
        kind: ImageKind,
        credential_token: &str,
        steps: &[StepResult],
    ) -> Result<DownloadPlan> {
        plan::plan_downloads(
            self.server.as_ref(),
            kind,
            credential_token,
            steps,
            self.config.download_diffs_only,
        )
    }

    /// Directory artifacts for this record are written to, below `root`
    ///
    /// Creates any missing level.
    pub async fn target_directory(&self, root: &Path) -> Result<PathBuf> {
        let root = resolve_root(root, self.config.fallback_to_current_dir).await?;
        let segments = directory_segments(&self.record, self.config.directory_override.as_deref());
        create_levels(root, &segments).await
    }

    /// Download every planned artifact of `kind`
    ///
    /// The plan is built first, so [`Error::NoArtifacts`] is returned before
    /// any directory is created. Individual download failures are logged
    /// and listed in [`RetrievalReport::failures`]; the call still succeeds.
    pub async fn download_images(
        &self,
        root: &Path,
        kind: ImageKind,
        credential_token: &str,
        steps: &[StepResult],
    ) -> Result<RetrievalReport> {
        let DownloadPlan {
            targets,
            unresolved,
        } = self.resolve_artifacts(kind, credential_token, steps)?;
        let directory = self.target_directory(root).await?;

        tracing::info!(
            kind = %kind,
            count = targets.len(),
            unresolved = unresolved.len(),
            dir = %directory.display(),
            "retrieving images"
        );

        let started_at = chrono::Utc::now();
        let fetcher = &self.fetcher;
        let dir = directory.as_path();
        let outcomes: Vec<(ArtifactTarget, std::result::Result<PathBuf, DownloadError>)> =
            stream::iter(targets)
                .map(|target| async move {
                    let result = fetch_one(&**fetcher, dir, &target).await;
                    (target, result)
                })
                .buffered(self.config.max_concurrent_downloads.max(1))
                .collect()
                .await;
        let finished_at = chrono::Utc::now();

        let mut written = Vec::new();
        let mut failures = unresolved;
        for (target, outcome) in outcomes {
            match outcome {
                Ok(path) => written.push(path),
                Err(e) => {
                    let error = Error::from(e);
                    tracing::warn!(
                        step = target.step_number,
                        file = %target.file_name,
                        error = %error,
                        "image download failed"
                    );
                    failures.push(DownloadFailure {
                        step_number: target.step_number,
                        file_name: target.file_name,
                        code: error.error_code().to_string(),
                        error: error.to_string(),
                    });
                }
            }
        }
        failures.sort_by_key(|f| f.step_number);

        tracing::info!(
            kind = %kind,
            written = written.len(),
            failed = failures.len(),
            "image retrieval finished"
        );

        Ok(RetrievalReport {
            directory,
            kind,
            written,
            failures,
            started_at,
            finished_at,
        })
    }

    /// [`download_images`](Self::download_images) with the kind given by name
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKind`] for names other than `baseline`, `current`,
    /// `diff`, checked before any I/O.
    pub async fn download_images_by_name(
        &self,
        root: &Path,
        kind: &str,
        credential_token: &str,
        steps: &[StepResult],
    ) -> Result<RetrievalReport> {
        let kind: ImageKind = kind.parse()?;
        self.download_images(root, kind, credential_token, steps)
            .await
    }

    /// Download baseline and then current images
    ///
    /// A kind with nothing to download is skipped; any other error stops
    /// the call.
    pub async fn download_all(
        &self,
        root: &Path,
        credential_token: &str,
        steps: &[StepResult],
    ) -> Result<Vec<RetrievalReport>> {
        let mut reports = Vec::new();
        for kind in [ImageKind::Baseline, ImageKind::Current] {
            match self
                .download_images(root, kind, credential_token, steps)
                .await
            {
                Ok(report) => reports.push(report),
                Err(Error::NoArtifacts { .. }) => {
                    tracing::info!(kind = %kind, "no images of this kind, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(reports)
    }
}

async fn fetch_one(
    fetcher: &dyn ArtifactFetcher,
    dir: &Path,
    target: &ArtifactTarget,
) -> std::result::Result<PathBuf, DownloadError> {
    let dest = dir.join(&target.file_name);
    if let Err(e) = validate_segment(&target.file_name) {
        return Err(DownloadError::Write {
            path: dest,
            reason: e.to_string(),
        });
    }

    tracing::debug!(
        step = target.step_number,
        url = %redact_url(&target.source_url),
        dest = %dest.display(),
        "downloading image"
    );
    let bytes = fetcher.fetch_to_file(&target.source_url, &dest).await?;
    tracing::debug!(step = target.step_number, bytes, "image written");
    Ok(dest)
}
