//! Turning classified steps into a download plan.

use crate::error::{Error, Result};
use crate::layout::artifact_file_name;
use crate::session::{resolve_artifact_url, with_credential};
use crate::types::{ArtifactTarget, DownloadFailure, DownloadPlan, ImageKind, StepResult};
use url::Url;

/// Build the ordered list of downloads for `kind`
///
/// Steps without a URL for `kind` are skipped. With `diffs_only` and
/// `kind == Diff`, steps not flagged as different are skipped as well.
/// A link that cannot be parsed or resolved becomes an entry in
/// [`DownloadPlan::unresolved`]; the other steps are still planned.
/// Targets come out in ascending step order regardless of input order.
///
/// # Errors
///
/// [`Error::NoArtifacts`] if no step has a link of `kind` after filtering
pub(crate) fn plan_downloads(
    server: Option<&Url>,
    kind: ImageKind,
    credential_token: &str,
    steps: &[StepResult],
    diffs_only: bool,
) -> Result<DownloadPlan> {
    let mut ordered: Vec<&StepResult> = steps.iter().collect();
    ordered.sort_by_key(|s| s.step_number);

    let mut plan = DownloadPlan::default();
    for step in ordered {
        let Some(link) = step.image_url(kind) else {
            tracing::debug!(step = step.step_number, kind = %kind, "no image link, skipping");
            continue;
        };
        if diffs_only && kind == ImageKind::Diff && !step.is_different {
            continue;
        }

        let file_name = artifact_file_name(step.step_number, &step.name, kind);
        match resolve_artifact_url(server, link) {
            Ok(url) => plan.targets.push(ArtifactTarget {
                step_number: step.step_number,
                file_name,
                source_url: with_credential(url, credential_token),
            }),
            Err(e) => {
                tracing::warn!(step = step.step_number, error = %e, "unusable image link");
                plan.unresolved.push(DownloadFailure {
                    step_number: step.step_number,
                    file_name,
                    code: e.error_code().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    if plan.targets.is_empty() && plan.unresolved.is_empty() {
        return Err(Error::NoArtifacts {
            kind: kind.to_string(),
        });
    }
    Ok(plan)
}
