//! Step classification
//!
//! Turns the three boolean signals the provider reports for each step into a
//! [`Status`]. Classification is a pure function of the signal triple: the
//! outcome of one step never depends on any other step.
//!
//! | is_different | has_baseline | has_current | status  |
//! |--------------|--------------|-------------|---------|
//! | false        | false        | true        | NEW     |
//! | false        | true         | false       | MISSING |
//! | false        | true         | true        | PASS    |
//! | true         | true         | true        | FAIL    |
//!
//! Every other combination is [`Status::Unknown`].

use crate::error::{Error, Result};
use crate::types::{Status, StepInfo, StepResult, TestResultRecord};
use serde::{Deserialize, Serialize};

/// The boolean signals of one step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepSignals {
    /// Current image differs from baseline
    pub is_different: bool,
    /// A baseline image exists
    pub has_baseline_image: bool,
    /// A current image was captured
    pub has_current_image: bool,
}

impl StepSignals {
    /// Create signals from the raw triple
    pub fn new(is_different: bool, has_baseline_image: bool, has_current_image: bool) -> Self {
        Self {
            is_different,
            has_baseline_image,
            has_current_image,
        }
    }
}

impl From<&StepInfo> for StepSignals {
    fn from(info: &StepInfo) -> Self {
        Self::new(
            info.is_different,
            info.has_baseline_image,
            info.has_current_image,
        )
    }
}

impl std::fmt::Display for StepSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(is_different={}, has_baseline_image={}, has_current_image={})",
            self.is_different, self.has_baseline_image, self.has_current_image
        )
    }
}

/// Map a signal triple to its status
#[must_use]
pub fn classify_signals(signals: StepSignals) -> Status {
    match (
        signals.is_different,
        signals.has_baseline_image,
        signals.has_current_image,
    ) {
        (false, false, true) => Status::New,
        (false, true, false) => Status::Missing,
        (false, true, true) => Status::Pass,
        (true, true, true) => Status::Fail,
        _ => Status::Unknown,
    }
}

/// Classify every declared step of a test result
///
/// Returns exactly `record.steps` results in step order. Steps whose signals
/// match none of the defined patterns are classified [`Status::Unknown`] and
/// logged as a warning.
///
/// # Errors
///
/// [`Error::InputShape`] if `steps_info` holds fewer entries than `steps`
/// declares.
pub fn classify(record: &TestResultRecord) -> Result<Vec<StepResult>> {
    let infos = declared_steps(record)?;

    let results = infos
        .iter()
        .enumerate()
        .map(|(index, info)| {
            let result = step_result(index + 1, info);
            if result.status == Status::Unknown {
                tracing::warn!(
                    step = result.step_number,
                    name = %result.name,
                    signals = %StepSignals::from(info),
                    "step signals match no known status pattern"
                );
            }
            result
        })
        .collect();

    Ok(results)
}

/// Classify every declared step, failing on the first unclassifiable one
///
/// # Errors
///
/// [`Error::InputShape`] as for [`classify`], and
/// [`Error::ClassificationAmbiguity`] for the first step whose signals match
/// no pattern.
pub fn classify_strict(record: &TestResultRecord) -> Result<Vec<StepResult>> {
    let infos = declared_steps(record)?;

    infos
        .iter()
        .enumerate()
        .map(|(index, info)| {
            let result = step_result(index + 1, info);
            if result.status == Status::Unknown {
                return Err(Error::ClassificationAmbiguity {
                    step: result.step_number,
                    signals: StepSignals::from(info),
                });
            }
            Ok(result)
        })
        .collect()
}

/// Project classified steps onto their statuses
#[must_use]
pub fn statuses(steps: &[StepResult]) -> Vec<Status> {
    steps.iter().map(|s| s.status).collect()
}

fn declared_steps(record: &TestResultRecord) -> Result<&[StepInfo]> {
    record
        .steps_info
        .get(..record.steps)
        .ok_or_else(|| Error::InputShape {
            message: format!(
                "test '{}' declares {} steps but stepsInfo has {} entries",
                record.name,
                record.steps,
                record.steps_info.len()
            ),
        })
}

fn step_result(step_number: usize, info: &StepInfo) -> StepResult {
    StepResult {
        step_number,
        status: classify_signals(StepSignals::from(info)),
        name: info.name.clone(),
        is_different: info.is_different,
        baseline_image_url: info.api_urls.baseline_image.clone(),
        current_image_url: info.api_urls.current_image.clone(),
        diff_image_url: info.api_urls.diff_image.clone(),
    }
}

/// Per-status counts for a classified run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Steps that matched
    pub passed: usize,
    /// Steps that differed
    pub failed: usize,
    /// Steps without a baseline
    pub new: usize,
    /// Steps without a current image
    pub missing: usize,
    /// Unclassifiable steps
    pub unknown: usize,
}

impl StatusSummary {
    /// Count statuses over classified steps
    pub fn from_steps(steps: &[StepResult]) -> Self {
        steps.iter().fold(Self::default(), |mut acc, step| {
            match step.status {
                Status::Pass => acc.passed += 1,
                Status::Fail => acc.failed += 1,
                Status::New => acc.new += 1,
                Status::Missing => acc.missing += 1,
                Status::Unknown => acc.unknown += 1,
            }
            acc
        })
    }

    /// Total number of steps counted
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.new + self.missing + self.unknown
    }

    /// True when no step failed, went missing, or was unclassifiable
    ///
    /// New steps count as success: they only lack a baseline.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.missing == 0 && self.unknown == 0
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApiUrls, AppUrls, DisplaySize};

    fn info(name: &str, d: bool, b: bool, c: bool) -> StepInfo {
        StepInfo {
            name: name.to_string(),
            is_different: d,
            has_baseline_image: b,
            has_current_image: c,
            api_urls: ApiUrls {
                baseline_image: b.then(|| format!("https://store.example/{name}/baseline")),
                current_image: c.then(|| format!("https://store.example/{name}/current")),
                diff_image: d.then(|| format!("https://store.example/{name}/diff")),
            },
        }
    }

    fn record(steps_info: Vec<StepInfo>) -> TestResultRecord {
        TestResultRecord {
            name: "Simple Test".into(),
            app_name: "Google Page".into(),
            host_display_size: DisplaySize {
                width: 1000,
                height: 700,
            },
            host_os: "Linux".into(),
            host_app: "Chrome".into(),
            app_urls: AppUrls {
                session: "https://eyes.example.com/app/batches/1/2".into(),
            },
            batch_id: "1".into(),
            id: "2".into(),
            steps: steps_info.len(),
            steps_info,
        }
    }

    #[test]
    fn defined_triples_map_to_their_status() {
        let cases = [
            ((false, false, true), Status::New),
            ((false, true, false), Status::Missing),
            ((false, true, true), Status::Pass),
            ((true, true, true), Status::Fail),
        ];
        for ((d, b, c), expected) in cases {
            assert_eq!(
                classify_signals(StepSignals::new(d, b, c)),
                expected,
                "triple ({d}, {b}, {c})"
            );
        }
    }

    #[test]
    fn undefined_triples_are_unknown() {
        let undefined = [
            (false, false, false),
            (true, false, false),
            (true, false, true),
            (true, true, false),
        ];
        for (d, b, c) in undefined {
            assert_eq!(
                classify_signals(StepSignals::new(d, b, c)),
                Status::Unknown,
                "triple ({d}, {b}, {c})"
            );
        }
    }

    #[test]
    fn three_step_scenario_yields_pass_fail_new() {
        let rec = record(vec![
            info("landing", false, true, true),
            info("login", true, true, true),
            info("profile", false, false, true),
        ]);

        let steps = classify(&rec).unwrap();

        assert_eq!(
            statuses(&steps),
            vec![Status::Pass, Status::Fail, Status::New]
        );
        let numbers: Vec<_> = steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(steps[1].name, "login");
        assert!(steps[1].is_different);
        assert_eq!(
            steps[1].diff_image_url.as_deref(),
            Some("https://store.example/login/diff")
        );
    }

    #[test]
    fn unknown_step_does_not_inherit_previous_status() {
        let rec = record(vec![
            info("a", true, true, true),
            info("b", true, false, true),
        ]);

        let steps = classify(&rec).unwrap();

        assert_eq!(statuses(&steps), vec![Status::Fail, Status::Unknown]);
    }

    #[test]
    fn status_depends_only_on_own_triple() {
        let alone = classify(&record(vec![info("x", false, true, false)])).unwrap();
        let among = classify(&record(vec![
            info("y", true, true, true),
            info("x", false, true, false),
            info("z", false, false, true),
        ]))
        .unwrap();

        assert_eq!(alone[0].status, among[1].status);
    }

    #[test]
    fn length_follows_declared_step_count() {
        let mut rec = record(vec![
            info("a", false, true, true),
            info("b", false, true, true),
            info("c", false, true, true),
        ]);
        rec.steps = 2;

        let steps = classify(&rec).unwrap();

        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn short_steps_info_is_an_input_shape_error() {
        let mut rec = record(vec![info("a", false, true, true)]);
        rec.steps = 3;

        let err = classify(&rec).unwrap_err();

        assert!(matches!(err, Error::InputShape { .. }));
        assert!(err.to_string().contains("declares 3 steps"));
    }

    #[test]
    fn zero_steps_classify_to_empty() {
        let steps = classify(&record(vec![])).unwrap();
        assert!(steps.is_empty());
    }

    #[test]
    fn strict_classification_rejects_ambiguous_step() {
        let rec = record(vec![
            info("a", false, true, true),
            info("b", false, false, false),
        ]);

        let err = classify_strict(&rec).unwrap_err();

        match err {
            Error::ClassificationAmbiguity { step, signals } => {
                assert_eq!(step, 2);
                assert_eq!(signals, StepSignals::new(false, false, false));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn strict_classification_matches_lenient_on_defined_triples() {
        let rec = record(vec![
            info("a", false, true, true),
            info("b", true, true, true),
        ]);
        assert_eq!(classify_strict(&rec).unwrap(), classify(&rec).unwrap());
    }

    #[test]
    fn statuses_is_a_projection() {
        let rec = record(vec![
            info("a", false, true, false),
            info("b", false, false, true),
        ]);
        let steps = classify(&rec).unwrap();
        let projected: Vec<_> = steps.iter().map(|s| s.status).collect();
        assert_eq!(statuses(&steps), projected);
    }

    #[test]
    fn summary_counts_each_status() {
        let rec = record(vec![
            info("a", false, true, true),
            info("b", true, true, true),
            info("c", false, false, true),
            info("d", false, true, false),
            info("e", true, false, false),
            info("f", false, true, true),
        ]);
        let summary = StatusSummary::from_steps(&classify(&rec).unwrap());

        assert_eq!(
            summary,
            StatusSummary {
                passed: 2,
                failed: 1,
                new: 1,
                missing: 1,
                unknown: 1,
            }
        );
        assert_eq!(summary.total(), 6);
        assert!(!summary.is_success());
    }

    #[test]
    fn new_steps_do_not_break_success() {
        let rec = record(vec![
            info("a", false, true, true),
            info("b", false, false, true),
        ]);
        assert!(StatusSummary::from_steps(&classify(&rec).unwrap()).is_success());
    }
}
