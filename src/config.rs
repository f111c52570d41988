//! Configuration types for vrt-results

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retrieval behavior, passed explicitly into every retrieval call
///
/// All fields have defaults, so `RetrievalConfig::default()` reproduces the
/// plain behavior: every kind downloads everything, the full default
/// directory taxonomy is used, downloads run one at a time, and a missing
/// root directory is an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// When retrieving diff images, only fetch steps flagged as different (default: false)
    #[serde(default)]
    pub download_diffs_only: bool,

    /// Replace the default directory taxonomy with these segments (default: None)
    ///
    /// The batch id and session id are always appended after the override.
    #[serde(default)]
    pub directory_override: Option<Vec<String>>,

    /// Maximum downloads in flight (default: 1)
    ///
    /// With 1, downloads run strictly in ascending step order and each one
    /// finishes before the next begins. Higher values give up the completion
    /// order guarantee; the report is still in step order.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,

    /// Use the current working directory when the root does not exist (default: false)
    #[serde(default)]
    pub fallback_to_current_dir: bool,

    /// Per-request timeout (default: None, a stalled connection stalls the retrieval)
    #[serde(default, with = "optional_secs")]
    pub fetch_timeout: Option<Duration>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            download_diffs_only: false,
            directory_override: None,
            max_concurrent_downloads: default_max_concurrent(),
            fallback_to_current_dir: false,
            fetch_timeout: None,
        }
    }
}

impl RetrievalConfig {
    /// Check settings that serde cannot enforce
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_downloads == 0 {
            return Err(Error::Config {
                message: "max_concurrent_downloads must be at least 1".to_string(),
                key: Some("max_concurrent_downloads".to_string()),
            });
        }
        if let Some(timeout) = self.fetch_timeout
            && timeout.is_zero()
        {
            return Err(Error::Config {
                message: "fetch_timeout must be greater than zero".to_string(),
                key: Some("fetch_timeout".to_string()),
            });
        }
        Ok(())
    }

    /// Builder-style setter for the diff-only filter
    pub fn with_diffs_only(mut self, diffs_only: bool) -> Self {
        self.download_diffs_only = diffs_only;
        self
    }

    /// Builder-style setter for the directory override
    pub fn with_directory_override<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directory_override = Some(segments.into_iter().map(Into::into).collect());
        self
    }
}

fn default_max_concurrent() -> usize {
    1
}

/// Serialize `Option<Duration>` as whole seconds
mod optional_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}
