//! Live artifact store configuration loaded from the environment

use std::path::PathBuf;

/// Settings for tests against a real artifact store
#[derive(Debug)]
pub struct LiveStore {
    /// Path to a test-result record saved as JSON
    pub record_path: PathBuf,
    /// View key for the store
    pub view_key: String,
}

/// Load live settings from `.env` / the environment
///
/// Required environment variables:
/// - `VRT_RESULT_JSON` - Path to a saved test-result record
/// - `VRT_VIEW_KEY` - Credential token for artifact downloads
pub fn load_live_store() -> Option<LiveStore> {
    dotenvy::dotenv().ok();

    let record_path = std::env::var("VRT_RESULT_JSON").ok()?.into();
    let view_key = std::env::var("VRT_VIEW_KEY").ok()?;
    Some(LiveStore {
        record_path,
        view_key,
    })
}
