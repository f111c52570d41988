//! Provider session URLs
//!
//! A session page URL looks like
//! `https://eyes.example.com/app/batches/{batch}/{session}?accountId=...`.
//! Everything before `/app` is the provider server, which is also the base
//! for artifact links the provider reports as relative paths.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

// Pattern is a literal, compilation cannot fail
#[allow(clippy::unwrap_used)]
static SESSION_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<server>.+?)/app/batches/(?P<batch>[^/?#]+)/(?P<session>[^/?#]+)").unwrap()
});

/// Server, batch and session parsed from a session page URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRef {
    /// Provider server, e.g. `https://eyes.example.com`
    pub server_url: Url,
    /// Batch identifier
    pub batch_id: String,
    /// Session identifier
    pub session_id: String,
}

impl SessionRef {
    /// Parse a session page URL
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUrl`] if the URL does not contain
    /// `/app/batches/{batch}/{session}` or the server part is not a URL.
    pub fn parse(session_url: &str) -> Result<Self> {
        let caps = SESSION_URL
            .captures(session_url)
            .ok_or_else(|| Error::InvalidUrl {
                url: redact_str(session_url),
                reason: "expected /app/batches/{batch}/{session}".to_string(),
            })?;

        Ok(Self {
            server_url: parse_url(&caps["server"])?,
            batch_id: caps["batch"].to_string(),
            session_id: caps["session"].to_string(),
        })
    }
}

/// Provider server derived from a session page URL
///
/// Takes everything before the first `/app`; a URL without `/app` is used
/// whole.
pub fn server_url(session_url: &str) -> Result<Url> {
    let base = session_url
        .split_once("/app")
        .map_or(session_url, |(server, _)| server);
    parse_url(base)
}

/// Resolve an artifact link against the provider server
///
/// Absolute links are returned unchanged; relative ones are appended to
/// the server URL, keeping any path prefix it has
/// (`https://host/eyes` + `/api/images/1` is `https://host/eyes/api/images/1`).
pub fn resolve_artifact_url(server: Option<&Url>, link: &str) -> Result<Url> {
    match Url::parse(link) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let server = server.ok_or_else(|| Error::InvalidUrl {
                url: redact_str(link),
                reason: "relative link and no server URL to resolve it against".to_string(),
            })?;
            let mut base = server.clone();
            if !base.path().ends_with('/') {
                let path = format!("{}/", base.path());
                base.set_path(&path);
            }
            base.join(link.trim_start_matches('/')).map_err(|e| Error::InvalidUrl {
                url: redact_str(link),
                reason: e.to_string(),
            })
        }
        Err(e) => Err(Error::InvalidUrl {
            url: redact_str(link),
            reason: e.to_string(),
        }),
    }
}

/// Set the credential token as the `apiKey` query parameter
///
/// Other query pairs are kept; an `apiKey` already on the link is replaced.
pub fn with_credential(mut url: Url, token: &str) -> Url {
    if url.query_pairs().any(|(k, _)| k == "apiKey") {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "apiKey")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    url.query_pairs_mut().append_pair("apiKey", token);
    url
}

/// URL safe to log: query string and fragment removed
#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.set_fragment(None);
    clean.to_string()
}

fn redact_str(raw: &str) -> String {
    raw.split(['?', '#']).next().unwrap_or_default().to_string()
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::InvalidUrl {
        url: redact_str(raw),
        reason: e.to_string(),
    })
}
