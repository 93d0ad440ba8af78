use std::collections::HashSet;

use serde::Deserialize;
use url::Url;

use crate::CoreError;

/// Largest URL set a single submission may carry.
pub const DEFAULT_MAX_URLS: usize = 255;

/// Raw search request as it arrives from a client.
///
/// The form payload uses `Search`/`URLs`; the JSON API uses `phrase`/`urls`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Submission {
    #[serde(rename = "Search", alias = "phrase", default)]
    pub phrase: String,
    #[serde(rename = "URLs", alias = "urls", default)]
    pub urls: Vec<String>,
}

/// A submission that passed validation and can become a `Job`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub phrase: String,
    pub urls: Vec<String>,
}

impl Submission {
    pub fn new(phrase: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            phrase: phrase.into(),
            urls,
        }
    }

    /// Parses the JSON document carried in the `query` form field.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        if raw.trim().is_empty() {
            return Err(CoreError::InvalidInput("request is empty".into()));
        }
        serde_json::from_str(raw)
            .map_err(|err| CoreError::InvalidInput(format!("malformed request: {err}")))
    }

    pub fn validate(self, max_urls: usize) -> Result<ValidSubmission, CoreError> {
        if self.phrase.is_empty() {
            return Err(CoreError::InvalidInput("search phrase is empty".into()));
        }

        let mut seen = HashSet::new();
        let mut urls = Vec::with_capacity(self.urls.len());
        for raw in &self.urls {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let parsed = parse_fetchable(trimmed)?;
            if seen.insert(parsed) {
                urls.push(trimmed.to_string());
            }
        }

        if urls.is_empty() {
            return Err(CoreError::InvalidInput("no urls to search".into()));
        }
        if urls.len() > max_urls {
            return Err(CoreError::InvalidInput(format!(
                "too many urls: {} (limit {max_urls})",
                urls.len()
            )));
        }

        Ok(ValidSubmission {
            phrase: self.phrase,
            urls,
        })
    }
}

fn parse_fetchable(raw: &str) -> Result<Url, CoreError> {
    let parsed =
        Url::parse(raw).map_err(|err| CoreError::InvalidInput(format!("bad url {raw:?}: {err}")))?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(parsed),
        _ => Err(CoreError::InvalidInput(format!(
            "unsupported url {raw:?}: only http and https are fetched"
        ))),
    }
}
