use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_SEARCH_URL: &str = "https://openlibrary.org/search.json";
pub const DEFAULT_COVERS_URL: &str = "https://covers.openlibrary.org/b";
pub const DEFAULT_RESULT_LIMIT: u32 = 20;
const HTTP_TIMEOUT_SECS: u64 = 6;
const HTTP_USER_AGENT: &str = "BookFinder/0.1 (+https://openlibrary.org/developers/api)";

static SEARCH_DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Endpoints and request settings for the search pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub search_url: String,
    /// Base for cover images, `{covers_url}/isbn/{isbn}-M.jpg` and `{covers_url}/id/{id}-M.jpg`.
    pub covers_url: String,
    /// Sent as `limit=`; `None` leaves the server default in place.
    pub limit: Option<u32>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            covers_url: DEFAULT_COVERS_URL.to_string(),
            limit: Some(DEFAULT_RESULT_LIMIT),
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            user_agent: HTTP_USER_AGENT.to_string(),
        }
    }
}

impl SearchConfig {
    /// Defaults overridden by `BOOKFINDER_SEARCH_URL`, `BOOKFINDER_COVERS_URL`
    /// and `BOOKFINDER_LIMIT` (`0` or `none` drops the limit parameter).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("BOOKFINDER_SEARCH_URL").and_then(non_blank) {
            config.search_url = url.trim_end_matches('?').to_string();
        }
        if let Some(url) = lookup("BOOKFINDER_COVERS_URL").and_then(non_blank) {
            config.covers_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup("BOOKFINDER_LIMIT").and_then(non_blank) {
            match parse_limit(&raw) {
                Some(limit) => config.limit = limit,
                None => log::warn!("ignoring invalid BOOKFINDER_LIMIT value \"{}\"", raw),
            }
        }

        config
    }
}

fn parse_limit(raw: &str) -> Option<Option<u32>> {
    let lowered = raw.trim().to_ascii_lowercase();
    if lowered == "none" || lowered == "off" {
        return Some(None);
    }
    match lowered.parse::<u32>().ok()? {
        0 => Some(None),
        value => Some(Some(value)),
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Verbose `[search-debug]` tracing, switched on by `BOOKFINDER_SEARCH_DEBUG`.
pub fn search_debug_enabled() -> bool {
    *SEARCH_DEBUG_ENABLED.get_or_init(|| {
        std::env::var("BOOKFINDER_SEARCH_DEBUG")
            .map(|value| {
                let lowered = value.trim().to_ascii_lowercase();
                lowered == "1" || lowered == "true" || lowered == "yes" || lowered == "on"
            })
            .unwrap_or(false)
    })
}
