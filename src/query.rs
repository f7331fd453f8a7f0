use crate::config::SearchConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Title,
    Author,
    Generic,
}

impl SearchMode {
    /// Query-string key the search endpoint expects for this mode.
    pub fn param_key(self) -> &'static str {
        match self {
            SearchMode::Title => "title",
            SearchMode::Author => "author",
            SearchMode::Generic => "q",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            SearchMode::Title => "Enter book title...",
            SearchMode::Author => "Enter author name...",
            SearchMode::Generic => "Enter a title, author or subject...",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Some(SearchMode::Title),
            "author" => Some(SearchMode::Author),
            "q" | "any" | "generic" => Some(SearchMode::Generic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a search term")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub raw_text: String,
    pub mode: SearchMode,
}

impl SearchQuery {
    pub fn new(raw_text: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            raw_text: raw_text.into(),
            mode,
        }
    }

    pub fn build(&self, config: &SearchConfig) -> Result<RequestDescriptor, ValidationError> {
        build_with(config, &self.raw_text, self.mode)
    }
}

/// A fully resolved search request. Parameter values are already percent-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    url: String,
    encoded_params: BTreeMap<String, String>,
}

impl RequestDescriptor {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn encoded_params(&self) -> &BTreeMap<String, String> {
        &self.encoded_params
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.encoded_params.get(key).map(String::as_str)
    }

    pub fn to_url(&self) -> String {
        if self.encoded_params.is_empty() {
            return self.url.clone();
        }
        let query = self
            .encoded_params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, query)
    }
}

/// Builds a request against the default Open Library endpoint.
pub fn build(raw_text: &str, mode: SearchMode) -> Result<RequestDescriptor, ValidationError> {
    build_with(&SearchConfig::default(), raw_text, mode)
}

pub fn build_with(
    config: &SearchConfig,
    raw_text: &str,
    mode: SearchMode,
) -> Result<RequestDescriptor, ValidationError> {
    let cleaned = raw_text.trim();
    if cleaned.is_empty() {
        return Err(ValidationError::Empty);
    }

    let mut encoded_params = BTreeMap::new();
    encoded_params.insert(
        mode.param_key().to_string(),
        urlencoding::encode(cleaned).into_owned(),
    );
    if let Some(limit) = config.limit {
        encoded_params.insert("limit".to_string(), limit.to_string());
    }

    Ok(RequestDescriptor {
        url: config.search_url.clone(),
        encoded_params,
    })
}
