use crate::config::{search_debug_enabled, SearchConfig};
use crate::normalize::{normalize_with, SearchOutcome};
use crate::query::RequestDescriptor;
use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;

/// Shown to the user for any transport failure; the detail only goes to the log.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Failed to search books. Please try again.";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search endpoint returned status {0}")]
    Status(u16),

    #[error("response was not valid JSON: {0}")]
    Decode(String),
}

/// Anything that can resolve a request into a raw JSON payload.
pub trait SearchBackend: Send + Sync {
    fn fetch(&self, request: &RequestDescriptor) -> Result<Value, TransportError>;
}

pub struct OpenLibraryClient {
    client: Client,
}

impl OpenLibraryClient {
    pub fn new(config: &SearchConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

impl SearchBackend for OpenLibraryClient {
    fn fetch(&self, request: &RequestDescriptor) -> Result<Value, TransportError> {
        let url = request.to_url();
        let debug_enabled = search_debug_enabled();
        if debug_enabled {
            log::info!("[search-debug] http start url={}", url);
        }

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            if debug_enabled {
                log::warn!("[search-debug] http status url={} status={}", url, status);
            }
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.text()?;
        if debug_enabled {
            log::info!(
                "[search-debug] http success url={} status={} bytes={}",
                url,
                status,
                body.len()
            );
        }
        serde_json::from_str::<Value>(&body).map_err(|err| TransportError::Decode(err.to_string()))
    }
}

/// Runs one request through the backend and the normalizer.
///
/// Transport failures never reach the normalizer; they collapse into a
/// [`SearchOutcome::Failure`] carrying [`TRANSPORT_FAILURE_MESSAGE`].
pub fn fetch_outcome(
    backend: &dyn SearchBackend,
    config: &SearchConfig,
    request: &RequestDescriptor,
) -> SearchOutcome {
    match backend.fetch(request) {
        Ok(payload) => normalize_with(&config.covers_url, &payload),
        Err(err) => {
            log::error!("book search failed url={}: {}", request.to_url(), err);
            SearchOutcome::Failure(TRANSPORT_FAILURE_MESSAGE.to_string())
        }
    }
}
