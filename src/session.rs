use crate::client::{fetch_outcome, SearchBackend};
use crate::config::{search_debug_enabled, SearchConfig};
use crate::normalize::{BookRecord, SearchOutcome};
use crate::query::{build_with, RequestDescriptor, SearchMode, ValidationError};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

pub const NO_RESULTS_MESSAGE: &str = "No books found. Try a different search term.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    Validation,
    Transport,
}

/// What the UI should currently display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SearchState {
    Idle,
    Validating,
    Loading { generation: u64 },
    Success { records: Vec<BookRecord> },
    Empty { message: String },
    Failed { kind: FailureKind, message: String },
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SearchState::Loading { .. })
    }

    pub fn records(&self) -> &[BookRecord] {
        match self {
            SearchState::Success { records } => records,
            _ => &[],
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SearchState::Empty { message } | SearchState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    fn from_outcome(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Success(records) => SearchState::Success { records },
            SearchOutcome::Empty => SearchState::Empty {
                message: NO_RESULTS_MESSAGE.to_string(),
            },
            SearchOutcome::Failure(message) => SearchState::Failed {
                kind: FailureKind::Transport,
                message,
            },
        }
    }
}

/// A request issued by [`SearchSession::begin`]. Only the ticket with the
/// latest generation may write its outcome.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    generation: u64,
    request: RequestDescriptor,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }
}

pub struct SearchSession {
    config: SearchConfig,
    generation: AtomicU64,
    state: Mutex<SearchState>,
    subscribers: Mutex<Vec<Sender<SearchState>>>,
}

impl SearchSession {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            generation: AtomicU64::new(0),
            state: Mutex::new(SearchState::Idle),
            subscribers: Mutex::new(vec![]),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn state(&self) -> SearchState {
        self.lock_state().clone()
    }

    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Every later state change is sent to the returned receiver. Dropping it unsubscribes.
    pub fn subscribe(&self) -> Receiver<SearchState> {
        let (tx, rx) = channel();
        lock(&self.subscribers).push(tx);
        rx
    }

    /// Validates the input and, if it is usable, issues a new generation and
    /// moves to `Loading`. Blank input fails here and no request is produced.
    ///
    /// Both paths supersede whatever search was in flight.
    pub fn begin(&self, raw_text: &str, mode: SearchMode) -> Result<SearchTicket, ValidationError> {
        let mut state = self.lock_state();
        self.transition(&mut state, SearchState::Validating);

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        match build_with(&self.config, raw_text, mode) {
            Ok(request) => {
                if search_debug_enabled() {
                    log::info!(
                        "[search-debug] search issued generation={} url={}",
                        generation,
                        request.to_url()
                    );
                }
                self.transition(&mut state, SearchState::Loading { generation });
                Ok(SearchTicket {
                    generation,
                    request,
                })
            }
            Err(err) => {
                self.transition(
                    &mut state,
                    SearchState::Failed {
                        kind: FailureKind::Validation,
                        message: err.to_string(),
                    },
                );
                Err(err)
            }
        }
    }

    /// Applies an outcome unless a newer search (or a clear) has been issued
    /// since the ticket was handed out. Returns whether the outcome was applied.
    pub fn complete(&self, ticket: &SearchTicket, outcome: SearchOutcome) -> bool {
        let mut state = self.lock_state();
        let latest = self.latest_generation();
        if ticket.generation != latest {
            log::info!(
                "discarding stale search response generation={} latest={}",
                ticket.generation,
                latest
            );
            return false;
        }

        let next = SearchState::from_outcome(outcome);
        match &next {
            SearchState::Success { records } => log::info!(
                "search generation={} returned {} records",
                ticket.generation,
                records.len()
            ),
            SearchState::Empty { .. } => {
                log::info!("search generation={} returned no results", ticket.generation)
            }
            _ => {}
        }
        self.transition(&mut state, next);
        true
    }

    /// Back to `Idle`; any response still in flight is discarded when it lands.
    pub fn clear(&self) {
        let mut state = self.lock_state();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.transition(&mut state, SearchState::Idle);
    }

    /// Runs a whole search on the calling thread and returns the resulting state.
    pub fn submit(&self, backend: &dyn SearchBackend, raw_text: &str, mode: SearchMode) -> SearchState {
        if let Ok(ticket) = self.begin(raw_text, mode) {
            let outcome = fetch_outcome(backend, &self.config, &ticket.request);
            self.complete(&ticket, outcome);
        }
        self.state()
    }

    /// Validates on the calling thread, then fetches on a background thread.
    /// The handle yields whether the response was applied or dropped as stale.
    pub fn spawn_search(
        self: &Arc<Self>,
        backend: Arc<dyn SearchBackend>,
        raw_text: &str,
        mode: SearchMode,
    ) -> Result<JoinHandle<bool>, ValidationError> {
        let ticket = self.begin(raw_text, mode)?;
        let session = Arc::clone(self);
        Ok(std::thread::spawn(move || {
            let outcome = fetch_outcome(backend.as_ref(), &session.config, &ticket.request);
            session.complete(&ticket, outcome)
        }))
    }

    fn transition(&self, state: &mut MutexGuard<'_, SearchState>, next: SearchState) {
        **state = next;
        let snapshot: &SearchState = state;
        lock(&self.subscribers).retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
    }

    fn lock_state(&self) -> MutexGuard<'_, SearchState> {
        lock(&self.state)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
