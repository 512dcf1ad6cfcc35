//! Fetch result states and the supersession-guarded view slot

use crate::error::FetchError;
use std::sync::Arc;
use tokio::sync::watch;

/// Outcome of a fetch cycle as seen by a view
///
/// Exactly one state holds at a time. A slot only leaves `Failed` or
/// `Ready` when a new fetch cycle starts.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// No result yet: a request is in flight, or none was issued
    Pending,
    /// The request failed; the error's `Display` is the user-facing reason
    Failed(FetchError),
    /// The request succeeded
    Ready(T),
}

impl<T> FetchState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, FetchState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, FetchState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchState::Failed(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Transforms the ready value, keeping pending and failed as they are
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchState<U> {
        match self {
            FetchState::Pending => FetchState::Pending,
            FetchState::Failed(err) => FetchState::Failed(err),
            FetchState::Ready(value) => FetchState::Ready(f(value)),
        }
    }
}

impl<T> From<Result<T, FetchError>> for FetchState<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => FetchState::Ready(value),
            Err(err) => FetchState::Failed(err),
        }
    }
}

/// Proof that a fetch cycle was started, handed back on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a ticket must be passed to ViewState::complete"]
pub struct RequestTicket {
    generation: u64,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Generation-stamped state observed by subscribers
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub generation: u64,
    pub state: FetchState<Arc<T>>,
}

/// A view-owned result slot with last-request-wins semantics
///
/// Every `begin` supersedes the cycles started before it: their results are
/// dropped by `complete`, even when they arrive later than the newest one.
#[derive(Debug)]
pub struct ViewState<T> {
    tx: watch::Sender<Snapshot<T>>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ViewState<T> {
    /// Creates an empty slot: pending at generation 0, before any fetch
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Snapshot {
            generation: 0,
            state: FetchState::Pending,
        });
        Self { tx }
    }

    /// Starts a fetch cycle: the slot goes back to `Pending`
    pub fn begin(&self) -> RequestTicket {
        let mut generation = 0;
        self.tx.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.state = FetchState::Pending;
            generation = snapshot.generation;
        });
        RequestTicket { generation }
    }

    /// Applies a result if its cycle is still the newest one
    ///
    /// Returns false when the result was discarded as stale.
    pub fn complete(&self, ticket: RequestTicket, result: Result<T, FetchError>) -> bool {
        let applied = self.tx.send_if_modified(|snapshot| {
            if snapshot.generation != ticket.generation || !snapshot.state.is_pending() {
                return false;
            }
            snapshot.state = result.map(Arc::new).into();
            true
        });

        if !applied {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation(),
                "Discarding superseded fetch result"
            );
        }
        applied
    }

    /// Current state
    pub fn current(&self) -> FetchState<Arc<T>> {
        self.tx.borrow().state.clone()
    }

    /// Generation of the newest fetch cycle (0 before the first one)
    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// Subscribes to state transitions
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.tx.subscribe()
    }
}
