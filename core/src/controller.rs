//! Fetch-state controller: one observable `UiState` driven by one request.
//!
//! # Design
//! The state value, the observer list, and the in-flight task handle live
//! behind a single mutex, so a transition and its fan-out to observers are
//! one atomic step. Each observer owns an unbounded queue: transitions are
//! delivered in order and never coalesced, however slowly it drains.
//!
//! The controller is its own cancellation scope. `close` (or dropping the
//! controller) aborts the in-flight request and ends every observer; the
//! `closed` flag is checked under the same lock the task publishes through,
//! so nothing is published after teardown even if the abort loses a race.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::transport::{PostSource, Transport};
use crate::types::Post;

/// What the UI renders. Exactly one variant is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiState {
    /// No fetch attempted yet.
    #[default]
    Idle,
    Loading,
    /// Last fetch succeeded. `tasks` may be empty.
    Success { tasks: Vec<Post> },
    /// Last fetch failed with a human-readable message.
    Error { message: String },
}

impl UiState {
    pub fn name(&self) -> &'static str {
        match self {
            UiState::Idle => "idle",
            UiState::Loading => "loading",
            UiState::Success { .. } => "success",
            UiState::Error { .. } => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }
}

/// Read-only view of a controller's state.
///
/// The first item is the state current at subscription time, followed by
/// every later transition. Yields `None` once the controller is closed and
/// the queue is drained.
#[derive(Debug)]
pub struct StateObserver {
    rx: mpsc::UnboundedReceiver<UiState>,
}

impl StateObserver {
    pub async fn next(&mut self) -> Option<UiState> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`next`](Self::next); `None` when nothing is pending.
    pub fn try_next(&mut self) -> Option<UiState> {
        self.rx.try_recv().ok()
    }
}

struct Inner {
    state: UiState,
    observers: Vec<mpsc::UnboundedSender<UiState>>,
    in_flight: Option<JoinHandle<()>>,
    /// Bumped by every accepted `fetch_tasks`; ties `in_flight` to its request.
    generation: u64,
    closed: bool,
}

impl Inner {
    fn publish(&mut self, next: UiState) {
        tracing::debug!(from = self.state.name(), to = next.name(), "state transition");
        self.state = next;
        let state = &self.state;
        self.observers.retain(|tx| tx.send(state.clone()).is_ok());
    }
}

/// Settles one request. If the task is dropped before `finish` (panic
/// unwinding past it, or a runtime that discards the task unpolled) the
/// controller still leaves `Loading`.
struct Completion {
    inner: Arc<Mutex<Inner>>,
    generation: u64,
    done: bool,
}

impl Completion {
    fn finish(mut self, next: UiState) {
        self.done = true;
        self.settle(next);
    }

    fn settle(&self, next: UiState) {
        let mut inner = self.inner.lock();
        if inner.closed || inner.generation != self.generation {
            return;
        }
        inner.in_flight = None;
        inner.publish(next);
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.done {
            tracing::warn!("fetch task ended without a result");
            self.settle(UiState::Error {
                message: "unknown error: fetch task ended without a result".to_string(),
            });
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "fetch task panicked"
    }
}

pub struct FetchController<T: Transport> {
    source: Arc<PostSource<T>>,
    inner: Arc<Mutex<Inner>>,
    runtime: Handle,
}

impl<T: Transport> FetchController<T> {
    /// Create a controller in `Idle`. Requests are spawned on `runtime`.
    pub fn new(source: PostSource<T>, runtime: Handle) -> Self {
        Self {
            source: Arc::new(source),
            inner: Arc::new(Mutex::new(Inner {
                state: UiState::Idle,
                observers: Vec::new(),
                in_flight: None,
                generation: 0,
                closed: false,
            })),
            runtime,
        }
    }

    pub fn state(&self) -> UiState {
        self.inner.lock().state.clone()
    }

    pub fn observe(&self) -> StateObserver {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        // Receiver is alive, so the replay cannot fail.
        let _ = tx.send(inner.state.clone());
        if !inner.closed {
            inner.observers.push(tx);
        }
        StateObserver { rx }
    }

    /// Start a load unless one is already in flight.
    ///
    /// Returns `false` without touching the state when the controller is
    /// `Loading` or closed. Otherwise the state is `Loading` on return and
    /// exactly one request has been spawned.
    pub fn fetch_tasks(&self) -> bool {
        let generation = {
            let mut inner = self.inner.lock();
            if inner.closed {
                tracing::debug!("fetch ignored: controller closed");
                return false;
            }
            if inner.state.is_loading() {
                tracing::debug!("fetch ignored: request already in flight");
                return false;
            }
            inner.generation += 1;
            inner.publish(UiState::Loading);
            inner.generation
        };

        // Spawned outside the lock: a shut-down runtime drops the future
        // inline, and `Completion::drop` needs the lock.
        let completion = Completion {
            inner: Arc::clone(&self.inner),
            generation,
            done: false,
        };
        let source = Arc::clone(&self.source);
        let task = self.runtime.spawn(async move {
            let next = match AssertUnwindSafe(source.fetch_posts()).catch_unwind().await {
                Ok(Ok(tasks)) => {
                    tracing::info!(count = tasks.len(), "posts loaded");
                    UiState::Success { tasks }
                }
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, status = ?err.status(), "posts fetch failed");
                    UiState::Error {
                        message: err.to_string(),
                    }
                }
                Err(payload) => {
                    let cause = panic_message(payload.as_ref());
                    tracing::error!(cause, "posts fetch panicked");
                    UiState::Error {
                        message: format!("unknown error: {cause}"),
                    }
                }
            };
            completion.finish(next);
        });

        let mut inner = self.inner.lock();
        if inner.closed {
            drop(inner);
            task.abort();
        } else if inner.generation == generation && inner.state.is_loading() {
            inner.in_flight = Some(task);
        }
        true
    }

    /// Tear down the scope: cancel the in-flight request and end all observers.
    pub fn close(&self) {
        let task = {
            let mut inner = self.inner.lock();
            if inner.closed {
                return;
            }
            inner.closed = true;
            inner.observers.clear();
            inner.in_flight.take()
        };
        if let Some(task) = task {
            task.abort();
            tracing::debug!("in-flight fetch cancelled");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn source(&self) -> &PostSource<T> {
        &self.source
    }
}

impl<T: Transport> Drop for FetchController<T> {
    fn drop(&mut self) {
        self.close();
    }
}
