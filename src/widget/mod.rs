//! Client upload widget.
//!
//! ## State machine
//!
//! ```text
//! Idle ──select_file──▶ AnalyzingGatekeeper ──contract──────▶ Complete
//!  ▲        │                  │
//!  │    wrong type             └──not a contract──▶ WaitingUserConfirmation
//!  │        ▼                                          │          │
//!  │      Error ◀──────── failure ──────────┐     dismiss   confirm_anyway
//!  │                                        │          │          ▼
//!  └──────────────── reset (any state) ─────┴──── Idle ◀   AnalyzingRisk ──▶ Complete
//! ```
//!
//! [`WidgetState::next`] is the whole transition table and is pure.
//! [`UploadWidget`] drives it: it performs the network call for the two
//! analysing states and makes sure a call abandoned by [`UploadWidget::reset`]
//! can never overwrite a newer state.

mod observer;
mod state;
mod transport;

pub use observer::{NoopObserver, SharedObserver, WidgetObserver};
pub use state::{SelectedFile, WidgetEvent, WidgetState, CLIENT_TYPE_MESSAGE};
pub use transport::{AnalysisTransport, HttpTransport, TransportError};

use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

struct Inner {
    state: WidgetState,
    /// Bumped whenever a request starts or the widget is reset. A response
    /// is only applied if the generation it started under is still current.
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl Inner {
    /// Transition on `event`. Entering an analysing state bumps the
    /// generation and yields the [`Job`] to send.
    fn step(&mut self, event: WidgetEvent) -> (WidgetState, WidgetState, Option<Job>) {
        let from = self.state.clone();
        let to = from.clone().next(event);
        let mut job = None;

        if to != from {
            if let Some((file, skip_gatekeeper)) = to.submission() {
                self.generation += 1;
                let token = CancellationToken::new();
                self.in_flight = Some(token.clone());
                job = Some(Job {
                    generation: self.generation,
                    token,
                    file: file.clone(),
                    skip_gatekeeper,
                });
            }
            self.state = to.clone();
        }
        (from, to, job)
    }
}

/// A submission that [`Inner::step`] decided to send.
struct Job {
    generation: u64,
    token: CancellationToken,
    file: SelectedFile,
    skip_gatekeeper: bool,
}

/// Controller that owns a [`WidgetState`] and talks to the endpoint.
///
/// Share it behind an `Arc`: one task awaits [`UploadWidget::select_file`]
/// while another may call [`UploadWidget::reset`].
pub struct UploadWidget {
    transport: Arc<dyn AnalysisTransport>,
    observer: SharedObserver,
    inner: Mutex<Inner>,
}

impl UploadWidget {
    pub fn new(transport: Arc<dyn AnalysisTransport>) -> Self {
        Self {
            transport,
            observer: Arc::new(NoopObserver),
            inner: Mutex::new(Inner {
                state: WidgetState::Idle,
                generation: 0,
                in_flight: None,
            }),
        }
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> WidgetState {
        self.lock().state.clone()
    }

    /// Accept a file and, if its type is allowed, submit it.
    ///
    /// Resolves once the widget has settled (or immediately if the file was
    /// rejected client-side). Ignored unless the widget is idle.
    pub async fn select_file(&self, file: SelectedFile) -> WidgetState {
        self.drive(WidgetEvent::FileSelected(file)).await
    }

    /// Re-submit a rejected document with the contract check skipped.
    pub async fn confirm_anyway(&self) -> WidgetState {
        self.drive(WidgetEvent::ConfirmAnyway).await
    }

    /// Accept the "not a contract" verdict and go back to idle.
    pub fn dismiss(&self) -> WidgetState {
        let (state, _) = self.apply(WidgetEvent::Dismiss);
        state
    }

    /// Return to idle from any state, abandoning an in-flight request.
    pub fn reset(&self) -> WidgetState {
        let cancelled = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.in_flight.take()
        };
        if let Some(token) = cancelled {
            token.cancel();
            debug!("Widget reset cancelled the in-flight request");
            self.observer.on_request_cancelled();
        }
        let (state, _) = self.apply(WidgetEvent::Reset);
        state
    }

    /// Same as [`UploadWidget::reset`]; offered from the error view.
    pub fn retry(&self) -> WidgetState {
        self.reset()
    }

    async fn drive(&self, event: WidgetEvent) -> WidgetState {
        let (state, job) = self.apply(event);
        match job {
            Some(job) => self.run(job).await,
            None => state,
        }
    }

    async fn run(&self, job: Job) -> WidgetState {
        self.observer.on_request_start(job.skip_gatekeeper);
        info!(
            "Submitting {} ({} bytes), skip_gatekeeper={}",
            job.file.file_name,
            job.file.bytes.len(),
            job.skip_gatekeeper
        );

        let outcome = tokio::select! {
            _ = job.token.cancelled() => return self.state(),
            outcome = self.transport.submit(&job.file, job.skip_gatekeeper) => outcome,
        };

        let event = match outcome {
            Ok(result) => WidgetEvent::Succeeded(result),
            Err(e) => WidgetEvent::Failed(e.to_string()),
        };
        self.finish(job.generation, event)
    }

    /// Apply a response, unless a reset or newer request superseded it.
    ///
    /// The generation check and the transition happen under one guard.
    fn finish(&self, generation: u64, event: WidgetEvent) -> WidgetState {
        let (from, to) = {
            let mut inner = self.lock();
            if inner.generation != generation {
                debug!("Discarding stale response (generation {})", generation);
                return inner.state.clone();
            }
            inner.in_flight = None;
            let (from, to, _) = inner.step(event);
            (from, to)
        };
        self.notify(&from, &to);
        to
    }

    /// Run one transition and start a request if the new state needs one.
    fn apply(&self, event: WidgetEvent) -> (WidgetState, Option<Job>) {
        let (from, to, job) = self.lock().step(event);
        self.notify(&from, &to);
        (to, job)
    }

    fn notify(&self, from: &WidgetState, to: &WidgetState) {
        if to != from {
            debug!("Widget: {} → {}", from.name(), to.name());
            self.observer.on_transition(from, to);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
