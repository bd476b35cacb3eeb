//! Callback trait for widget events.
//!
//! Inject an [`Arc<dyn WidgetObserver>`] via
//! [`crate::widget::UploadWidget::with_observer`] to redraw on every state
//! change instead of polling [`crate::widget::UploadWidget::state`].
//!
//! # Example
//!
//! ```rust
//! use contract_risk::widget::{WidgetObserver, WidgetState};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Redraws(AtomicUsize);
//!
//! impl WidgetObserver for Redraws {
//!     fn on_transition(&self, _from: &WidgetState, to: &WidgetState) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{to}");
//!     }
//! }
//! ```

use super::state::WidgetState;
use std::sync::Arc;

/// Receives widget events. All methods default to no-ops.
///
/// Methods are called without the widget's lock held, from whichever task
/// drove the change, so implementations must be `Send + Sync`.
pub trait WidgetObserver: Send + Sync {
    /// The state changed. Not called for events that left it unchanged.
    fn on_transition(&self, from: &WidgetState, to: &WidgetState) {
        let _ = (from, to);
    }

    /// A submission is about to be sent.
    fn on_request_start(&self, skip_gatekeeper: bool) {
        let _ = skip_gatekeeper;
    }

    /// An in-flight submission was abandoned by a reset. Its result, if it
    /// ever arrives, is discarded.
    fn on_request_cancelled(&self) {}
}

/// Default observer.
pub struct NoopObserver;

impl WidgetObserver for NoopObserver {}

/// Convenience alias for the stored observer type.
pub type SharedObserver = Arc<dyn WidgetObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        transitions: AtomicUsize,
        starts: AtomicUsize,
    }

    impl WidgetObserver for Counting {
        fn on_transition(&self, _from: &WidgetState, _to: &WidgetState) {
            self.transitions.fetch_add(1, Ordering::SeqCst);
        }

        fn on_request_start(&self, _skip_gatekeeper: bool) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let obs: SharedObserver = Arc::new(NoopObserver);
        obs.on_transition(&WidgetState::Idle, &WidgetState::Idle);
        obs.on_request_start(true);
        obs.on_request_cancelled();
    }

    #[test]
    fn overridden_methods_receive_events() {
        let obs = Counting::default();
        obs.on_transition(&WidgetState::Idle, &WidgetState::Idle);
        obs.on_request_start(false);
        obs.on_request_cancelled();
        assert_eq!(obs.transitions.load(Ordering::SeqCst), 1);
        assert_eq!(obs.starts.load(Ordering::SeqCst), 1);
    }
}
