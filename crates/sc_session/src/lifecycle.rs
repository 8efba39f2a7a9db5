//! Per-message lifecycle state machine.
//!
//! Transitions are driven by discrete events (send requested, envelope
//! ready, append confirmed, echo observed, message received, decrypt
//! outcome) — never re-derived from message-list snapshots. An event that
//! does not apply in the current state is an error, not a silent no-op.
//!
//! Sender path:    Idle → Encrypting → Sending → Sent → Delivered?
//! Recipient path: Idle → Decrypting → Complete | Failed
//!
//! `Delivered` requires the transport to echo the sender's own message
//! back; without the echo, `Sent` is a valid terminal state.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

use sc_proto::DeliveryState;

/// How long a terminal status stays visible before the indicator clears.
/// Purely presentational.
pub const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(2);

/// Events that move a message through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    SendRequested,
    EnvelopeReady,
    AppendConfirmed,
    EchoObserved,
    Received,
    DecryptSucceeded,
    DecryptFailed,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Invalid lifecycle transition: {event:?} while {from:?}")]
    InvalidTransition {
        from: DeliveryState,
        event: LifecycleEvent,
    },
}

/// State machine for a single message. Client-local and transient.
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: DeliveryState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume tracking a message already known to be in `state` (e.g. a
    /// `Sent` entry whose transport echo arrives later).
    pub fn resume(state: DeliveryState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> DeliveryState {
        self.state
    }

    /// Apply an event, returning the new state.
    pub fn apply(&mut self, event: LifecycleEvent) -> Result<DeliveryState, LifecycleError> {
        use DeliveryState::*;
        use LifecycleEvent::*;

        let next = match (self.state, event) {
            (Idle, SendRequested) => Encrypting,
            (Encrypting, EnvelopeReady) => Sending,
            (Sending, AppendConfirmed) => Sent,
            (Sent, EchoObserved) => Delivered,
            (Idle, Received) => Decrypting,
            (Decrypting, DecryptSucceeded) => Complete,
            (Decrypting, DecryptFailed) => Failed,
            (from, event) => return Err(LifecycleError::InvalidTransition { from, event }),
        };
        self.state = next;
        Ok(next)
    }
}

// ── Status indicator ─────────────────────────────────────────────────────────

/// The client's "current message status" display slot. Terminal states are
/// scheduled to clear after [`STATUS_CLEAR_DELAY`]; this never affects
/// protocol correctness.
#[derive(Clone, Default)]
pub struct StatusIndicator {
    current: Arc<Mutex<Option<DeliveryState>>>,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, state: DeliveryState) {
        *self.current.lock() = Some(state);
    }

    pub fn clear(&self) {
        *self.current.lock() = None;
    }

    pub fn current(&self) -> Option<DeliveryState> {
        *self.current.lock()
    }

    /// Schedule the indicator to clear after `delay`. Requires a tokio
    /// runtime.
    pub fn clear_after(&self, delay: Duration) {
        let indicator = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            indicator.clear();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_happy_path() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), DeliveryState::Idle);
        lifecycle.apply(LifecycleEvent::SendRequested).unwrap();
        lifecycle.apply(LifecycleEvent::EnvelopeReady).unwrap();
        let sent = lifecycle.apply(LifecycleEvent::AppendConfirmed).unwrap();
        assert_eq!(sent, DeliveryState::Sent);
        assert!(sent.is_terminal());
        let delivered = lifecycle.apply(LifecycleEvent::EchoObserved).unwrap();
        assert_eq!(delivered, DeliveryState::Delivered);
    }

    #[test]
    fn recipient_paths() {
        let mut ok = Lifecycle::new();
        ok.apply(LifecycleEvent::Received).unwrap();
        assert_eq!(ok.state(), DeliveryState::Decrypting);
        assert_eq!(
            ok.apply(LifecycleEvent::DecryptSucceeded).unwrap(),
            DeliveryState::Complete
        );

        let mut failed = Lifecycle::new();
        failed.apply(LifecycleEvent::Received).unwrap();
        assert_eq!(
            failed.apply(LifecycleEvent::DecryptFailed).unwrap(),
            DeliveryState::Failed
        );
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let mut lifecycle = Lifecycle::new();
        let err = lifecycle.apply(LifecycleEvent::AppendConfirmed).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
        // State unchanged after a rejected event.
        assert_eq!(lifecycle.state(), DeliveryState::Idle);
    }

    #[tokio::test]
    async fn indicator_clears_after_delay() {
        let indicator = StatusIndicator::new();
        indicator.set(DeliveryState::Sent);
        indicator.clear_after(Duration::from_millis(50));
        assert_eq!(indicator.current(), Some(DeliveryState::Sent));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(indicator.current(), None);
    }
}
