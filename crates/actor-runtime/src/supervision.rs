/// Supervision utilities for actor operations
///
/// Provides timeout-based supervision so the monitor cannot get stuck in a
/// transitional state when a collaborator never answers (for example a
/// device whose close promise never settles).
use crate::cancellation::{race_with_cancellation, CancelToken};
use crate::executor::{sleep, spawn_task};
use futures_channel::mpsc;
use std::time::Duration;

/// Handle to cancel a timeout operation
///
/// When dropped or explicitly cancelled, the timeout task will not send
/// its message, preventing spurious timeouts after operations complete.
#[derive(Debug)]
pub struct TimeoutHandle {
    token: CancelToken,
}

impl TimeoutHandle {
    /// Cancel the timeout, preventing it from firing
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TimeoutHandle {
    fn drop(&mut self) {
        // Auto-cancel when handle is dropped
        self.cancel();
    }
}

/// Timeout configuration for supervised operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisionConfig {
    /// How long a user-initiated disconnect may take before the monitor
    /// declares the session gone
    pub closing_timeout: Duration,
}

impl Default for SupervisionConfig {
    fn default() -> Self {
        Self {
            closing_timeout: Duration::from_secs(5),
        }
    }
}

/// Spawn a timer that delivers `message` to `tx` after `after`
///
/// Returns a TimeoutHandle that can be used to cancel the timeout. If the
/// handle is dropped or cancelled before the timer fires, nothing is sent.
pub fn spawn_timeout<M: 'static>(
    mut tx: mpsc::Sender<M>,
    message: M,
    after: Duration,
) -> TimeoutHandle {
    let token = CancelToken::new();
    let watch = token.clone();

    spawn_task(async move {
        if race_with_cancellation(sleep(after), &watch).await.is_none() {
            return;
        }
        // Final check before sending timeout message
        if !watch.is_cancelled() {
            let _ = tx.try_send(message);
        }
    });

    TimeoutHandle { token }
}
