//! Cancellation utilities for interruptible operations
//!
//! A [`CancelToken`] is shared between the monitor actor and a spawned task.
//! The task races its single suspension point (a read, a timer) against the
//! token; the actor cancels it to request teardown. Cancelling twice, or
//! cancelling after the task already finished, is a no-op.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    wakers: Mutex<Vec<Waker>>,
}

/// Shared cancellation flag with wake-up on cancel
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake every task waiting on [`cancelled`](Self::cancelled)
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let wakers = match self.inner.wakers.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for waker in wakers {
            waker.wake();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Future that completes once the token is cancelled
    pub fn cancelled(&self) -> Cancelled {
        Cancelled {
            token: self.clone(),
        }
    }

    fn register(&self, waker: &Waker) {
        let mut guard = match self.inner.wakers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !guard.iter().any(|w| w.will_wake(waker)) {
            guard.push(waker.clone());
        }
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Future returned by [`CancelToken::cancelled`]
pub struct Cancelled {
    token: CancelToken,
}

impl Future for Cancelled {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.token.is_cancelled() {
            return Poll::Ready(());
        }
        self.token.register(cx.waker());
        // Re-check: cancel() may have drained wakers between the load and the push
        if self.token.is_cancelled() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

/// Races a future against cancellation, returns None if cancelled
///
/// If the token is already cancelled the future is not polled at all. When
/// both are ready in the same poll, the work result wins so a chunk that
/// already arrived is not thrown away.
///
/// # Example
/// ```ignore
/// match race_with_cancellation(source.read(), &token).await {
///     Some(Ok(outcome)) => handle(outcome),
///     Some(Err(e)) => fail(e),
///     None => teardown(),
/// }
/// ```
pub async fn race_with_cancellation<T, F>(fut: F, token: &CancelToken) -> Option<T>
where
    F: Future<Output = T>,
{
    use futures::future::{select, Either};

    if token.is_cancelled() {
        return None;
    }

    let work = std::pin::pin!(fut);
    let cancel = token.cancelled();

    match select(work, cancel).await {
        Either::Left((result, _)) => Some(result),
        Either::Right(_) => None,
    }
}
