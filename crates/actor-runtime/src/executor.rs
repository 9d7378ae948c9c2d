//! Task spawning and timers for a single cooperative timeline.
//!
//! - WASM: `wasm_bindgen_futures::spawn_local` and `gloo_timers`
//! - Native: `tokio::task::spawn_local` and `tokio::time::sleep`. Callers
//!   must be running inside a `tokio::task::LocalSet`.
//!
//! Nothing spawned here needs to be `Send`.

use std::future::Future;
use std::time::Duration;

/// Spawn a future on the current thread's executor; the task is detached
pub fn spawn_task<F>(fut: F)
where
    F: Future<Output = ()> + 'static,
{
    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_futures::spawn_local(fut);

    #[cfg(not(target_arch = "wasm32"))]
    {
        drop(tokio::task::spawn_local(fut));
    }
}

/// Suspend the current task for `duration`
pub async fn sleep(duration: Duration) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;

    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;
}
