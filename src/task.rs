//! Panic-supervised task spawning.
//!
//! A probe that loses its reader task to a panic goes silently deaf on the
//! adapter with no indication why. `tokio::spawn`/`spawn_blocking` already
//! isolate panics into the `JoinHandle`'s `JoinError`; these wrappers just
//! make sure that error gets logged instead of dropped on the floor by a
//! caller that never awaits the handle.

use std::future::Future;

/// Spawns `fut`, logging (not propagating) any panic it produces.
pub fn spawn_supervised<F>(name: &'static str, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(fut);
    tokio::spawn(async move {
        if let Err(err) = handle.await {
            if err.is_panic() {
                tracing::error!(task = name, "task panicked");
            }
        }
    });
}

/// Spawns a blocking closure via `spawn_blocking`, logging any panic.
pub fn spawn_supervised_blocking<F>(name: &'static str, f: F)
where
    F: FnOnce() + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(f);
    tokio::spawn(async move {
        if let Err(err) = handle.await {
            if err.is_panic() {
                tracing::error!(task = name, "task panicked");
            }
        }
    });
}
