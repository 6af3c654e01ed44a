//! live::debounce
//!
//! Trailing-edge debouncing of async jobs.
//!
//! # Semantics
//!
//! The first [`Debouncer::call`] in an idle debouncer opens a window. Calls
//! made while the window is open only replace the pending argument. When
//! the window closes the job runs once with the latest argument, and the
//! debouncer is idle again. Two job starts are therefore always at least one
//! window apart, and no call is ever dropped without a later one superseding
//! it.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::runtime::Handle;

type Job<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

/// A debounced async job.
pub struct Debouncer<T> {
    window: Duration,
    pending: Arc<Mutex<Option<T>>>,
    job: Job<T>,
    runtime: Handle,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Debounce `job` over `window`, spawning on `runtime`.
    pub fn new<F, Fut>(window: Duration, runtime: Handle, job: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            window,
            pending: Arc::new(Mutex::new(None)),
            job: Arc::new(move |arg: T| job(arg).boxed()),
            runtime,
        }
    }

    /// Schedule the job with `arg`, replacing any argument still pending.
    pub fn call(&self, arg: T) {
        let opened = lock(&self.pending).replace(arg).is_none();
        if !opened {
            return;
        }

        let pending = Arc::clone(&self.pending);
        let job = Arc::clone(&self.job);
        let window = self.window;
        self.runtime.spawn(async move {
            tokio::time::sleep(window).await;
            let latest = lock(&pending).take();
            if let Some(arg) = latest {
                job(arg).await;
            }
        });
    }

    /// Whether a call is waiting for its window to close.
    pub fn is_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl<T> fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
