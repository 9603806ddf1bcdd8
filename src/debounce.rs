//! Quiet-window coalescing for device-apply calls.
//!
//! Slider dragging produces a storm of setting writes; the driver only
//! needs the last one. [`Debouncer`] runs an action after a quiet period,
//! dropping any previously pending action when a newer one arrives —
//! last write wins.

use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Quiet window before a coalesced apply call goes out.
pub const DEFAULT_APPLY_DEBOUNCE: Duration = Duration::from_millis(300);

/// Coalesces rapid successive calls into one, run after a quiet period.
///
/// Must be used from within a tokio runtime. Dropping the debouncer aborts
/// any pending action.
pub struct Debouncer {
    quiet: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: Mutex::new(None),
        }
    }

    /// Schedule `action` to run after the quiet window, superseding any
    /// action scheduled earlier that has not fired yet.
    pub fn call(&self, action: impl FnOnce() + Send + 'static) {
        let mut pending = self.pending.lock().unwrap();
        if let Some(handle) = pending.take() {
            trace!("Superseding pending debounced action");
            handle.abort();
        }
        let quiet = self.quiet;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            action();
        }));
    }

    /// Drop the pending action without running it.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let reader = Arc::clone(&count);
        (count, move || reader.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_runs_after_quiet_window() {
        let debouncer = Debouncer::new(Duration::from_millis(20));
        let (count, read) = counter();

        let c = Arc::clone(&count);
        debouncer.call(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(read(), 1);
    }

    #[tokio::test]
    async fn test_rapid_calls_coalesce_to_last() {
        let debouncer = Debouncer::new(Duration::from_millis(30));
        let (count, read) = counter();

        for _ in 0..5 {
            let c = Arc::clone(&count);
            debouncer.call(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(read(), 1);
    }

    #[tokio::test]
    async fn test_cancel_drops_pending() {
        let debouncer = Debouncer::new(Duration::from_millis(20));
        let (count, read) = counter();

        let c = Arc::clone(&count);
        debouncer.call(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(read(), 0);
    }
}
