//! Change-notification registry.
//!
//! Settings and preset state have one source of truth and many observers;
//! components own a [`Listeners`] and broadcast after every mutation.
//! Callbacks are keyed so observers can unsubscribe explicitly.

use std::sync::Mutex;

use tracing::trace;

/// Handle returned by [`Listeners::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn Fn() + Send + Sync>;

/// A keyed list of change callbacks.
#[derive(Default)]
pub struct Listeners {
    inner: Mutex<ListenerTable>,
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked on every change broadcast.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let mut table = self.inner.lock().unwrap();
        let id = table.next_id;
        table.next_id += 1;
        table.entries.push((id, Box::new(callback)));
        SubscriptionId(id)
    }

    /// Remove a callback. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut table = self.inner.lock().unwrap();
        table.entries.retain(|(entry_id, _)| *entry_id != id.0);
    }

    /// Invoke every registered callback.
    ///
    /// Broadcasting with no listeners is a normal no-op; mutations are
    /// never skipped because nobody is watching.
    pub fn notify(&self) {
        let table = self.inner.lock().unwrap();
        trace!(count = table.entries.len(), "Notifying listeners");
        for (_, callback) in &table.entries {
            callback();
        }
    }
}
