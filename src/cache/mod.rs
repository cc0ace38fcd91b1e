//! Polling cache subsystem.
//!
//! A cache holds the latest snapshot of one remote list and tells its
//! listeners when the snapshot changes. The facade only depends on the
//! [`CachedModel`] trait; [`PolledCache`] is the stock implementation.
//!
//! - [`polled::PolledCache`]: fetches a URL on an interval (reqwest +
//!   tokio) and shares snapshots through a [`Store`].
//! - [`store`]: persistence seam: [`MemoryStore`] (moka) and
//!   [`FileStore`] (one JSON file per key).
//! - [`remote`]: payload fetch and parsing.

pub mod polled;
pub mod remote;
pub mod store;

pub use polled::{CacheOptions, PolledCache};
pub use store::{FileStore, MemoryStore, Store, StoredSnapshot};

use std::sync::{Arc, RwLock};

use crate::Result;

/// Kinds of event a cache emits, used to subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The snapshot was replaced.
    Change,
    /// A fetch or store sync failed; the previous snapshot is still served.
    Error,
}

/// An emitted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Change,
    Error(String),
}

impl CacheEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CacheEvent::Change => EventKind::Change,
            CacheEvent::Error(_) => EventKind::Error,
        }
    }
}

/// Event callback. Invoked synchronously on the thread that emits.
pub type Handler = Arc<dyn Fn(&CacheEvent) + Send + Sync>;

/// A cache holding the current snapshot of a remote list.
///
/// Snapshots are replaced wholesale; `data()` returns `None` until the
/// first snapshot arrives.
pub trait CachedModel<T>: Send + Sync {
    /// Key the snapshot is persisted under.
    fn key(&self) -> &str;

    /// Current snapshot.
    fn data(&self) -> Option<Arc<Vec<T>>>;

    /// Subscribe `handler` to events of `kind`.
    fn on(&self, kind: EventKind, handler: Handler);

    /// Begin polling. Calling `start` on a running cache does nothing.
    fn start(&self) -> Result<()>;

    /// Stop polling. The current snapshot is kept.
    fn stop(&self);
}

/// Ordered registry of event handlers.
#[derive(Default)]
pub struct Listeners {
    handlers: RwLock<Vec<(EventKind, Handler)>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, kind: EventKind, handler: Handler) {
        match self.handlers.write() {
            Ok(mut handlers) => handlers.push((kind, handler)),
            Err(poisoned) => poisoned.into_inner().push((kind, handler)),
        }
    }

    /// Invoke every handler registered for the event's kind, in
    /// registration order.
    ///
    /// Handlers run after the registry lock is released, so a handler may
    /// subscribe further handlers.
    pub fn emit(&self, event: &CacheEvent) {
        let kind = event.kind();
        let matching: Vec<Handler> = self
            .handlers
            .read()
            .map(|handlers| {
                handlers
                    .iter()
                    .filter(|(k, _)| *k == kind)
                    .map(|(_, h)| Arc::clone(h))
                    .collect()
            })
            .unwrap_or_default();
        for handler in matching {
            handler(event);
        }
    }

    /// Number of handlers registered for `kind`.
    pub fn count(&self, kind: EventKind) -> usize {
        self.handlers
            .read()
            .map(|handlers| handlers.iter().filter(|(k, _)| *k == kind).count())
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("change", &self.count(EventKind::Change))
            .field("error", &self.count(EventKind::Error))
            .finish()
    }
}
