//! Interval-polled remote list cache.
//!
//! [`PolledCache`] keeps the latest snapshot of a remote JSON list. Once
//! started it runs up to two background tasks on the current tokio runtime:
//!
//! - **remote poll** (when a URL is configured): fetch immediately, then
//!   every `api_interval`. A successful fetch replaces the snapshot, emits
//!   [`CacheEvent::Change`] and writes the snapshot to the store. A failed
//!   fetch is logged and emitted as [`CacheEvent::Error`]; the previous
//!   snapshot stays in place. There is no retry beyond the next tick.
//! - **store sync** (when a store is configured): read the stored snapshot
//!   immediately, then every `store_interval`, and adopt it when it is newer
//!   than the one in memory. This serves the last persisted list on restart
//!   and lets processes sharing a store pick up each other's fetches.
//!
//! Routine success messages are logged at `trace` unless the cache is
//! verbose, in which case they are logged at `info`.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use metrics::{counter, gauge};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use super::remote;
use super::store::{Store, StoredSnapshot, unix_millis};
use super::{CacheEvent, CachedModel, EventKind, Handler, Listeners};
use crate::telemetry;
use crate::{CountriesError, Result};

/// Default interval between remote fetches: 1 hour.
pub const DEFAULT_API_INTERVAL: Duration = Duration::from_secs(3600);

/// Default interval between store syncs: 1 minute.
pub const DEFAULT_STORE_INTERVAL: Duration = Duration::from_secs(60);

/// Options for a single [`PolledCache`].
///
/// ```rust
/// # use countrieslib::cache::CacheOptions;
/// # use std::time::Duration;
/// let options = CacheOptions::new("countrieslib-countries")
///     .url("https://example.com/countries")
///     .api_interval(Duration::from_secs(600));
/// assert_eq!(options.key, "countrieslib-countries");
/// ```
#[derive(Clone)]
pub struct CacheOptions {
    /// Remote source. Without one the cache only syncs from the store.
    pub url: Option<String>,
    /// Backing store shared between caches and processes.
    pub store: Option<Arc<dyn Store>>,
    /// Key the snapshot is stored under.
    pub key: String,
    /// Interval between remote fetches. Default: 1 hour.
    pub api_interval: Duration,
    /// Interval between store syncs. Default: 1 minute.
    pub store_interval: Duration,
    /// Log routine fetches at `info` rather than `trace`.
    pub verbose: bool,
}

impl CacheOptions {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            url: None,
            store: None,
            key: key.into(),
            api_interval: DEFAULT_API_INTERVAL,
            store_interval: DEFAULT_STORE_INTERVAL,
            verbose: false,
        }
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn api_interval(mut self, interval: Duration) -> Self {
        self.api_interval = interval;
        self
    }

    pub fn store_interval(mut self, interval: Duration) -> Self {
        self.store_interval = interval;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// A zero period would panic inside `tokio::time::interval`.
fn check_interval(key: &str, name: &str, used: bool, interval: Duration) -> Result<()> {
    if used && interval.is_zero() {
        return Err(CountriesError::Configuration(format!(
            "{name} for cache {key} must be non-zero"
        )));
    }
    Ok(())
}

impl std::fmt::Debug for CacheOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheOptions")
            .field("url", &self.url)
            .field("store", &self.store.as_ref().map(|_| "<store>"))
            .field("key", &self.key)
            .field("api_interval", &self.api_interval)
            .field("store_interval", &self.store_interval)
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// Snapshot plus the time it was fetched.
struct Snapshot<T> {
    fetched_at: u64,
    data: Arc<Vec<T>>,
}

/// State shared between the cache handle and its background tasks.
struct Shared<T> {
    key: String,
    verbose: bool,
    snapshot: RwLock<Option<Snapshot<T>>>,
    listeners: Listeners,
}

impl<T> Shared<T> {
    fn data(&self) -> Option<Arc<Vec<T>>> {
        self.snapshot
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|s| Arc::clone(&s.data)))
    }

    /// Swap in a new snapshot if `accept` approves of the current one's
    /// timestamp, then emit `Change`. Returns whether the swap happened.
    fn replace_if(
        &self,
        fetched_at: u64,
        data: Arc<Vec<T>>,
        source: &'static str,
        accept: impl FnOnce(Option<u64>) -> bool,
    ) -> bool {
        let count = data.len();
        {
            let mut guard = match self.snapshot.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if !accept(guard.as_ref().map(|s| s.fetched_at)) {
                return false;
            }
            *guard = Some(Snapshot { fetched_at, data });
        }

        gauge!(telemetry::SNAPSHOT_RECORDS, "key" => self.key.clone()).set(count as f64);
        if self.verbose {
            info!(key = %self.key, count, source, "snapshot updated");
        } else {
            trace!(key = %self.key, count, source, "snapshot updated");
        }
        self.listeners.emit(&CacheEvent::Change);
        true
    }

    fn replace(&self, fetched_at: u64, data: Arc<Vec<T>>, source: &'static str) {
        self.replace_if(fetched_at, data, source, |_| true);
    }
}

/// Remote list cache polled on an interval. See the module docs.
pub struct PolledCache<T> {
    shared: Arc<Shared<T>>,
    url: Option<String>,
    store: Option<Arc<dyn Store>>,
    api_interval: Duration,
    store_interval: Duration,
    client: reqwest::Client,
    /// `Some` while started.
    tasks: Mutex<Option<Vec<JoinHandle<()>>>>,
}

impl<T> PolledCache<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(options: CacheOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                key: options.key,
                verbose: options.verbose,
                snapshot: RwLock::new(None),
                listeners: Listeners::new(),
            }),
            url: options.url,
            store: options.store,
            api_interval: options.api_interval,
            store_interval: options.store_interval,
            client: reqwest::Client::new(),
            tasks: Mutex::new(None),
        }
    }

    /// Replace the snapshot and emit `Change`.
    pub fn set_data(&self, data: Vec<T>) {
        self.shared.replace(unix_millis(), Arc::new(data), "local");
    }

    /// When the current snapshot was fetched, in unix milliseconds.
    pub fn fetched_at(&self) -> Option<u64> {
        self.shared
            .snapshot
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.fetched_at))
    }

    pub fn is_running(&self) -> bool {
        self.tasks.lock().map(|t| t.is_some()).unwrap_or(false)
    }
}

impl<T> CachedModel<T> for PolledCache<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn key(&self) -> &str {
        &self.shared.key
    }

    fn data(&self) -> Option<Arc<Vec<T>>> {
        self.shared.data()
    }

    fn on(&self, kind: EventKind, handler: Handler) {
        self.shared.listeners.add(kind, handler);
    }

    fn start(&self) -> Result<()> {
        check_interval(
            &self.shared.key,
            "api_interval",
            self.url.is_some(),
            self.api_interval,
        )?;
        check_interval(
            &self.shared.key,
            "store_interval",
            self.store.is_some(),
            self.store_interval,
        )?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| CountriesError::NoRuntime)?;
        let mut tasks = match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if tasks.is_some() {
            debug!(key = %self.shared.key, "already started");
            return Ok(());
        }

        debug!(key = %self.shared.key, "start");
        let mut handles = Vec::new();
        if let Some(store) = &self.store {
            handles.push(runtime.spawn(sync_store(
                Arc::clone(&self.shared),
                Arc::clone(store),
                self.store_interval,
            )));
        }
        if let Some(url) = &self.url {
            handles.push(runtime.spawn(poll_remote(
                Arc::clone(&self.shared),
                self.client.clone(),
                url.clone(),
                self.store.clone(),
                self.api_interval,
            )));
        }
        *tasks = Some(handles);
        Ok(())
    }

    fn stop(&self) {
        let handles = match self.tasks.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handles) = handles {
            debug!(key = %self.shared.key, "stop");
            for handle in handles {
                handle.abort();
            }
        }
    }
}

impl<T> Drop for PolledCache<T> {
    fn drop(&mut self) {
        let handles = match self.tasks.get_mut() {
            Ok(tasks) => tasks.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        for handle in handles.into_iter().flatten() {
            handle.abort();
        }
    }
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn poll_remote<T>(
    shared: Arc<Shared<T>>,
    client: reqwest::Client,
    url: String,
    store: Option<Arc<dyn Store>>,
    period: Duration,
) where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let mut ticker = ticker(period);
    loop {
        ticker.tick().await;
        match remote::fetch_remote::<T>(&client, &url).await {
            Ok(data) => {
                counter!(telemetry::FETCHES_TOTAL, "key" => shared.key.clone(), "status" => "ok")
                    .increment(1);
                let fetched_at = unix_millis();
                let data = Arc::new(data);
                shared.replace(fetched_at, Arc::clone(&data), "remote");
                if let Some(store) = &store {
                    persist(&shared.key, store.as_ref(), fetched_at, &data).await;
                }
            }
            Err(e) => {
                counter!(telemetry::FETCHES_TOTAL, "key" => shared.key.clone(), "status" => "error")
                    .increment(1);
                warn!(key = %shared.key, url = %url, error = %e, "fetch failed");
                shared.listeners.emit(&CacheEvent::Error(e.to_string()));
            }
        }
    }
}

/// Write a fetched snapshot to the store under `key`.
async fn persist<T: Serialize>(key: &str, store: &dyn Store, fetched_at: u64, data: &[T]) {
    let snapshot = StoredSnapshot {
        fetched_at,
        data: data.iter().collect::<Vec<&T>>(),
    };
    let result = match serde_json::to_string(&snapshot) {
        Ok(json) => store.set(key, json).await,
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        warn!(key = %key, error = %e, "failed to persist snapshot");
    }
}

async fn sync_store<T>(shared: Arc<Shared<T>>, store: Arc<dyn Store>, period: Duration)
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let mut ticker = ticker(period);
    loop {
        ticker.tick().await;
        let status = match store.get(&shared.key).await {
            Ok(None) => "ok",
            Ok(Some(raw)) => match serde_json::from_str::<StoredSnapshot<T>>(&raw) {
                Ok(stored) => {
                    let fetched_at = stored.fetched_at;
                    let adopted = shared.replace_if(fetched_at, Arc::new(stored.data), "store", |current| {
                        current.is_none_or(|current| fetched_at > current)
                    });
                    if !adopted {
                        trace!(key = %shared.key, "stored snapshot is not newer");
                    }
                    "ok"
                }
                Err(e) => {
                    warn!(key = %shared.key, error = %e, "corrupt stored snapshot");
                    "error"
                }
            },
            Err(e) => {
                warn!(key = %shared.key, error = %e, "store read failed");
                shared.listeners.emit(&CacheEvent::Error(e.to_string()));
                "error"
            }
        };
        counter!(telemetry::STORE_SYNCS_TOTAL, "key" => shared.key.clone(), "status" => status)
            .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    fn shared() -> Shared<u32> {
        Shared {
            key: "test".to_string(),
            verbose: false,
            snapshot: RwLock::new(None),
            listeners: Listeners::new(),
        }
    }

    #[test]
    fn store_snapshot_adopted_only_when_newer() {
        let shared = shared();
        shared.replace(10, Arc::new(vec![1]), "remote");
        let newer = |current: Option<u64>| current.is_none_or(|c| 5 > c);
        assert!(!shared.replace_if(5, Arc::new(vec![2]), "store", newer));
        assert_eq!(*shared.data().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn persist_writes_the_fetched_snapshot() {
        let shared = shared();
        let store = MemoryStore::new();

        let fetched = Arc::new(vec![1, 2]);
        shared.replace(10, Arc::clone(&fetched), "remote");
        // The store loop adopts a newer snapshot before the write happens.
        shared.replace_if(20, Arc::new(vec![9]), "store", |_| true);
        persist(&shared.key, &store, 10, &fetched).await;

        let raw = store.get("test").await.unwrap().unwrap();
        let stored: StoredSnapshot<u32> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.fetched_at, 10);
        assert_eq!(stored.data, vec![1, 2]);
        assert_eq!(*shared.data().unwrap(), vec![9]);
    }
}
