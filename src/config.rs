//! Configuration for [`CountriesCachedModel`](crate::CountriesCachedModel).
//!
//! Options can be built in code or loaded from a TOML file:
//!
//! ```toml
//! key = "countrieslib"
//! countryUrl = "https://reference.example/countries"
//! policyUrl = "https://reference.example/policy"
//! countryInterval = 3600000
//! policyInterval = 3600000
//! storeInterval = 60000
//! verbose = false
//! ```
//!
//! Intervals are in milliseconds. The backing store is a runtime handle and
//! is never read from a file; set it with [`CountriesConfig::store`].

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::polled::{DEFAULT_API_INTERVAL, DEFAULT_STORE_INTERVAL};
use crate::cache::{CacheOptions, Store};
use crate::{CountriesError, Result};

/// Default cache key prefix.
pub const DEFAULT_KEY: &str = "countrieslib";

/// Options for the country and policy caches.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountriesConfig {
    /// Cache key prefix (default: `"countrieslib"`).
    #[serde(default = "default_key")]
    pub key: String,
    /// Country list source.
    #[serde(default)]
    pub country_url: Option<String>,
    /// Policy list source.
    #[serde(default)]
    pub policy_url: Option<String>,
    /// Milliseconds between country fetches (default: 1 hour).
    #[serde(default = "default_api_interval_ms", rename = "countryInterval")]
    pub country_interval_ms: u64,
    /// Milliseconds between policy fetches (default: 1 hour).
    #[serde(default = "default_api_interval_ms", rename = "policyInterval")]
    pub policy_interval_ms: u64,
    /// Milliseconds between store syncs (default: 1 minute).
    #[serde(default = "default_store_interval_ms", rename = "storeInterval")]
    pub store_interval_ms: u64,
    /// Log routine cache activity at `info` instead of `trace`.
    #[serde(default)]
    pub verbose: bool,
    /// Backing store shared by both caches.
    #[serde(skip)]
    pub store: Option<Arc<dyn Store>>,
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

fn default_api_interval_ms() -> u64 {
    DEFAULT_API_INTERVAL.as_millis() as u64
}

fn default_store_interval_ms() -> u64 {
    DEFAULT_STORE_INTERVAL.as_millis() as u64
}

impl Default for CountriesConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            country_url: None,
            policy_url: None,
            country_interval_ms: default_api_interval_ms(),
            policy_interval_ms: default_api_interval_ms(),
            store_interval_ms: default_store_interval_ms(),
            verbose: false,
            store: None,
        }
    }
}

impl CountriesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache key prefix.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn country_url(mut self, url: impl Into<String>) -> Self {
        self.country_url = Some(url.into());
        self
    }

    pub fn policy_url(mut self, url: impl Into<String>) -> Self {
        self.policy_url = Some(url.into());
        self
    }

    pub fn country_interval(mut self, interval: Duration) -> Self {
        self.country_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn policy_interval(mut self, interval: Duration) -> Self {
        self.policy_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn store_interval(mut self, interval: Duration) -> Self {
        self.store_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Options for the country cache (key `"{key}-countries"`).
    pub fn country_cache_options(&self) -> CacheOptions {
        self.cache_options(
            "countries",
            self.country_url.as_deref(),
            self.country_interval_ms,
        )
    }

    /// Options for the policy cache (key `"{key}-policy"`).
    pub fn policy_cache_options(&self) -> CacheOptions {
        self.cache_options(
            "policy",
            self.policy_url.as_deref(),
            self.policy_interval_ms,
        )
    }

    fn cache_options(&self, suffix: &str, url: Option<&str>, interval_ms: u64) -> CacheOptions {
        let mut options = CacheOptions::new(format!("{}-{suffix}", self.key))
            .api_interval(Duration::from_millis(interval_ms))
            .store_interval(Duration::from_millis(self.store_interval_ms))
            .verbose(self.verbose);
        options.url = url.map(str::to_string);
        options.store = self.store.clone();
        options
    }

    /// Parse options from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            CountriesError::Configuration(format!("Failed to parse config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load options from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CountriesError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            CountriesError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject intervals the polling loops cannot tick at.
    pub fn validate(&self) -> Result<()> {
        for (name, ms) in [
            ("countryInterval", self.country_interval_ms),
            ("policyInterval", self.policy_interval_ms),
            ("storeInterval", self.store_interval_ms),
        ] {
            if ms == 0 {
                return Err(CountriesError::Configuration(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for CountriesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountriesConfig")
            .field("key", &self.key)
            .field("country_url", &self.country_url)
            .field("policy_url", &self.policy_url)
            .field("country_interval_ms", &self.country_interval_ms)
            .field("policy_interval_ms", &self.policy_interval_ms)
            .field("store_interval_ms", &self.store_interval_ms)
            .field("verbose", &self.verbose)
            .field("store", &self.store.as_ref().map(|_| "<store>"))
            .finish()
    }
}
