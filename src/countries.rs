//! Country and policy reference data facade.
//!
//! [`CountriesCachedModel`] owns a country cache and a policy cache and keeps
//! a [`CountryIndex`] and a [`PolicyIndex`] in step with them: each cache's
//! `Change` event rebuilds the matching index in full. Queries are
//! synchronous reads of whichever index was built last.
//!
//! # Lookup results
//!
//! Keyed queries return [`Lookup`]:
//!
//! | Situation | Result |
//! |---|---|
//! | key absent or empty | `NoKey` |
//! | no record for the key | `NotFound` |
//! | country found, no policy for it (`*_data_*` and flag queries) | `Incomplete` |
//! | otherwise | `Found(..)` |
//!
//! Country codes are looked up with `"UK"` treated as `"GB"`.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use metrics::counter;
use tracing::debug;

use crate::cache::{CacheEvent, CachedModel, EventKind, Handler, PolledCache};
use crate::config::CountriesConfig;
use crate::index::{CountryIndex, IndexSlot, PolicyIndex};
use crate::telemetry;
use crate::types::{Country, CountryData, Lookup, Policy, canonical_country_code};
use crate::Result;

/// Country and policy caches with derived lookups. See the module docs.
pub struct CountriesCachedModel {
    country_cache: Arc<dyn CachedModel<Country>>,
    policy_cache: Arc<dyn CachedModel<Policy>>,
    countries: Arc<IndexSlot<CountryIndex>>,
    policies: Arc<IndexSlot<PolicyIndex>>,
}

impl CountriesCachedModel {
    /// Create polled caches from `config` and wire the indexers.
    ///
    /// No fetching happens until [`start`](Self::start).
    pub fn new(config: CountriesConfig) -> Self {
        let country_cache = PolledCache::<Country>::new(config.country_cache_options());
        let policy_cache = PolledCache::<Policy>::new(config.policy_cache_options());
        Self::with_caches(Arc::new(country_cache), Arc::new(policy_cache))
    }

    /// Wire the indexers to existing caches.
    pub fn with_caches(
        country_cache: Arc<dyn CachedModel<Country>>,
        policy_cache: Arc<dyn CachedModel<Policy>>,
    ) -> Self {
        let countries = Arc::new(IndexSlot::default());
        let policies = Arc::new(IndexSlot::default());

        country_cache.on(
            EventKind::Change,
            reindex_on_change(&country_cache, &countries, index_countries),
        );
        policy_cache.on(
            EventKind::Change,
            reindex_on_change(&policy_cache, &policies, index_policies),
        );

        Self {
            country_cache,
            policy_cache,
            countries,
            policies,
        }
    }

    /// Subscribe `handler` on both caches, countries first.
    pub fn on(&self, kind: EventKind, handler: Handler) {
        self.country_cache.on(kind, Arc::clone(&handler));
        self.policy_cache.on(kind, handler);
    }

    /// Start both caches, countries first.
    pub fn start(&self) -> Result<()> {
        debug!("start");
        self.country_cache.start()?;
        self.policy_cache.start()
    }

    /// Stop both caches, countries first.
    pub fn stop(&self) {
        debug!("stop");
        self.country_cache.stop();
        self.policy_cache.stop();
    }

    /// Rebuild the country index from the country cache's snapshot.
    pub fn reindex_countries(&self) {
        index_countries(&self.countries, self.country_cache.data().as_deref());
    }

    /// Rebuild the policy index from the policy cache's snapshot.
    pub fn reindex_policies(&self) {
        index_policies(&self.policies, self.policy_cache.data().as_deref());
    }

    /// The current country index.
    pub fn country_index(&self) -> Arc<CountryIndex> {
        self.countries.load()
    }

    /// The current policy index.
    pub fn policy_index(&self) -> Arc<PolicyIndex> {
        self.policies.load()
    }

    /// The raw country snapshot, unfiltered. `None` before the first fetch.
    pub fn get_all_countries(&self) -> Option<Arc<Vec<Country>>> {
        self.country_cache.data()
    }

    pub fn get_overseas_countries(&self) -> Vec<Arc<Country>> {
        self.countries.load().overseas.clone()
    }

    pub fn get_residence_countries(&self) -> Vec<Arc<Country>> {
        self.countries.load().residence.clone()
    }

    pub fn get_overseas_residence_countries(&self) -> Vec<Arc<Country>> {
        self.countries.load().overseas_residence.clone()
    }

    pub fn get_birth_countries(&self) -> Vec<Arc<Country>> {
        self.countries.load().birth.clone()
    }

    pub fn get_overseas_birth_countries(&self) -> Vec<Arc<Country>> {
        self.countries.load().overseas_birth.clone()
    }

    pub fn get_country_by_id<'a>(&self, id: impl Into<Option<&'a str>>) -> Lookup<Arc<Country>> {
        let Some(id) = supplied(id.into()) else {
            return Lookup::NoKey;
        };
        lookup_in(&self.countries.load().by_id, canonical_country_code(id))
    }

    pub fn get_country_by_slug<'a>(
        &self,
        slug: impl Into<Option<&'a str>>,
    ) -> Lookup<Arc<Country>> {
        let Some(slug) = supplied(slug.into()) else {
            return Lookup::NoKey;
        };
        lookup_in(&self.countries.load().by_slug, slug)
    }

    pub fn get_country_by_display_name<'a>(
        &self,
        name: impl Into<Option<&'a str>>,
    ) -> Lookup<Arc<Country>> {
        let Some(name) = supplied(name.into()) else {
            return Lookup::NoKey;
        };
        lookup_in(&self.countries.load().by_display_name, name)
    }

    /// Country merged with its policy.
    pub fn get_country_data_by_id<'a>(
        &self,
        id: impl Into<Option<&'a str>>,
    ) -> Lookup<CountryData> {
        self.merge_with_policy(self.get_country_by_id(id))
    }

    /// Country merged with its policy.
    pub fn get_country_data_by_slug<'a>(
        &self,
        slug: impl Into<Option<&'a str>>,
    ) -> Lookup<CountryData> {
        self.merge_with_policy(self.get_country_by_slug(slug))
    }

    /// Slug of the country with this code. `NotFound` also covers a
    /// country without a slug.
    pub fn get_slug_by_id<'a>(&self, id: impl Into<Option<&'a str>>) -> Lookup<String> {
        self.get_country_by_id(id).and_then(|country| match country.slug() {
            Some(slug) => Lookup::Found(slug.to_string()),
            None => Lookup::NotFound,
        })
    }

    /// Whether the merged record's content type marks it restricted.
    pub fn is_restricted_by_id<'a>(&self, id: impl Into<Option<&'a str>>) -> Lookup<bool> {
        self.get_country_data_by_id(id).map(|data| data.is_restricted())
    }

    /// Whether the merged record's status is `"ACTIVE"`.
    pub fn is_active_by_id<'a>(&self, id: impl Into<Option<&'a str>>) -> Lookup<bool> {
        self.get_country_data_by_id(id).map(|data| data.is_active())
    }

    fn merge_with_policy(&self, country: Lookup<Arc<Country>>) -> Lookup<CountryData> {
        let policies = self.policies.load();
        country.and_then(|country| match policies.get(&country.country_code) {
            Some(policy) => Lookup::Found(CountryData::merge(&country, policy)),
            None => Lookup::Incomplete,
        })
    }
}

impl std::fmt::Debug for CountriesCachedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountriesCachedModel")
            .field("country_cache", &self.country_cache.key())
            .field("policy_cache", &self.policy_cache.key())
            .field("countries", &self.countries.load().by_id.len())
            .field("policies", &self.policies.load().by_id.len())
            .finish()
    }
}

/// Build a `Change` handler that re-runs `index` over the cache's snapshot.
///
/// The handler holds the cache weakly; the cache owns the handler.
fn reindex_on_change<T, I>(
    cache: &Arc<dyn CachedModel<T>>,
    slot: &Arc<IndexSlot<I>>,
    index: fn(&IndexSlot<I>, Option<&Vec<T>>),
) -> Handler
where
    T: 'static,
    I: Send + Sync + 'static,
{
    let cache: Weak<dyn CachedModel<T>> = Arc::downgrade(cache);
    let slot = Arc::clone(slot);
    Arc::new(move |_: &CacheEvent| {
        if let Some(cache) = cache.upgrade() {
            index(&slot, cache.data().as_deref());
        }
    })
}

fn index_countries(slot: &IndexSlot<CountryIndex>, snapshot: Option<&Vec<Country>>) {
    debug!(count = snapshot.map_or(0, Vec::len), "indexing countries");
    slot.store(CountryIndex::from_snapshot(snapshot.map(Vec::as_slice)));
    counter!(telemetry::REINDEX_TOTAL, "index" => "countries").increment(1);
}

fn index_policies(slot: &IndexSlot<PolicyIndex>, snapshot: Option<&Vec<Policy>>) {
    debug!(count = snapshot.map_or(0, Vec::len), "indexing policies");
    slot.store(PolicyIndex::from_snapshot(snapshot.map(Vec::as_slice)));
    counter!(telemetry::REINDEX_TOTAL, "index" => "policies").increment(1);
}

/// A key counts as supplied when present and non-empty.
fn supplied(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.is_empty())
}

fn lookup_in(map: &HashMap<String, Arc<Country>>, key: &str) -> Lookup<Arc<Country>> {
    match map.get(key) {
        Some(country) => Lookup::Found(Arc::clone(country)),
        None => Lookup::NotFound,
    }
}
