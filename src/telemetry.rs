//! Telemetry metric name constants.
//!
//! Centralised metric names for countrieslib operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `countrieslib_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `key`: cache key (e.g. "countrieslib-countries")
//! - `status`: outcome: "ok" or "error"
//! - `index`: which index was rebuilt: "countries" or "policies"

/// Total remote fetches attempted by polling caches.
///
/// Labels: `key`, `status` ("ok" | "error").
pub const FETCHES_TOTAL: &str = "countrieslib_fetches_total";

/// Total reads of a persisted snapshot from the backing store.
///
/// Labels: `key`, `status` ("ok" | "error").
pub const STORE_SYNCS_TOTAL: &str = "countrieslib_store_syncs_total";

/// Total index rebuilds.
///
/// Labels: `index` ("countries" | "policies").
pub const REINDEX_TOTAL: &str = "countrieslib_reindex_total";

/// Number of records in the current snapshot of a cache.
///
/// Labels: `key`.
pub const SNAPSHOT_RECORDS: &str = "countrieslib_snapshot_records";
