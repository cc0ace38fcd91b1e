//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter. Index rebuilds run
//! synchronously inside `set_data`, so a thread-local recorder sees them.

use std::sync::Arc;

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use countrieslib::telemetry;
use countrieslib::{CountriesCachedModel, CountriesConfig, Country, Policy, PolledCache};

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

/// Sum all counter values matching a given metric name and label value.
fn counter_total(snapshot: &SnapshotVec, name: &str, label: (&str, &str)) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == label.0 && l.value() == label.1)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

fn gauge_value(snapshot: &SnapshotVec, name: &str) -> Option<f64> {
    snapshot
        .iter()
        .find(|(key, _, _, _)| key.kind() == MetricKind::Gauge && key.key().name() == name)
        .and_then(|(_, _, _, value)| match value {
            DebugValue::Gauge(v) => Some(v.into_inner()),
            _ => None,
        })
}

fn polled_model() -> (
    CountriesCachedModel,
    Arc<PolledCache<Country>>,
    Arc<PolledCache<Policy>>,
) {
    let config = CountriesConfig::default();
    let countries = Arc::new(PolledCache::new(config.country_cache_options()));
    let policies = Arc::new(PolledCache::new(config.policy_cache_options()));
    let model = CountriesCachedModel::with_caches(countries.clone(), policies.clone());
    (model, countries, policies)
}

#[test]
fn change_records_reindex_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let (_model, countries, policies) = polled_model();

    metrics::with_local_recorder(&recorder, || {
        countries.set_data(vec![Country::new("GB"), Country::new("FO")]);
        countries.set_data(vec![Country::new("GB")]);
        policies.set_data(vec![Policy::new("GB")]);
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_total(&snapshot, telemetry::REINDEX_TOTAL, ("index", "countries")),
        2
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::REINDEX_TOTAL, ("index", "policies")),
        1
    );
}

#[test]
fn snapshot_size_is_recorded() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let (_model, countries, _policies) = polled_model();

    metrics::with_local_recorder(&recorder, || {
        countries.set_data(vec![Country::new("GB"), Country::new("FO")]);
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(gauge_value(&snapshot, telemetry::SNAPSHOT_RECORDS), Some(2.0));
}

#[test]
fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let (model, countries, _policies) = polled_model();
    countries.set_data(vec![Country::new("FO")]);
    assert_eq!(model.get_overseas_countries().len(), 1);
}
