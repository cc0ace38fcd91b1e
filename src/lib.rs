//! countrieslib - Periodically refreshed country and policy reference data
//!
//! This crate keeps the latest country list and policy list from two remote
//! sources in memory, refreshes them on an interval, and answers synchronous
//! queries over derived views: filtered country lists (overseas, residence,
//! birth), lookups by code, slug or display name, and country records merged
//! with their policy.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use countrieslib::{CountriesCachedModel, CountriesConfig, Lookup, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> countrieslib::Result<()> {
//!     let model = CountriesCachedModel::new(
//!         CountriesConfig::new()
//!             .country_url("https://reference.example/countries")
//!             .policy_url("https://reference.example/policy")
//!             .store(Arc::new(MemoryStore::new())),
//!     );
//!     model.start()?;
//!
//!     // ... once the first `Change` has fired:
//!     if let Lookup::Found(country) = model.get_country_by_id("UK") {
//!         println!("{:?}", country.display_name);
//!     }
//!     match model.is_restricted_by_id("FR") {
//!         Lookup::Found(restricted) => println!("restricted: {restricted}"),
//!         Lookup::Incomplete => println!("no policy yet"),
//!         other => println!("{other:?}"),
//!     }
//!
//!     model.stop();
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod countries;
pub mod error;
pub mod index;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{
    CacheEvent, CacheOptions, CachedModel, EventKind, FileStore, Handler, MemoryStore,
    PolledCache, Store,
};
pub use config::CountriesConfig;
pub use countries::CountriesCachedModel;
pub use error::{CountriesError, Result};
pub use index::{CountryIndex, PolicyIndex};

// Re-export all types
pub use types::{Country, CountryData, Flag, Lookup, Policy};
