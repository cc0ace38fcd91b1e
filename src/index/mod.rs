//! Derived views over a snapshot.
//!
//! Indexes are rebuilt in full from the latest snapshot every time a cache
//! reports a change; nothing is patched incrementally. Both builders are
//! pure functions of their input.
//!
//! - [`CountryIndex`]: filtered country lists and lookups by code, slug
//!   and display name.
//! - [`PolicyIndex`]: policies by join key.

mod country;
mod policy;

pub use country::CountryIndex;
pub use policy::PolicyIndex;

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

/// Build a one-to-one map from `records`, later records replacing earlier
/// ones with the same key. Records for which `key` returns `None` are skipped.
fn index_by<T, K, F>(records: &[Arc<T>], key: F) -> HashMap<K, Arc<T>>
where
    K: Eq + Hash,
    F: Fn(&T) -> Option<K>,
{
    let mut map = HashMap::with_capacity(records.len());
    for record in records {
        if let Some(k) = key(record) {
            map.insert(k, Arc::clone(record));
        }
    }
    map
}

/// Holder for the current index, swapped atomically on rebuild.
///
/// Readers take a cheap `Arc` clone and never observe a partially built
/// index.
#[derive(Debug, Default)]
pub(crate) struct IndexSlot<I> {
    current: RwLock<Arc<I>>,
}

impl<I> IndexSlot<I> {
    pub(crate) fn load(&self) -> Arc<I> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub(crate) fn store(&self, index: I) {
        let index = Arc::new(index);
        match self.current.write() {
            Ok(mut guard) => *guard = index,
            Err(poisoned) => *poisoned.into_inner() = index,
        }
    }
}
