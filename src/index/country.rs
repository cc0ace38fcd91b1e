use std::collections::HashMap;
use std::sync::Arc;

use super::index_by;
use crate::types::Country;

/// Filtered views and lookup maps over one country snapshot.
///
/// Filtered lists keep the snapshot's order. Records are shared between
/// views, so cloning a view is a pointer copy per record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryIndex {
    /// Every country except the home country.
    pub overseas: Vec<Arc<Country>>,
    /// Countries eligible as a residence.
    pub residence: Vec<Arc<Country>>,
    /// Overseas countries eligible as a residence.
    pub overseas_residence: Vec<Arc<Country>>,
    /// Countries eligible as a country of birth.
    pub birth: Vec<Arc<Country>>,
    /// Overseas countries eligible as a country of birth.
    pub overseas_birth: Vec<Arc<Country>>,
    pub by_id: HashMap<String, Arc<Country>>,
    pub by_slug: HashMap<String, Arc<Country>>,
    pub by_display_name: HashMap<String, Arc<Country>>,
}

impl CountryIndex {
    /// Derive every view from `countries`.
    pub fn build(countries: &[Country]) -> Self {
        let records: Vec<Arc<Country>> = countries.iter().cloned().map(Arc::new).collect();

        let filtered = |predicate: fn(&Country) -> bool| -> Vec<Arc<Country>> {
            records
                .iter()
                .filter(|c| predicate(c))
                .cloned()
                .collect()
        };

        Self {
            overseas: filtered(|c| c.is_overseas()),
            residence: filtered(|c| c.is_residence()),
            overseas_residence: filtered(|c| c.is_overseas() && c.is_residence()),
            birth: filtered(|c| c.is_birth()),
            overseas_birth: filtered(|c| c.is_overseas() && c.is_birth()),
            by_id: index_by(&records, |c| Some(c.country_code.clone())),
            by_slug: index_by(&records, |c| c.country_name_slug.clone()),
            by_display_name: index_by(&records, |c| c.display_name.clone()),
        }
    }

    /// Build from an optional snapshot; no snapshot yields empty views.
    pub fn from_snapshot(snapshot: Option<&[Country]>) -> Self {
        snapshot.map(Self::build).unwrap_or_default()
    }
}
