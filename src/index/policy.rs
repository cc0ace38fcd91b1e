use std::collections::HashMap;
use std::sync::Arc;

use super::index_by;
use crate::types::Policy;

/// Policies keyed by their join key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyIndex {
    pub by_id: HashMap<String, Arc<Policy>>,
}

impl PolicyIndex {
    pub fn build(policies: &[Policy]) -> Self {
        let records: Vec<Arc<Policy>> = policies.iter().cloned().map(Arc::new).collect();
        Self {
            by_id: index_by(&records, |p| Some(p.id.clone())),
        }
    }

    /// Build from an optional snapshot; no snapshot yields an empty index.
    pub fn from_snapshot(snapshot: Option<&[Policy]>) -> Self {
        snapshot.map(Self::build).unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Policy>> {
        self.by_id.get(id)
    }
}
