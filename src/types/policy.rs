//! Policy records as served by the policy reference source.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content type marking a country as restricted.
pub const RESTRICTED_CONTENT_TYPE: i64 = 7;

/// Status marking a country as active.
pub const ACTIVE_STATUS: &str = "ACTIVE";

/// Per-country policy, joined to a [`Country`](super::Country) by code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Join key, equal to the country's `countryCode`.
    pub id: String,
    /// Status string (e.g. `"ACTIVE"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Content type code; [`RESTRICTED_CONTENT_TYPE`] means restricted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<i64>,
    /// Application channel (e.g. `"ONLINE"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Passthrough fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Policy {
    /// Create a policy with only its key set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: None,
            content_type: None,
            channel: None,
            extra: Map::new(),
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: i64) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Set the channel.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Add a passthrough field.
    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}
