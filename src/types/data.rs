//! Merged country + policy records.

use serde::Serialize;
use serde_json::{Map, Value};

use super::policy::{ACTIVE_STATUS, RESTRICTED_CONTENT_TYPE};
use super::{Country, Flag, Policy};

/// A country overlaid with its policy.
///
/// Built by [`CountryData::merge`]. Serializes flat: the typed fields plus
/// [`extra`](Self::extra) form one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryData {
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub address_country_flag: Flag,
    pub country_of_birth_flag: Flag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Remaining fields of the merged record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CountryData {
    /// Overlay `policy` onto `country`.
    ///
    /// Every field the policy carries replaces the country's field of the
    /// same name, except the policy's own `id`. Fields the policy lacks keep
    /// the country's value. A typed field whose merged value has the wrong
    /// JSON type is left empty.
    pub fn merge(country: &Country, policy: &Policy) -> Self {
        let mut fields = country_fields(country);
        fields.extend(policy_fields(policy));

        Self {
            country_code: take(&mut fields, "countryCode", into_string)
                .unwrap_or_else(|| country.country_code.clone()),
            country_name_slug: take(&mut fields, "countryNameSlug", into_string),
            display_name: take(&mut fields, "displayName", into_string),
            address_country_flag: take(&mut fields, "addressCountryFlag", into_flag)
                .unwrap_or_default(),
            country_of_birth_flag: take(&mut fields, "countryOfBirthFlag", into_flag)
                .unwrap_or_default(),
            status: take(&mut fields, "status", into_string),
            content_type: take(&mut fields, "contentType", |v| v.as_i64()),
            channel: take(&mut fields, "channel", into_string),
            extra: fields,
        }
    }

    /// Restricted: content type 7.
    pub fn is_restricted(&self) -> bool {
        self.content_type == Some(RESTRICTED_CONTENT_TYPE)
    }

    /// Active: status `"ACTIVE"`.
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some(ACTIVE_STATUS)
    }
}

/// All fields of a country record as one JSON object.
fn country_fields(country: &Country) -> Map<String, Value> {
    let mut fields = country.extra.clone();
    fields.insert("countryCode".into(), country.country_code.clone().into());
    if let Some(slug) = &country.country_name_slug {
        fields.insert("countryNameSlug".into(), slug.clone().into());
    }
    if let Some(name) = &country.display_name {
        fields.insert("displayName".into(), name.clone().into());
    }
    fields.insert(
        "addressCountryFlag".into(),
        country.address_country_flag.as_bool().into(),
    );
    fields.insert(
        "countryOfBirthFlag".into(),
        country.country_of_birth_flag.as_bool().into(),
    );
    fields
}

/// The fields a policy record carries, without its `id`.
fn policy_fields(policy: &Policy) -> Map<String, Value> {
    let mut fields = policy.extra.clone();
    if let Some(status) = &policy.status {
        fields.insert("status".into(), status.clone().into());
    }
    if let Some(content_type) = policy.content_type {
        fields.insert("contentType".into(), content_type.into());
    }
    if let Some(channel) = &policy.channel {
        fields.insert("channel".into(), channel.clone().into());
    }
    fields
}

/// Remove `name` from `fields` and convert it.
fn take<T>(
    fields: &mut Map<String, Value>,
    name: &str,
    convert: impl FnOnce(Value) -> Option<T>,
) -> Option<T> {
    fields.remove(name).and_then(convert)
}

fn into_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn into_flag(value: Value) -> Option<Flag> {
    match value {
        Value::Bool(b) => Some(Flag::from(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gb() -> Country {
        Country::new("GB")
            .with_slug("united-kingdom")
            .with_address_flag(true)
            .with_birth_flag(true)
    }

    #[test]
    fn merge_overlays_policy_fields() {
        let policy = Policy::new("GB")
            .with_channel("ONLINE")
            .with_content_type(1)
            .with_status("ACTIVE");
        let data = CountryData::merge(&gb(), &policy);

        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "addressCountryFlag": true,
                "countryCode": "GB",
                "countryNameSlug": "united-kingdom",
                "countryOfBirthFlag": true,
                "status": "ACTIVE",
                "channel": "ONLINE",
                "contentType": 1
            })
        );
    }

    #[test]
    fn merge_drops_policy_key() {
        let country = Country::new("GB").with_extra("id", "country-id");
        let policy = Policy::new("GB");
        let data = CountryData::merge(&country, &policy);
        assert_eq!(data.country_code, "GB");
        assert_eq!(data.extra["id"], "country-id");
        assert!(!data.extra.contains_key("countryCode"));
    }

    #[test]
    fn policy_passthrough_wins_over_country_passthrough() {
        let country = Country::new("FO").with_extra("note", "country").with_extra("kept", 1);
        let policy = Policy::new("FO").with_extra("note", "policy");
        let data = CountryData::merge(&country, &policy);
        assert_eq!(data.extra["note"], "policy");
        assert_eq!(data.extra["kept"], 1);
    }

    #[test]
    fn typed_policy_fields_shadow_country_passthrough() {
        let country = Country::new("FO").with_extra("status", "STALE");
        let policy = Policy::new("FO").with_status("ACTIVE");
        let data = CountryData::merge(&country, &policy);
        assert_eq!(data.status.as_deref(), Some("ACTIVE"));
        assert!(!data.extra.contains_key("status"));
    }

    #[test]
    fn country_fields_survive_when_policy_lacks_them() {
        let country = Country::new("FO")
            .with_extra("status", "ACTIVE")
            .with_extra("channel", "POST");
        let policy = Policy::new("FO").with_content_type(7);
        let data = CountryData::merge(&country, &policy);

        assert_eq!(data.status.as_deref(), Some("ACTIVE"));
        assert_eq!(data.channel.as_deref(), Some("POST"));
        assert!(data.is_active());
        assert!(data.is_restricted());

        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["status"], "ACTIVE");
        assert_eq!(value["contentType"], 7);
    }

    #[test]
    fn policy_overrides_country_fields() {
        let country = gb().with_display_name("United Kingdom");
        let policy = Policy::new("GB")
            .with_extra("displayName", "United Kingdom (policy)")
            .with_extra("addressCountryFlag", false);
        let data = CountryData::merge(&country, &policy);

        assert_eq!(data.display_name.as_deref(), Some("United Kingdom (policy)"));
        assert_eq!(data.address_country_flag, Flag::No);
        assert_eq!(data.country_of_birth_flag, Flag::Yes);
        assert_eq!(data.country_name_slug.as_deref(), Some("united-kingdom"));
    }

    #[test]
    fn mistyped_field_is_left_empty() {
        let policy = Policy::new("GB").with_extra("displayName", 42);
        let data = CountryData::merge(&gb().with_display_name("United Kingdom"), &policy);
        assert!(data.display_name.is_none());
        assert!(!data.extra.contains_key("displayName"));
    }

    #[test]
    fn restricted_and_active() {
        let restricted = CountryData::merge(
            &gb(),
            &Policy::new("GB").with_content_type(7).with_status("INACTIVE"),
        );
        assert!(restricted.is_restricted());
        assert!(!restricted.is_active());

        let open = CountryData::merge(&gb(), &Policy::new("GB").with_content_type(2));
        assert!(!open.is_restricted());
        assert!(!open.is_active());
    }
}
