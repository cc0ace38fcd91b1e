//! Country records as served by the country reference source.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Flag;

/// Country code of the home country. Records with this code are not overseas.
pub const HOME_COUNTRY_CODE: &str = "GB";

/// Lookup-only alias for [`HOME_COUNTRY_CODE`].
pub const HOME_COUNTRY_ALIAS: &str = "UK";

/// A single country record.
///
/// Fields not modelled here are preserved in [`extra`](Self::extra) and
/// written back out unchanged.
///
/// Sources may use the short names `id` and `slug`. The long names win when
/// both are present, and the unused short field is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCountry")]
pub struct Country {
    /// Join key shared with policy records (e.g. `"GB"`).
    pub country_code: String,
    /// Unique human-readable identifier (e.g. `"united-kingdom"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name_slug: Option<String>,
    /// Unique human-readable label (e.g. `"United Kingdom"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Eligible as a country of residence.
    pub address_country_flag: Flag,
    /// Eligible as a country of birth.
    pub country_of_birth_flag: Flag,
    /// Passthrough fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire form of [`Country`] before the short field names are resolved.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCountry {
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    country_name_slug: Option<String>,
    #[serde(default)]
    slug: Option<Value>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address_country_flag: Flag,
    #[serde(default)]
    country_of_birth_flag: Flag,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawCountry> for Country {
    type Error = String;

    fn try_from(raw: RawCountry) -> Result<Self, Self::Error> {
        let mut extra = raw.extra;
        let country_code = prefer(raw.country_code, "id", raw.id, &mut extra)
            .ok_or_else(|| "missing field `countryCode`".to_string())?;
        let country_name_slug = prefer(raw.country_name_slug, "slug", raw.slug, &mut extra);

        Ok(Self {
            country_code,
            country_name_slug,
            display_name: raw.display_name,
            address_country_flag: raw.address_country_flag,
            country_of_birth_flag: raw.country_of_birth_flag,
            extra,
        })
    }
}

/// Pick the long-named value, falling back to a string under the short
/// name. A short-named value that is not used goes back into `extra`.
fn prefer(
    long: Option<String>,
    short_name: &str,
    short: Option<Value>,
    extra: &mut Map<String, Value>,
) -> Option<String> {
    match (long, short) {
        (Some(long), Some(short)) => {
            extra.insert(short_name.to_string(), short);
            Some(long)
        }
        (Some(long), None) => Some(long),
        (None, Some(Value::String(short))) => Some(short),
        (None, Some(other)) => {
            extra.insert(short_name.to_string(), other);
            None
        }
        (None, None) => None,
    }
}

impl Country {
    /// Create a country with only its code set.
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            country_name_slug: None,
            display_name: None,
            address_country_flag: Flag::Unknown,
            country_of_birth_flag: Flag::Unknown,
            extra: Map::new(),
        }
    }

    /// Set the slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.country_name_slug = Some(slug.into());
        self
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the residence eligibility flag.
    pub fn with_address_flag(mut self, flag: impl Into<Flag>) -> Self {
        self.address_country_flag = flag.into();
        self
    }

    /// Set the birth eligibility flag.
    pub fn with_birth_flag(mut self, flag: impl Into<Flag>) -> Self {
        self.country_of_birth_flag = flag.into();
        self
    }

    /// Add a passthrough field.
    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Slug, if the record has one.
    pub fn slug(&self) -> Option<&str> {
        self.country_name_slug.as_deref()
    }

    /// Whether this country is outside the home country.
    pub fn is_overseas(&self) -> bool {
        self.country_code != HOME_COUNTRY_CODE
    }

    /// Eligible as a country of residence (flag explicitly set).
    pub fn is_residence(&self) -> bool {
        self.address_country_flag.is_yes()
    }

    /// Eligible as a country of birth (flag explicitly set).
    pub fn is_birth(&self) -> bool {
        self.country_of_birth_flag.is_yes()
    }
}

/// Apply the lookup alias (`"UK"` → `"GB"`) to a country code.
pub fn canonical_country_code(code: &str) -> &str {
    if code == HOME_COUNTRY_ALIAS {
        HOME_COUNTRY_CODE
    } else {
        code
    }
}
