//! Tri-state eligibility flags.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Eligibility flag carried by country records.
///
/// The remote source sends `true`, `false` or `null` (or omits the field).
/// Filters match [`Flag::Yes`] only; `Unknown` is never treated as `No`.
///
/// Serializes as a JSON boolean, or `null` for `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Flag {
    Yes,
    No,
    #[default]
    Unknown,
}

impl Flag {
    /// Whether the flag is explicitly set.
    pub fn is_yes(self) -> bool {
        self == Flag::Yes
    }

    /// Whether the flag is explicitly cleared.
    pub fn is_no(self) -> bool {
        self == Flag::No
    }

    /// The flag as an optional boolean (`None` for `Unknown`).
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Flag::Yes => Some(true),
            Flag::No => Some(false),
            Flag::Unknown => None,
        }
    }
}

impl From<Option<bool>> for Flag {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Flag::Yes,
            Some(false) => Flag::No,
            None => Flag::Unknown,
        }
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Flag::from(Some(value))
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_bool().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<bool>::deserialize(deserializer).map(Flag::from)
    }
}
