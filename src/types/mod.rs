//! Public types for the countrieslib API.

mod country;
mod data;
mod flag;
mod lookup;
mod policy;

pub use country::{Country, HOME_COUNTRY_ALIAS, HOME_COUNTRY_CODE, canonical_country_code};
pub use data::CountryData;
pub use flag::Flag;
pub use lookup::Lookup;
pub use policy::{ACTIVE_STATUS, Policy, RESTRICTED_CONTENT_TYPE};
