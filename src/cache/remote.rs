//! Remote list fetch.
//!
//! Reference sources serve either a bare JSON array (`[...]`) or an object
//! wrapping the array under `data` (`{ "data": [...] }`). Both are accepted.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{CountriesError, Result};

/// Object form of a list payload.
#[derive(Deserialize)]
struct Wrapped<T> {
    data: Vec<T>,
}

/// Parse a list payload.
pub fn parse_payload<T: DeserializeOwned>(json: &str) -> Result<Vec<T>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }
    if value.get("data").is_some_and(|data| data.is_array()) {
        let wrapped: Wrapped<T> = serde_json::from_value(value)?;
        return Ok(wrapped.data);
    }
    Err(CountriesError::Payload(
        "unrecognised list payload: expected an array or an object with a `data` array"
            .to_string(),
    ))
}

/// Fetch and parse a list from `url`.
pub async fn fetch_remote<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<T>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CountriesError::Http(format!("failed to fetch {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CountriesError::Api {
            status: status.as_u16(),
            message: format!("fetch of {url} returned HTTP {status}"),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| CountriesError::Http(format!("failed to read response body: {e}")))?;

    parse_payload(&body)
}
