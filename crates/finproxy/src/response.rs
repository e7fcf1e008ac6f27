//! Successful response shape.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Field added to every successful response.
const FROM_CACHE_FIELD: &str = "fromCache";

/// Field that carries a payload which is not a JSON object.
const DATA_FIELD: &str = "data";

/// A financials payload together with where it came from.
///
/// Serializes as the payload's own fields plus `"fromCache"`. A payload that
/// is not a JSON object is placed under `"data"` instead.
#[derive(Clone, Debug, PartialEq)]
pub struct FinancialsResponse {
    /// The provider payload, exactly as fetched.
    pub payload: Value,
    /// True when the payload was served from the cache store.
    pub from_cache: bool,
}

impl FinancialsResponse {
    /// A response served from the cache.
    #[must_use]
    pub const fn cached(payload: Value) -> Self {
        Self {
            payload,
            from_cache: true,
        }
    }

    /// A response freshly fetched from upstream.
    #[must_use]
    pub const fn fresh(payload: Value) -> Self {
        Self {
            payload,
            from_cache: false,
        }
    }

    /// Converts into the wire JSON value.
    #[must_use]
    pub fn into_json(self) -> Value {
        match self.payload {
            Value::Object(mut map) => {
                map.insert(FROM_CACHE_FIELD.to_string(), Value::Bool(self.from_cache));
                Value::Object(map)
            }
            other => {
                let mut map = serde_json::Map::new();
                map.insert(DATA_FIELD.to_string(), other);
                map.insert(FROM_CACHE_FIELD.to_string(), Value::Bool(self.from_cache));
                Value::Object(map)
            }
        }
    }
}

impl Serialize for FinancialsResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.payload {
            Value::Object(fields) => {
                let mut map = serializer.serialize_map(None)?;
                for (name, value) in fields.iter().filter(|(name, _)| *name != FROM_CACHE_FIELD) {
                    map.serialize_entry(name, value)?;
                }
                map.serialize_entry(FROM_CACHE_FIELD, &self.from_cache)?;
                map.end()
            }
            other => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(DATA_FIELD, other)?;
                map.serialize_entry(FROM_CACHE_FIELD, &self.from_cache)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_payload_is_flattened() {
        let response = FinancialsResponse::fresh(json!({
            "status": "OK",
            "results": [{ "fiscal_year": "2023" }]
        }));
        let expected = json!({
            "status": "OK",
            "results": [{ "fiscal_year": "2023" }],
            "fromCache": false
        });

        assert_eq!(serde_json::to_value(&response).unwrap(), expected);
        assert_eq!(response.into_json(), expected);
    }

    #[test]
    fn test_cached_flag() {
        let value = serde_json::to_value(FinancialsResponse::cached(json!({ "a": 1 }))).unwrap();
        assert_eq!(value, json!({ "a": 1, "fromCache": true }));
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let response = FinancialsResponse::cached(json!([1, 2]));
        let expected = json!({ "data": [1, 2], "fromCache": true });

        assert_eq!(serde_json::to_value(&response).unwrap(), expected);
        assert_eq!(response.into_json(), expected);
    }

    #[test]
    fn test_payload_flag_is_overridden() {
        let response = FinancialsResponse::fresh(json!({ "fromCache": true, "x": 1 }));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "x": 1, "fromCache": false })
        );
    }
}
