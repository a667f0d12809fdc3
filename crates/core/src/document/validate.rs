//! Write-time schema enforcement.
//!
//! Each collection's typed record is its schema: a body is normalized by
//! deserializing it into the record (defaults filled, enums checked, unknown
//! fields dropped), running the record's own checks, and serializing it back.
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Schema(String),
    #[error("`{0}` is required")]
    Required(&'static str),
    #[error("`{field}` must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("duplicate value for unique field `{0}`")]
    Duplicate(String),
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("`ids` must be a non-empty array of identities")]
    InvalidIds,
    #[error("`updates` must be a non-empty object")]
    InvalidUpdates,
    #[error("`status` must be one of: draft, published")]
    InvalidStatus,
    #[error("cannot set `{0}`: an intermediate field is not an object or array")]
    PathConflict(String),
}

/// A collection's typed record.
pub trait Schema: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name in the store.
    const COLLECTION: &'static str;
    /// Human-readable entity name, used in not-found messages.
    const ENTITY: &'static str;
    /// Dotted paths whose values must be unique across the collection.
    const UNIQUE_FIELDS: &'static [&'static str];

    /// Checks serde cannot express (non-empty strings, ranges).
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Untyped handle on a collection, passed to the document store.
#[derive(Clone, Copy)]
pub struct CollectionSpec {
    pub name: &'static str,
    pub unique_fields: &'static [&'static str],
    normalize: fn(&Map<String, Value>) -> Result<Map<String, Value>, ValidationError>,
}

impl CollectionSpec {
    pub fn of<T: Schema>() -> Self {
        Self {
            name: T::COLLECTION,
            unique_fields: T::UNIQUE_FIELDS,
            normalize: normalize_as::<T>,
        }
    }

    /// Normalize a body through the collection's schema.
    pub fn normalize(&self, body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
        (self.normalize)(body)
    }
}

impl std::fmt::Debug for CollectionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionSpec")
            .field("name", &self.name)
            .field("unique_fields", &self.unique_fields)
            .finish()
    }
}

/// Normalize `body` through schema `T`.
pub fn normalize_as<T: Schema>(body: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    let record: T = serde_json::from_value(Value::Object(body.clone()))
        .map_err(|e| ValidationError::Schema(e.to_string()))?;
    record.validate()?;
    match serde_json::to_value(&record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ValidationError::NotAnObject),
        Err(e) => Err(ValidationError::Schema(e.to_string())),
    }
}

/// Fail with `Required(field)` when `value` is empty or whitespace.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

pub fn require_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Serialize, Deserialize)]
    struct Widget {
        name: String,
        #[serde(default = "default_weight")]
        weight: f64,
    }

    fn default_weight() -> f64 {
        0.5
    }

    impl Schema for Widget {
        const COLLECTION: &'static str = "Widget";
        const ENTITY: &'static str = "Widget";
        const UNIQUE_FIELDS: &'static [&'static str] = &["name"];

        fn validate(&self) -> Result<(), ValidationError> {
            require_non_empty("name", &self.name)?;
            require_range("weight", self.weight, 0.0, 1.0)
        }
    }

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn normalize_fills_defaults_and_drops_unknown_fields() {
        let spec = CollectionSpec::of::<Widget>();
        let out = spec.normalize(&body(json!({"name": "gear", "colour": "red"}))).unwrap();
        assert_eq!(Value::Object(out), json!({"name": "gear", "weight": 0.5}));
    }

    #[test]
    fn normalize_reports_missing_field() {
        let err = normalize_as::<Widget>(&body(json!({"weight": 0.1}))).unwrap_err();
        assert!(matches!(err, ValidationError::Schema(ref m) if m.contains("name")));
    }

    #[test]
    fn normalize_runs_record_checks() {
        assert_eq!(
            normalize_as::<Widget>(&body(json!({"name": "  "}))).unwrap_err(),
            ValidationError::Required("name")
        );
        assert!(matches!(
            normalize_as::<Widget>(&body(json!({"name": "gear", "weight": 3}))).unwrap_err(),
            ValidationError::OutOfRange { field: "weight", .. }
        ));
    }
}
