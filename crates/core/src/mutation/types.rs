//! Bulk mutation payloads and their aggregate results.
//!
//! Payloads arrive as raw JSON so that shape errors (missing `ids`, a
//! non-object `updates`) surface as validation failures before any write.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::id::ObjectId;
use crate::document::status::PublicationStatus;
use crate::document::validate::ValidationError;

#[derive(Debug, Clone, PartialEq)]
pub struct BulkUpdateRequest {
    pub ids: Vec<String>,
    pub updates: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkStatusRequest {
    pub ids: Vec<String>,
    pub status: PublicationStatus,
}

impl BulkUpdateRequest {
    pub fn from_json(payload: &Value) -> Result<Self, ValidationError> {
        let ids = parse_ids(payload)?;
        let updates = match payload.get("updates") {
            Some(Value::Object(map)) if !map.is_empty() => map.clone(),
            _ => return Err(ValidationError::InvalidUpdates),
        };
        Ok(Self { ids, updates })
    }
}

impl BulkDeleteRequest {
    pub fn from_json(payload: &Value) -> Result<Self, ValidationError> {
        Ok(Self {
            ids: parse_ids(payload)?,
        })
    }
}

impl BulkStatusRequest {
    pub fn from_json(payload: &Value) -> Result<Self, ValidationError> {
        let ids = parse_ids(payload)?;
        let status = payload
            .get("status")
            .and_then(Value::as_str)
            .ok_or(ValidationError::InvalidStatus)?
            .parse()?;
        Ok(Self { ids, status })
    }
}

/// `ids` must be a non-empty array of strings.
fn parse_ids(payload: &Value) -> Result<Vec<String>, ValidationError> {
    let Some(Value::Array(items)) = payload.get("ids") else {
        return Err(ValidationError::InvalidIds);
    };
    if items.is_empty() {
        return Err(ValidationError::InvalidIds);
    }
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or(ValidationError::InvalidIds)
        })
        .collect()
}

/// Identities among `ids`, deduplicated. Strings without identity shape
/// cannot name a stored entity and are dropped.
pub fn resolvable_ids(ids: &[String]) -> Vec<ObjectId> {
    let mut out: Vec<ObjectId> = ids.iter().filter_map(|id| id.parse().ok()).collect();
    out.sort();
    out.dedup();
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateResult {
    pub modified: u64,
    pub matched: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteResult {
    pub deleted: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkStatusResult {
    pub modified: u64,
}

/// Body returned by a successful single-entity delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub message: String,
    pub deleted: u64,
}

impl DeleteConfirmation {
    pub fn for_entity(entity: &str) -> Self {
        Self {
            message: format!("{entity} deleted successfully"),
            deleted: 1,
        }
    }
}
