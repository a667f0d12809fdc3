use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;

use super::id::ObjectId;
use super::validate::{Schema, ValidationError};

/// Keys the store owns. They are never part of a stored body and are
/// stripped from caller payloads.
pub const STORE_MANAGED_KEYS: &[&str] = &["_id", "createdAt", "updatedAt"];

/// A document as the store holds it: identity and timestamps next to a
/// schema-normalized JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: ObjectId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: Map<String, Value>,
}

impl Document {
    /// A new, not yet stored document.
    pub fn new(body: Map<String, Value>, now: DateTime<Utc>) -> Self {
        Self {
            id: ObjectId::new(),
            created_at: now,
            updated_at: now,
            body,
        }
    }

    /// Decode the body into its typed record.
    pub fn into_stored<T: Schema>(self) -> Result<Stored<T>, ValidationError> {
        let record = serde_json::from_value(Value::Object(self.body))
            .map_err(|e| ValidationError::Schema(e.to_string()))?;
        Ok(Stored {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            record,
        })
    }
}

/// Typed stored entity, serialized with the store-managed keys inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stored<T> {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: T,
}

/// Remove store-managed keys from a caller payload.
pub fn strip_store_managed(body: &mut Map<String, Value>) {
    for key in STORE_MANAGED_KEYS {
        body.remove(*key);
    }
}

/// JSON form of a write timestamp, as stored in bodies.
pub fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Snapshot of the acting user, stamped into audit fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Actor {
    /// JSON snapshot written into `createdBy` / `updatedBy`.
    pub fn snapshot(&self) -> Value {
        serde_json::json!({
            "userId": self.user_id,
            "name": self.name,
            "email": self.email,
        })
    }
}

/// Database row representation of a document.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: String,
    pub body: Json<Map<String, Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = super::id::InvalidObjectId;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            body: row.body.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strip_removes_only_managed_keys() {
        let mut body = json!({"_id": "x", "createdAt": "t", "updatedAt": "t", "title": "A"})
            .as_object()
            .cloned()
            .unwrap();
        strip_store_managed(&mut body);
        assert_eq!(Value::Object(body), json!({"title": "A"}));
    }
}
