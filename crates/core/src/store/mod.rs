//! Document store contract and its implementations.
//!
//! Every write normalizes bodies through the collection schema and enforces
//! the collection's unique fields. Each call is atomic on its own; nothing
//! spans calls.

pub mod memory;
pub mod postgres;
pub mod sql;

use async_trait::async_trait;
use coursedesk_filter::{FieldPath, Filter};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::document::id::ObjectId;
use crate::document::model::Document;
use crate::document::validate::{CollectionSpec, ValidationError};
use crate::mutation::patch::Patch;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("stored document {id} is unreadable: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Outcome of a multi-document update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateCounts {
    /// Documents found by identity.
    pub matched: u64,
    /// Documents whose stored body changed.
    pub modified: u64,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Verify the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Normalize and insert a new document with a fresh identity.
    async fn insert(
        &self,
        spec: &CollectionSpec,
        body: Map<String, Value>,
    ) -> Result<Document, StoreError>;

    /// Matching documents, newest first.
    async fn find(
        &self,
        spec: &CollectionSpec,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Newest matching document.
    async fn find_one(
        &self,
        spec: &CollectionSpec,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.find(spec, filter, Some(1)).await?.into_iter().next())
    }

    async fn find_by_id(
        &self,
        spec: &CollectionSpec,
        id: &ObjectId,
    ) -> Result<Option<Document>, StoreError>;

    /// Apply `patch` to one document. Returns the post-update document, or
    /// `None` when `id` does not exist.
    async fn update_by_id(
        &self,
        spec: &CollectionSpec,
        id: &ObjectId,
        patch: &Patch,
    ) -> Result<Option<Document>, StoreError>;

    /// Apply `patch` to every document in `ids` as one atomic write: if any
    /// result is invalid, nothing is written.
    async fn update_many(
        &self,
        spec: &CollectionSpec,
        ids: &[ObjectId],
        patch: &Patch,
    ) -> Result<UpdateCounts, StoreError>;

    /// Returns whether a document was removed.
    async fn delete_by_id(&self, spec: &CollectionSpec, id: &ObjectId)
        -> Result<bool, StoreError>;

    async fn delete_many(&self, spec: &CollectionSpec, ids: &[ObjectId])
        -> Result<u64, StoreError>;

    async fn count(&self, spec: &CollectionSpec, filter: &Filter) -> Result<u64, StoreError>;

    /// Document counts grouped by the value at `path` (missing values group
    /// under `null`), largest group first.
    async fn count_by(
        &self,
        spec: &CollectionSpec,
        path: &FieldPath,
    ) -> Result<Vec<(Value, u64)>, StoreError>;
}
