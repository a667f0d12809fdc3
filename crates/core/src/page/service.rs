use std::sync::Arc;

use chrono::Utc;
use coursedesk_filter::Filter;
use serde_json::Value;

use super::model::Page;
use super::query::PageQuery;
use crate::document::id::ObjectId;
use crate::document::model::{strip_store_managed, timestamp, Document, Stored};
use crate::document::validate::{CollectionSpec, Schema, ValidationError};
use crate::error::{CoreError, CoreResult};
use crate::mutation::patch::Patch;
use crate::mutation::types::DeleteConfirmation;
use crate::store::DocumentStore;

pub type StoredPage = Stored<Page>;

/// Page operations over a document store.
#[derive(Clone)]
pub struct PageService {
    store: Arc<dyn DocumentStore>,
    spec: CollectionSpec,
}

impl PageService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            spec: CollectionSpec::of::<Page>(),
        }
    }

    /// Validate and insert a page. `lastModified` defaults to now.
    pub async fn create(&self, payload: Value) -> CoreResult<StoredPage> {
        let Value::Object(mut body) = payload else {
            return Err(ValidationError::NotAnObject.into());
        };
        strip_store_managed(&mut body);
        if matches!(body.get("lastModified"), None | Some(Value::Null)) {
            body.insert("lastModified".into(), timestamp(Utc::now()));
        }
        let doc = self.store.insert(&self.spec, body).await?;
        tracing::info!(id = %doc.id, "page created");
        typed(doc)
    }

    /// Pages matching `query` (published when no status is given), newest first.
    pub async fn list(&self, query: &PageQuery) -> CoreResult<Vec<StoredPage>> {
        let docs = self.store.find(&self.spec, &query.to_filter(), None).await?;
        docs.into_iter().map(typed).collect()
    }

    pub async fn get_by_slug(&self, slug: &str) -> CoreResult<StoredPage> {
        tracing::debug!(slug, "page lookup");
        self.store
            .find_one(&self.spec, &Filter::eq("slug", slug))
            .await?
            .map(typed)
            .unwrap_or_else(|| Err(CoreError::not_found(Page::ENTITY, slug)))
    }

    /// Replace the fields present in `payload`; stamps `lastModified` when
    /// anything changed.
    pub async fn update(&self, id: &str, payload: Value) -> CoreResult<StoredPage> {
        let Value::Object(updates) = payload else {
            return Err(ValidationError::NotAnObject.into());
        };
        let oid = parse_id(id)?;
        let patch = Patch::from_updates(updates).stamp("lastModified", timestamp(Utc::now()));
        match self.store.update_by_id(&self.spec, &oid, &patch).await? {
            Some(doc) => typed(doc),
            None => Err(CoreError::not_found(Page::ENTITY, id)),
        }
    }

    pub async fn delete(&self, id: &str) -> CoreResult<DeleteConfirmation> {
        let oid = parse_id(id)?;
        if !self.store.delete_by_id(&self.spec, &oid).await? {
            return Err(CoreError::not_found(Page::ENTITY, id));
        }
        tracing::info!(%oid, "page deleted");
        Ok(DeleteConfirmation::for_entity(Page::ENTITY))
    }
}

fn parse_id(id: &str) -> CoreResult<ObjectId> {
    id.parse()
        .map_err(|_| CoreError::not_found(Page::ENTITY, id))
}

fn typed(doc: Document) -> CoreResult<StoredPage> {
    let id = doc.id;
    doc.into_stored()
        .map_err(|e| CoreError::Store(format!("stored page {id} is unreadable: {e}")))
}
