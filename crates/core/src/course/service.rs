use std::sync::Arc;

use chrono::{DateTime, Utc};
use coursedesk_filter::Filter;
use serde_json::Value;

use super::model::CourseCard;
use super::query::CourseQuery;
use crate::document::id::{LookupKey, ObjectId};
use crate::document::model::{strip_store_managed, timestamp, Actor, Document, Stored};
use crate::document::status::PublicationStatus;
use crate::document::validate::{CollectionSpec, Schema, ValidationError};
use crate::error::{CoreError, CoreResult};
use crate::mutation::patch::Patch;
use crate::mutation::types::{
    resolvable_ids, BulkDeleteRequest, BulkDeleteResult, BulkStatusRequest, BulkStatusResult,
    BulkUpdateRequest, BulkUpdateResult, DeleteConfirmation,
};
use crate::store::DocumentStore;

pub type StoredCourse = Stored<CourseCard>;

/// Course card operations over a document store.
#[derive(Clone)]
pub struct CourseService {
    store: Arc<dyn DocumentStore>,
    spec: CollectionSpec,
}

impl CourseService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            spec: CollectionSpec::of::<CourseCard>(),
        }
    }

    /// Validate and insert a new course card. The caller may supply
    /// `meta.status`; it defaults to draft.
    pub async fn create(&self, payload: Value, actor: Option<&Actor>) -> CoreResult<StoredCourse> {
        let Value::Object(mut body) = payload else {
            return Err(ValidationError::NotAnObject.into());
        };
        strip_store_managed(&mut body);
        if let Some(actor) = actor {
            body.insert("createdBy".into(), actor.snapshot());
            body.insert("updatedBy".into(), actor.snapshot());
        }
        let doc = self.store.insert(&self.spec, body).await?;
        tracing::info!(id = %doc.id, "course created");
        typed(doc)
    }

    /// Courses matching `query`, newest first.
    pub async fn list(&self, query: &CourseQuery) -> CoreResult<Vec<StoredCourse>> {
        let docs = self.store.find(&self.spec, &query.to_filter(), None).await?;
        docs.into_iter().map(typed).collect()
    }

    /// Look up by identity when `key` has identity shape, otherwise by exact
    /// `programTitle`.
    pub async fn get(&self, key: &str) -> CoreResult<StoredCourse> {
        let lookup = LookupKey::classify(key);
        tracing::debug!(key, by_id = lookup.is_id(), "course lookup");
        let found = match lookup {
            LookupKey::Id(id) => self.store.find_by_id(&self.spec, &id).await?,
            LookupKey::Name(title) => {
                self.store
                    .find_one(&self.spec, &Filter::eq("programTitle", title))
                    .await?
            }
        };
        found
            .map(typed)
            .unwrap_or_else(|| Err(CoreError::not_found(CourseCard::ENTITY, key)))
    }

    /// Replace the fields present in `payload` (top-level names or dotted
    /// paths) and return the updated course.
    pub async fn update(
        &self,
        id: &str,
        payload: Value,
        actor: Option<&Actor>,
    ) -> CoreResult<StoredCourse> {
        let Value::Object(updates) = payload else {
            return Err(ValidationError::NotAnObject.into());
        };
        let oid = parse_id(id)?;
        let patch = stamped(Patch::from_updates(updates), actor, Utc::now());
        match self.store.update_by_id(&self.spec, &oid, &patch).await? {
            Some(doc) => typed(doc),
            None => Err(CoreError::not_found(CourseCard::ENTITY, id)),
        }
    }

    pub async fn delete(&self, id: &str) -> CoreResult<DeleteConfirmation> {
        let oid = parse_id(id)?;
        if !self.store.delete_by_id(&self.spec, &oid).await? {
            return Err(CoreError::not_found(CourseCard::ENTITY, id));
        }
        tracing::info!(%oid, "course deleted");
        Ok(DeleteConfirmation::for_entity(CourseCard::ENTITY))
    }

    /// Apply the same field updates to every listed course in one atomic call.
    pub async fn bulk_update(
        &self,
        payload: &Value,
        actor: Option<&Actor>,
    ) -> CoreResult<BulkUpdateResult> {
        let request = BulkUpdateRequest::from_json(payload)?;
        let ids = resolvable_ids(&request.ids);
        let patch = stamped(Patch::from_updates(request.updates), actor, Utc::now());
        let counts = self.store.update_many(&self.spec, &ids, &patch).await?;
        tracing::info!(
            requested = request.ids.len(),
            matched = counts.matched,
            modified = counts.modified,
            "bulk course update"
        );
        Ok(BulkUpdateResult {
            modified: counts.modified,
            matched: counts.matched,
        })
    }

    pub async fn bulk_delete(&self, payload: &Value) -> CoreResult<BulkDeleteResult> {
        let request = BulkDeleteRequest::from_json(payload)?;
        let ids = resolvable_ids(&request.ids);
        let deleted = self.store.delete_many(&self.spec, &ids).await?;
        tracing::info!(requested = request.ids.len(), deleted, "bulk course delete");
        Ok(BulkDeleteResult { deleted })
    }

    /// Move courses between draft and published. Publishing refreshes
    /// `meta.publishDate` on every call; drafting leaves it in place.
    pub async fn bulk_update_status(
        &self,
        payload: &Value,
        actor: Option<&Actor>,
    ) -> CoreResult<BulkStatusResult> {
        let request = BulkStatusRequest::from_json(payload)?;
        let ids = resolvable_ids(&request.ids);
        let now = Utc::now();
        let mut patch = Patch::new().set("meta.status", request.status.as_str());
        if request.status == PublicationStatus::Published {
            patch = patch.set("meta.publishDate", timestamp(now));
        }
        let patch = stamped(patch, actor, now);
        let counts = self.store.update_many(&self.spec, &ids, &patch).await?;
        tracing::info!(
            status = %request.status,
            matched = counts.matched,
            modified = counts.modified,
            "bulk course status update"
        );
        Ok(BulkStatusResult {
            modified: counts.modified,
        })
    }
}

/// Add the modification stamps written alongside any real change.
fn stamped(patch: Patch, actor: Option<&Actor>, now: DateTime<Utc>) -> Patch {
    let patch = patch.stamp("meta.lastModified", timestamp(now));
    match actor {
        Some(actor) => patch.stamp("updatedBy", actor.snapshot()),
        None => patch,
    }
}

/// Single-entity writes address by identity only; anything else cannot exist.
fn parse_id(id: &str) -> CoreResult<ObjectId> {
    id.parse()
        .map_err(|_| CoreError::not_found(CourseCard::ENTITY, id))
}

fn typed(doc: Document) -> CoreResult<StoredCourse> {
    let id = doc.id;
    doc.into_stored()
        .map_err(|e| CoreError::Store(format!("stored course {id} is unreadable: {e}")))
}
