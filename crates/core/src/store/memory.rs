use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use coursedesk_filter::{eval, FieldPath, Filter};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError, UpdateCounts};
use crate::document::id::ObjectId;
use crate::document::model::Document;
use crate::document::validate::{CollectionSpec, ValidationError};
use crate::mutation::patch::{Patch, PatchOutcome};

type Collection = BTreeMap<ObjectId, Document>;

/// Process-local store. Each call holds the lock for its whole duration, so
/// multi-document writes are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<&'static str, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fail if another document in `docs` already holds one of `body`'s unique
/// values. Missing and null values are never considered duplicates.
fn check_unique(
    spec: &CollectionSpec,
    docs: &Collection,
    id: &ObjectId,
    body: &Map<String, Value>,
) -> Result<(), ValidationError> {
    for field in spec.unique_fields {
        let path = FieldPath::parse(field);
        let Some(value) = path.resolve_in(body).filter(|v| !v.is_null()) else {
            continue;
        };
        let taken = docs
            .values()
            .any(|other| other.id != *id && path.resolve_in(&other.body) == Some(value));
        if taken {
            return Err(ValidationError::Duplicate((*field).to_string()));
        }
    }
    Ok(())
}

fn newest_first(docs: &mut [Document]) {
    docs.sort_by_key(|d| Reverse((d.created_at, d.id)));
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(
        &self,
        spec: &CollectionSpec,
        body: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let body = spec.normalize(&body)?;
        let doc = Document::new(body, Utc::now());
        let mut collections = self.collections.write().await;
        let docs = collections.entry(spec.name).or_default();
        check_unique(spec, docs, &doc.id, &doc.body)?;
        docs.insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn find(
        &self,
        spec: &CollectionSpec,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(spec.name) else {
            return Ok(Vec::new());
        };
        let mut found: Vec<Document> = docs
            .values()
            .filter(|d| eval::matches(filter, &d.body))
            .cloned()
            .collect();
        newest_first(&mut found);
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn find_by_id(
        &self,
        spec: &CollectionSpec,
        id: &ObjectId,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(spec.name).and_then(|docs| docs.get(id)).cloned())
    }

    async fn update_by_id(
        &self,
        spec: &CollectionSpec,
        id: &ObjectId,
        patch: &Patch,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(spec.name).or_default();
        let Some(current) = docs.get(id) else {
            return Ok(None);
        };
        match patch.apply(spec, &current.body)? {
            PatchOutcome::Unchanged => Ok(Some(current.clone())),
            PatchOutcome::Changed(body) => {
                check_unique(spec, docs, id, &body)?;
                let mut next = current.clone();
                next.body = body;
                next.updated_at = Utc::now();
                docs.insert(*id, next.clone());
                Ok(Some(next))
            }
        }
    }

    async fn update_many(
        &self,
        spec: &CollectionSpec,
        ids: &[ObjectId],
        patch: &Patch,
    ) -> Result<UpdateCounts, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(spec.name).or_default();
        let now = Utc::now();

        let mut counts = UpdateCounts::default();
        let mut staged = docs.clone();
        let mut changed = Vec::new();
        for id in ids {
            let Some(current) = docs.get(id) else {
                continue;
            };
            counts.matched += 1;
            if let PatchOutcome::Changed(body) = patch.apply(spec, &current.body)? {
                let mut next = current.clone();
                next.body = body;
                next.updated_at = now;
                staged.insert(*id, next);
                changed.push(*id);
            }
        }
        for id in &changed {
            if let Some(doc) = staged.get(id) {
                check_unique(spec, &staged, id, &doc.body)?;
            }
        }

        counts.modified = changed.len() as u64;
        *docs = staged;
        Ok(counts)
    }

    async fn delete_by_id(
        &self,
        spec: &CollectionSpec,
        id: &ObjectId,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(spec.name)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }

    async fn delete_many(
        &self,
        spec: &CollectionSpec,
        ids: &[ObjectId],
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(spec.name) else {
            return Ok(0);
        };
        Ok(ids.iter().filter(|id| docs.remove(*id).is_some()).count() as u64)
    }

    async fn count(&self, spec: &CollectionSpec, filter: &Filter) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(spec.name)
            .map(|docs| docs.values().filter(|d| eval::matches(filter, &d.body)).count())
            .unwrap_or(0) as u64)
    }

    async fn count_by(
        &self,
        spec: &CollectionSpec,
        path: &FieldPath,
    ) -> Result<Vec<(Value, u64)>, StoreError> {
        let collections = self.collections.read().await;
        let mut groups: Vec<(Value, u64)> = Vec::new();
        for doc in collections.get(spec.name).into_iter().flat_map(|d| d.values()) {
            let key = path.resolve_in(&doc.body).cloned().unwrap_or(Value::Null);
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, n)) => *n += 1,
                None => groups.push((key, 1)),
            }
        }
        groups.sort_by(|(ka, na), (kb, nb)| {
            nb.cmp(na)
                .then_with(|| ka.to_string().cmp(&kb.to_string()))
        });
        Ok(groups)
    }
}
