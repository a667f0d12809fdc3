use async_trait::async_trait;
use chrono::Utc;
use coursedesk_filter::{FieldPath, Filter};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::sql::push_filter;
use super::{DocumentStore, StoreError, UpdateCounts};
use crate::document::id::ObjectId;
use crate::document::model::{Document, DocumentRow};
use crate::document::validate::{CollectionSpec, ValidationError};
use crate::mutation::patch::{Patch, PatchOutcome};

/// Column list shared across queries.
const COLUMNS: &str = "id, body, created_at, updated_at";

/// Document store over a single PostgreSQL `documents` table with a JSONB
/// body column. Unique fields are backed by partial expression indexes named
/// by [`unique_index_name`].
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Index backing uniqueness of `field` in `collection`, e.g.
/// `coursecard_meta_slug_key`.
pub fn unique_index_name(collection: &str, field: &str) -> String {
    format!("{collection}_{}_key", field.replace('.', "_")).to_lowercase()
}

/// Turn unique-index violations into validation failures naming the field.
fn classify(spec: &CollectionSpec, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let field = db
                .constraint()
                .and_then(|name| {
                    spec.unique_fields
                        .iter()
                        .find(|f| unique_index_name(spec.name, f) == name)
                })
                .map(|f| f.to_string())
                .unwrap_or_else(|| "unique key".to_string());
            return StoreError::Validation(ValidationError::Duplicate(field));
        }
    }
    StoreError::Database(err)
}

fn to_document(row: DocumentRow) -> Result<Document, StoreError> {
    let id = row.id.clone();
    Document::try_from(row).map_err(|e| StoreError::Corrupt {
        id,
        reason: e.to_string(),
    })
}

fn id_strings(ids: &[ObjectId]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(
        &self,
        spec: &CollectionSpec,
        body: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let body = spec.normalize(&body)?;
        let doc = Document::new(body, Utc::now());
        let query = format!(
            "INSERT INTO documents (id, collection, body, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(doc.id.to_string())
            .bind(spec.name)
            .bind(Json(&doc.body))
            .bind(doc.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(spec, e))?;
        to_document(row)
    }

    async fn find(
        &self,
        spec: &CollectionSpec,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = "
        ));
        qb.push_bind(spec.name).push(" AND ");
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }
        let rows = qb
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(to_document).collect()
    }

    async fn find_by_id(
        &self,
        spec: &CollectionSpec,
        id: &ObjectId,
    ) -> Result<Option<Document>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE collection = $1 AND id = $2");
        let row = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(spec.name)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(to_document).transpose()
    }

    async fn update_by_id(
        &self,
        spec: &CollectionSpec,
        id: &ObjectId,
        patch: &Patch,
    ) -> Result<Option<Document>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let select = format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE"
        );
        let Some(row) = sqlx::query_as::<_, DocumentRow>(&select)
            .bind(spec.name)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let current = to_document(row)?;

        let body = match patch.apply(spec, &current.body)? {
            PatchOutcome::Unchanged => {
                tx.commit().await?;
                return Ok(Some(current));
            }
            PatchOutcome::Changed(body) => body,
        };
        let update = format!(
            "UPDATE documents SET body = $1, updated_at = $2 \
             WHERE collection = $3 AND id = $4 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, DocumentRow>(&update)
            .bind(Json(&body))
            .bind(Utc::now())
            .bind(spec.name)
            .bind(id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| classify(spec, e))?;
        tx.commit().await?;
        to_document(row).map(Some)
    }

    async fn update_many(
        &self,
        spec: &CollectionSpec,
        ids: &[ObjectId],
        patch: &Patch,
    ) -> Result<UpdateCounts, StoreError> {
        let mut tx = self.pool.begin().await?;
        let select = format!(
            "SELECT {COLUMNS} FROM documents \
             WHERE collection = $1 AND id = ANY($2) \
             ORDER BY id FOR UPDATE"
        );
        let rows = sqlx::query_as::<_, DocumentRow>(&select)
            .bind(spec.name)
            .bind(id_strings(ids))
            .fetch_all(&mut *tx)
            .await?;

        let mut counts = UpdateCounts {
            matched: rows.len() as u64,
            modified: 0,
        };
        let mut changed = Vec::new();
        for row in rows {
            let current = to_document(row)?;
            if let PatchOutcome::Changed(body) = patch.apply(spec, &current.body)? {
                changed.push((current.id, body));
            }
        }

        let now = Utc::now();
        for (id, body) in &changed {
            sqlx::query(
                "UPDATE documents SET body = $1, updated_at = $2 \
                 WHERE collection = $3 AND id = $4",
            )
            .bind(Json(body))
            .bind(now)
            .bind(spec.name)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| classify(spec, e))?;
        }
        tx.commit().await?;

        counts.modified = changed.len() as u64;
        Ok(counts)
    }

    async fn delete_by_id(
        &self,
        spec: &CollectionSpec,
        id: &ObjectId,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(spec.name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(
        &self,
        spec: &CollectionSpec,
        ids: &[ObjectId],
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = ANY($2)")
            .bind(spec.name)
            .bind(id_strings(ids))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self, spec: &CollectionSpec, filter: &Filter) -> Result<u64, StoreError> {
        let mut qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM documents WHERE collection = ");
        qb.push_bind(spec.name).push(" AND ");
        push_filter(&mut qb, filter);
        let count: i64 = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn count_by(
        &self,
        spec: &CollectionSpec,
        path: &FieldPath,
    ) -> Result<Vec<(Value, u64)>, StoreError> {
        let rows: Vec<(Option<Json<Value>>, i64)> = sqlx::query_as(
            "SELECT body #> $2 AS key, COUNT(*) AS count FROM documents \
             WHERE collection = $1 \
             GROUP BY 1 ORDER BY 2 DESC, 1",
        )
        .bind(spec.name)
        .bind(path.segments().to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(key, count)| (key.map(|k| k.0).unwrap_or(Value::Null), count.max(0) as u64))
            .collect())
    }
}
