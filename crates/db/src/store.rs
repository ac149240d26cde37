//! Low-level document CRUD and the pk counter.

use serde_json::Value;
use stockroom_core::types::{DocId, Pk};

use crate::query::{build_where, Filters};
use crate::DbPool;

/// Errors from the store layer.
///
/// Repositories and models propagate these untranslated; only the HTTP
/// handler boundary maps them onto response envelopes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("Duplicate value violates unique constraint: {constraint}")]
    Duplicate { constraint: String },

    #[error("Document has not been persisted yet")]
    NotPersisted,

    #[error("Failed to re-fetch document {id} after insert")]
    LostAfterInsert { id: DocId },

    #[error("Invalid document in collection {collection}: {source}")]
    Decode {
        collection: &'static str,
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Classify a sqlx error, pulling unique-constraint violations
    /// (PostgreSQL error code 23505, constraint names prefixed `uq_`)
    /// into [`StoreError::Duplicate`].
    fn classify(err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                if constraint.starts_with("uq_") {
                    return StoreError::Duplicate { constraint };
                }
            }
        }
        StoreError::Sqlx(err)
    }
}

/// Handle over the `documents` and `counters` tables.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    pool: DbPool,
}

impl DocumentStore {
    pub fn new(pool: DbPool) -> Self {
        DocumentStore { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Atomically increment and fetch the next sequence number for a
    /// collection. The upsert is a single statement, so concurrent creates
    /// can never observe the same value.
    pub async fn next_pk(&self, collection: &str) -> Result<Pk, StoreError> {
        let (seq,): (i64,) = sqlx::query_as(
            "INSERT INTO counters (collection, seq) VALUES ($1, 1)
             ON CONFLICT (collection) DO UPDATE SET seq = counters.seq + 1
             RETURNING seq",
        )
        .bind(collection)
        .fetch_one(&self.pool)
        .await?;
        Ok(seq)
    }

    /// Compensating decrement after a failed create. Not a transaction: a
    /// crash between allocation and rollback leaves a gap, which is
    /// acceptable -- only uniqueness is guaranteed.
    pub async fn rollback_pk(&self, collection: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE counters SET seq = seq - 1 WHERE collection = $1")
            .bind(collection)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert a document, returning its internal id.
    pub async fn insert(&self, collection: &str, doc: &Value) -> Result<DocId, StoreError> {
        let (id,): (DocId,) = sqlx::query_as(
            "INSERT INTO documents (collection, doc) VALUES ($1, $2) RETURNING id",
        )
        .bind(collection)
        .bind(doc)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::classify)?;
        Ok(id)
    }

    /// Replace the full document by internal id. Returns `false` when no
    /// row matched.
    pub async fn replace(
        &self,
        collection: &str,
        id: DocId,
        doc: &Value,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE documents SET doc = $3 WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .bind(doc)
            .execute(&self.pool)
            .await
            .map_err(StoreError::classify)?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a document by internal id. Returns `true` if a row was removed.
    pub async fn remove(&self, collection: &str, id: DocId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch a document by internal id.
    pub async fn fetch_by_id(
        &self,
        collection: &str,
        id: DocId,
    ) -> Result<Option<(DocId, Value)>, StoreError> {
        let row: Option<(DocId, Value)> = sqlx::query_as(
            "SELECT id, doc FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Fetch the first document matching the filters, in insertion order.
    pub async fn fetch_one(
        &self,
        collection: &str,
        filters: &Filters,
    ) -> Result<Option<(DocId, Value)>, StoreError> {
        let clause = build_where(filters, 2);
        let query = format!(
            "SELECT id, doc FROM documents WHERE collection = $1{}
             ORDER BY created_at, id LIMIT 1",
            clause.sql
        );

        let mut q = sqlx::query_as::<_, (DocId, Value)>(&query).bind(collection);
        for bind in &clause.binds {
            q = q.bind(bind);
        }
        Ok(q.fetch_optional(&self.pool).await?)
    }

    /// Fetch every document matching the filters, in insertion order.
    pub async fn fetch_many(
        &self,
        collection: &str,
        filters: &Filters,
    ) -> Result<Vec<(DocId, Value)>, StoreError> {
        let clause = build_where(filters, 2);
        let query = format!(
            "SELECT id, doc FROM documents WHERE collection = $1{}
             ORDER BY created_at, id",
            clause.sql
        );

        let mut q = sqlx::query_as::<_, (DocId, Value)>(&query).bind(collection);
        for bind in &clause.binds {
            q = q.bind(bind);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    /// Fetch the first document whose body contains the given JSON fragment.
    ///
    /// Used for lookups keyed on nested fields, e.g. the token digest
    /// embedded in a user document.
    pub async fn fetch_one_containing(
        &self,
        collection: &str,
        fragment: &Value,
    ) -> Result<Option<(DocId, Value)>, StoreError> {
        let row: Option<(DocId, Value)> = sqlx::query_as(
            "SELECT id, doc FROM documents
             WHERE collection = $1 AND doc @> $2
             ORDER BY created_at, id LIMIT 1",
        )
        .bind(collection)
        .bind(fragment)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
