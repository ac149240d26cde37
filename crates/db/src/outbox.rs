//! Search-index outbox.
//!
//! Index maintenance jobs are enqueued here in the same database as the
//! documents they describe and drained by the worker binary strictly in
//! `id` order. A single ordered consumer makes same-entity jobs FIFO, so a
//! delete enqueued after a create can never be applied first.

use serde_json::Value;
use stockroom_core::types::{DocId, Timestamp};

use crate::DbPool;

/// The operation a job applies to the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOp {
    Index,
    Update,
    Delete,
}

impl IndexOp {
    pub fn as_str(self) -> &'static str {
        match self {
            IndexOp::Index => "index",
            IndexOp::Update => "update",
            IndexOp::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Option<IndexOp> {
        match value {
            "index" => Some(IndexOp::Index),
            "update" => Some(IndexOp::Update),
            "delete" => Some(IndexOp::Delete),
            _ => None,
        }
    }
}

/// A pending or processed outbox row.
#[derive(Debug, Clone)]
pub struct OutboxJob {
    pub id: i64,
    pub index_name: String,
    pub entity_id: DocId,
    pub op: IndexOp,
    pub payload: Option<Value>,
    pub enqueued_at: Timestamp,
}

type OutboxRow = (i64, String, DocId, String, Option<Value>, Timestamp);

impl OutboxJob {
    fn from_row(row: OutboxRow) -> Option<OutboxJob> {
        let (id, index_name, entity_id, op, payload, enqueued_at) = row;
        Some(OutboxJob {
            id,
            index_name,
            entity_id,
            op: IndexOp::parse(&op)?,
            payload,
            enqueued_at,
        })
    }
}

/// Queue operations for index jobs.
pub struct OutboxRepo;

impl OutboxRepo {
    /// Enqueue a job, returning its id.
    pub async fn enqueue(
        pool: &DbPool,
        index_name: &str,
        entity_id: DocId,
        op: IndexOp,
        payload: Option<Value>,
    ) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO index_outbox (index_name, entity_id, op, payload)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(index_name)
        .bind(entity_id)
        .bind(op.as_str())
        .bind(payload)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }

    /// Fetch up to `limit` unprocessed jobs, oldest first.
    ///
    /// Rows with an op this build does not recognize are skipped rather
    /// than failing the whole batch.
    pub async fn fetch_pending(pool: &DbPool, limit: i64) -> Result<Vec<OutboxJob>, sqlx::Error> {
        let rows: Vec<OutboxRow> = sqlx::query_as(
            "SELECT id, index_name, entity_id, op, payload, enqueued_at
             FROM index_outbox
             WHERE processed_at IS NULL
             ORDER BY id
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().filter_map(OutboxJob::from_row).collect())
    }

    /// Mark a job processed.
    pub async fn mark_processed(pool: &DbPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE index_outbox SET processed_at = now() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_round_trips_through_text() {
        for op in [IndexOp::Index, IndexOp::Update, IndexOp::Delete] {
            assert_eq!(IndexOp::parse(op.as_str()), Some(op));
        }
        assert_eq!(IndexOp::parse("reindex"), None);
    }
}
