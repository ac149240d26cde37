//! Outbox consumer: applies queued index jobs to the search engine.
//!
//! Jobs are drained strictly in `id` order by a single consumer, which
//! makes same-entity jobs FIFO -- a delete enqueued after a create can
//! never overtake it. Failed jobs are logged and marked processed; there
//! is no retry policy.

use std::time::Duration;

use stockroom_db::outbox::{IndexOp, OutboxJob, OutboxRepo};
use stockroom_db::DbPool;
use stockroom_index::{SearchClient, SearchError};
use tokio_util::sync::CancellationToken;

/// Tuning knobs for the drain loop.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Sleep between polls when the outbox is empty.
    pub poll_interval: Duration,
    /// Maximum jobs fetched per poll.
    pub batch_size: i64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            poll_interval: Duration::from_secs(1),
            batch_size: 50,
        }
    }
}

/// Drain the outbox until cancelled.
pub async fn run(
    pool: DbPool,
    client: SearchClient,
    config: WorkerConfig,
    cancel: CancellationToken,
) {
    tracing::info!(
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        batch_size = config.batch_size,
        "Index worker started"
    );

    while !cancel.is_cancelled() {
        let jobs = match OutboxRepo::fetch_pending(&pool, config.batch_size).await {
            Ok(jobs) => jobs,
            Err(err) => {
                tracing::error!(error = %err, "Failed to fetch pending index jobs");
                if wait_or_cancelled(&cancel, config.poll_interval).await {
                    break;
                }
                continue;
            }
        };

        if jobs.is_empty() {
            if wait_or_cancelled(&cancel, config.poll_interval).await {
                break;
            }
            continue;
        }

        for job in jobs {
            if cancel.is_cancelled() {
                return;
            }

            let job_id = job.id;
            if let Err(err) = apply_job(&client, &job).await {
                // No retries: the job is marked processed either way, like
                // the fire-and-forget queue it replaces.
                tracing::error!(job_id, error = %err, "Index job failed");
            }

            if let Err(err) = OutboxRepo::mark_processed(&pool, job_id).await {
                tracing::error!(job_id, error = %err, "Failed to mark index job processed");
            }
        }
    }

    tracing::info!("Index worker stopped");
}

/// Apply one job to the search engine.
async fn apply_job(client: &SearchClient, job: &OutboxJob) -> Result<(), SearchError> {
    let entity_id = job.entity_id.to_string();
    tracing::info!(
        job_id = job.id,
        index = %job.index_name,
        entity_id = %entity_id,
        op = job.op.as_str(),
        "Applying index job"
    );

    match job.op {
        IndexOp::Index => {
            let Some(payload) = &job.payload else {
                tracing::warn!(job_id = job.id, "Index job has no payload, skipping");
                return Ok(());
            };
            client.put_document(&job.index_name, &entity_id, payload).await
        }
        IndexOp::Update => {
            let Some(payload) = &job.payload else {
                tracing::warn!(job_id = job.id, "Update job has no payload, skipping");
                return Ok(());
            };
            client
                .update_document(&job.index_name, &entity_id, payload)
                .await
        }
        IndexOp::Delete => client.delete_document(&job.index_name, &entity_id).await,
    }
}

/// Sleep for `interval`, returning `true` if cancellation arrived first.
async fn wait_or_cancelled(cancel: &CancellationToken, interval: Duration) -> bool {
    tokio::select! {
        () = cancel.cancelled() => true,
        () = tokio::time::sleep(interval) => false,
    }
}
