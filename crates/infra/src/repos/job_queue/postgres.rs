use super::{IJobQueue, JOB_LEASE_MILLIS};

use carepush_domain::{JobStatus, ScheduledJob, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::str::FromStr;
use tracing::error;

pub struct PostgresJobQueue {
    pool: PgPool,
}

impl PostgresJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ScheduledJobRaw {
    key: String,
    notification_uid: Uuid,
    due_at: i64,
    status: String,
    attempts: i64,
    max_attempts: i64,
    backoff_base_millis: i64,
    lease_until: Option<i64>,
    last_error: Option<String>,
}

impl TryFrom<ScheduledJobRaw> for ScheduledJob {
    type Error = anyhow::Error;

    fn try_from(raw: ScheduledJobRaw) -> anyhow::Result<Self> {
        Ok(Self {
            key: raw.key,
            notification_id: ID::from(raw.notification_uid),
            due_at: raw.due_at,
            status: JobStatus::from_str(&raw.status)?,
            attempts: raw.attempts,
            max_attempts: raw.max_attempts,
            backoff_base_millis: raw.backoff_base_millis,
            lease_until: raw.lease_until,
            last_error: raw.last_error,
        })
    }
}

#[async_trait::async_trait]
impl IJobQueue for PostgresJobQueue {
    async fn enqueue(&self, job: &ScheduledJob) -> anyhow::Result<()> {
        // A duplicate key violates the primary key and surfaces as an
        // error, which is the contract: callers cancel before re-enqueue.
        sqlx::query(
            r#"
            INSERT INTO scheduled_jobs
            (key, notification_uid, due_at, status, attempts, max_attempts, backoff_base_millis, lease_until, last_error)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&job.key)
        .bind(job.notification_id.inner_ref())
        .bind(job.due_at)
        .bind(job.status.as_str())
        .bind(job.attempts)
        .bind(job.max_attempts)
        .bind(job.backoff_base_millis)
        .bind(job.lease_until)
        .bind(&job.last_error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn cancel(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM scheduled_jobs
            WHERE key = $1
            "#,
        )
        .bind(key)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn lookup(&self, key: &str) -> Option<ScheduledJob> {
        match sqlx::query_as::<_, ScheduledJobRaw>(
            r#"
            SELECT * FROM scheduled_jobs
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        {
            Ok(job) => job.and_then(|j| j.try_into().ok()),
            Err(e) => {
                error!("Lookup job query failed: {:?}", e);
                None
            }
        }
    }

    async fn claim_due(&self, now: i64, limit: i64) -> anyhow::Result<Vec<ScheduledJob>> {
        // SKIP LOCKED keeps concurrent workers from claiming the same rows;
        // the lease keeps a claimed job invisible until its worker settles
        // it or is presumed dead.
        let claimed = sqlx::query_as::<_, ScheduledJobRaw>(
            r#"
            UPDATE scheduled_jobs
            SET status = 'running', lease_until = $2
            WHERE key IN (
                SELECT key FROM scheduled_jobs
                WHERE (status = 'scheduled' AND due_at <= $1)
                   OR (status = 'running' AND lease_until <= $1)
                ORDER BY due_at ASC
                LIMIT $3
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(now + JOB_LEASE_MILLIS)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut jobs = claimed
            .into_iter()
            .map(|j| j.try_into())
            .collect::<anyhow::Result<Vec<ScheduledJob>>>()?;
        jobs.sort_by_key(|j| j.due_at);
        Ok(jobs)
    }

    async fn complete(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM scheduled_jobs
            WHERE key = $1
            "#,
        )
        .bind(key)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fail(&self, key: &str, now: i64, error: &str) -> anyhow::Result<()> {
        // The job is leased to the calling worker, so read-then-write is
        // not racing another consumer.
        let job = match self.lookup(key).await {
            Some(job) => job,
            // Cancelled while the handler was running
            None => return Ok(()),
        };
        let attempts = job.attempts + 1;
        if attempts >= job.max_attempts {
            sqlx::query(
                r#"
                UPDATE scheduled_jobs
                SET status = 'failed', attempts = $2, last_error = $3, lease_until = NULL
                WHERE key = $1
                "#,
            )
            .bind(key)
            .bind(attempts)
            .bind(error)
            .execute(&self.pool)
            .await?;
        } else {
            let backoff = ScheduledJob { attempts, ..job }.next_backoff_millis();
            sqlx::query(
                r#"
                UPDATE scheduled_jobs
                SET status = 'scheduled', attempts = $2, last_error = $3, due_at = $4, lease_until = NULL
                WHERE key = $1
                "#,
            )
            .bind(key)
            .bind(attempts)
            .bind(error)
            .bind(now + backoff)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn reschedule(&self, key: &str, due_at: i64) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE scheduled_jobs
            SET status = 'scheduled', due_at = $2, lease_until = NULL
            WHERE key = $1
            "#,
        )
        .bind(key)
        .bind(due_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
