mod inmemory;
mod postgres;

pub use inmemory::InMemoryJobQueue;
pub use postgres::PostgresJobQueue;

use carepush_domain::ScheduledJob;

/// How long a claimed job stays leased to its worker. A worker that does
/// not complete, fail or reschedule the job within the lease loses it, and
/// the job becomes claimable again (at-least-once redelivery).
pub const JOB_LEASE_MILLIS: i64 = 30 * 1000;

/// Durable delayed work queue, deduplicated by job key.
///
/// Producers enqueue and cancel; consumers claim due jobs and settle them
/// with `complete`, `fail` or `reschedule`. A claimed job is invisible to
/// other consumers while its lease holds, so each job runs in at most one
/// handler at a time. Cancelling never interrupts a handler already
/// running; the handler's own re-checks guard against stale delivery.
#[async_trait::async_trait]
pub trait IJobQueue: Send + Sync {
    /// Schedules a job. A job with the same key already in the queue is an
    /// error: callers that want to replace a job cancel it first, the queue
    /// never silently overwrites.
    async fn enqueue(&self, job: &ScheduledJob) -> anyhow::Result<()>;
    /// Removes the job with the given key. Removing a missing key is not
    /// an error. Once this returns, no new delivery attempt for the key
    /// will start.
    async fn cancel(&self, key: &str) -> anyhow::Result<()>;
    async fn lookup(&self, key: &str) -> Option<ScheduledJob>;
    /// Claims up to `limit` due jobs: scheduled jobs whose `due_at` has
    /// passed, plus running jobs whose lease expired (their worker is
    /// presumed dead). Claimed jobs are marked running with a fresh lease.
    async fn claim_due(&self, now: i64, limit: i64) -> anyhow::Result<Vec<ScheduledJob>>;
    /// Settles a claimed job after successful processing. The job is
    /// purged; only failed jobs are retained.
    async fn complete(&self, key: &str) -> anyhow::Result<()>;
    /// Settles a claimed job after a failed attempt. While attempts
    /// remain, the job is rescheduled with exponential backoff; after the
    /// last attempt it is kept in a failed state with the error message,
    /// for inspection. Settling a job that was cancelled mid-flight is a
    /// no-op.
    async fn fail(&self, key: &str, now: i64, error: &str) -> anyhow::Result<()>;
    /// Pushes a claimed job back into the schedule at a later due time,
    /// used when a job was claimed before its target instant (clock skew).
    async fn reschedule(&self, key: &str, due_at: i64) -> anyhow::Result<()>;
}
