use super::{IJobQueue, JOB_LEASE_MILLIS};
use carepush_domain::{JobStatus, ScheduledJob};
use std::sync::Mutex;

pub struct InMemoryJobQueue {
    jobs: Mutex<Vec<ScheduledJob>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
        }
    }
}

fn is_claimable(job: &ScheduledJob, now: i64) -> bool {
    match job.status {
        JobStatus::Scheduled => job.due_at <= now,
        JobStatus::Running => job.lease_until.map(|lease| lease <= now).unwrap_or(true),
        JobStatus::Failed => false,
    }
}

#[async_trait::async_trait]
impl IJobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: &ScheduledJob) -> anyhow::Result<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if jobs.iter().any(|j| j.key == job.key) {
            return Err(anyhow::Error::msg(format!(
                "A job with key: {} already exists",
                job.key
            )));
        }
        jobs.push(job.clone());
        Ok(())
    }

    async fn cancel(&self, key: &str) -> anyhow::Result<()> {
        let mut jobs = self.jobs.lock().unwrap();
        jobs.retain(|j| j.key != key);
        Ok(())
    }

    async fn lookup(&self, key: &str) -> Option<ScheduledJob> {
        let jobs = self.jobs.lock().unwrap();
        jobs.iter().find(|j| j.key == key).cloned()
    }

    async fn claim_due(&self, now: i64, limit: i64) -> anyhow::Result<Vec<ScheduledJob>> {
        let mut jobs = self.jobs.lock().unwrap();
        let mut due = jobs
            .iter_mut()
            .filter(|j| is_claimable(&**j, now))
            .collect::<Vec<_>>();
        due.sort_by_key(|j| j.due_at);
        Ok(due
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|job| {
                job.status = JobStatus::Running;
                job.lease_until = Some(now + JOB_LEASE_MILLIS);
                job.clone()
            })
            .collect())
    }

    async fn complete(&self, key: &str) -> anyhow::Result<()> {
        let mut jobs = self.jobs.lock().unwrap();
        jobs.retain(|j| j.key != key);
        Ok(())
    }

    async fn fail(&self, key: &str, now: i64, error: &str) -> anyhow::Result<()> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = match jobs.iter_mut().find(|j| j.key == key) {
            Some(job) => job,
            // Cancelled while the handler was running
            None => return Ok(()),
        };
        job.attempts += 1;
        job.last_error = Some(error.to_string());
        job.lease_until = None;
        if job.attempts >= job.max_attempts {
            job.status = JobStatus::Failed;
        } else {
            job.status = JobStatus::Scheduled;
            job.due_at = now + job.next_backoff_millis();
        }
        Ok(())
    }

    async fn reschedule(&self, key: &str, due_at: i64) -> anyhow::Result<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.iter_mut().find(|j| j.key == key) {
            job.status = JobStatus::Scheduled;
            job.due_at = due_at;
            job.lease_until = None;
        }
        Ok(())
    }
}
