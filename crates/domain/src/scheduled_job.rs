use crate::shared::entity::ID;
use std::fmt::Display;
use std::str::FromStr;

/// Idempotency key prefix for notification delivery jobs. One live job per
/// notification is enforced by using `"notif:" + notification_id` as the
/// queue key.
pub const JOB_KEY_PREFIX: &str = "notif:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Waiting until `due_at`
    Scheduled,
    /// Claimed by a worker holding a lease
    Running,
    /// Retry attempts exhausted; retained for inspection
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Running => "running",
            Self::Failed => "failed",
        }
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "running" => Ok(Self::Running),
            "failed" => Ok(Self::Failed),
            _ => Err(anyhow::Error::msg(format!("Unknown job status: {}", s))),
        }
    }
}

/// A unit of delayed work in the job queue, deduplicated by `key`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledJob {
    pub key: String,
    pub notification_id: ID,
    /// Earliest delivery instant in UTC millis
    pub due_at: i64,
    pub status: JobStatus,
    /// Delivery attempts finished so far
    pub attempts: i64,
    pub max_attempts: i64,
    pub backoff_base_millis: i64,
    /// While `Running`, the instant until which the claiming worker holds
    /// the job. An expired lease makes the job claimable again.
    pub lease_until: Option<i64>,
    pub last_error: Option<String>,
}

impl ScheduledJob {
    pub fn new(notification_id: ID, due_at: i64, max_attempts: i64, backoff_base_millis: i64) -> Self {
        Self {
            key: Self::key_for(&notification_id),
            notification_id,
            due_at,
            status: JobStatus::Scheduled,
            attempts: 0,
            max_attempts,
            backoff_base_millis,
            lease_until: None,
            last_error: None,
        }
    }

    pub fn key_for(notification_id: &ID) -> String {
        format!("{}{}", JOB_KEY_PREFIX, notification_id)
    }

    /// Delay before the next attempt, doubling per finished attempt:
    /// base, 2*base, 4*base, ... Callers invoke this after incrementing
    /// `attempts` for the failed attempt.
    pub fn next_backoff_millis(&self) -> i64 {
        let exponent = (self.attempts - 1).clamp(0, 16) as u32;
        self.backoff_base_millis * 2_i64.pow(exponent)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn derives_key_from_notification_id() {
        let id = ID::new();
        let job = ScheduledJob::new(id.clone(), 1000, 5, 3000);
        assert_eq!(job.key, format!("notif:{}", id));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let mut job = ScheduledJob::new(ID::new(), 1000, 5, 3000);
        job.attempts = 1;
        assert_eq!(job.next_backoff_millis(), 3000);
        job.attempts = 2;
        assert_eq!(job.next_backoff_millis(), 6000);
        job.attempts = 3;
        assert_eq!(job.next_backoff_millis(), 12000);
    }

    #[test]
    fn job_status_round_trips_as_string() {
        for status in [JobStatus::Scheduled, JobStatus::Running, JobStatus::Failed] {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert!("done".parse::<JobStatus>().is_err());
    }
}
