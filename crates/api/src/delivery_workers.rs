use actix_web::rt::time::interval;
use carepush_domain::{kst, PushMessage, ScheduledJob};
use carepush_infra::CarePushContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

const POLL_INTERVAL_MILLIS: u64 = 1000;

/// Spawns the delivery worker pool on the runtime: a poll loop that claims
/// due jobs from the queue and hands each to its own handler task, bounded
/// by the configured concurrency.
pub fn start_delivery_workers(ctx: CarePushContext) {
    actix_web::rt::spawn(async move {
        let permits = Arc::new(Semaphore::new(ctx.config.delivery_concurrency));
        let mut poll_interval = interval(Duration::from_millis(POLL_INTERVAL_MILLIS));
        loop {
            poll_interval.tick().await;

            let free = permits.available_permits();
            if free == 0 {
                continue;
            }

            let now = ctx.sys.get_timestamp_millis();
            let due_jobs = match ctx.repos.job_queue.claim_due(now, free as i64).await {
                Ok(jobs) => jobs,
                Err(e) => {
                    error!("Claiming due jobs failed: {:?}", e);
                    continue;
                }
            };

            for job in due_jobs {
                let permit = match permits.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                let ctx = ctx.clone();
                actix_web::rt::spawn(async move {
                    let _permit = permit;
                    settle_claimed_job(&job, &ctx).await;
                });
            }
        }
    });
}

/// What the handler decided for a claimed job
#[derive(Debug, PartialEq)]
pub(crate) enum JobOutcome {
    /// Delivered or safely discarded; the job can be purged
    Complete,
    /// Claimed before its target instant; push back until then
    Reschedule(i64),
}

pub(crate) async fn settle_claimed_job(job: &ScheduledJob, ctx: &CarePushContext) {
    match process_due_job(job, ctx).await {
        Ok(JobOutcome::Complete) => {
            if let Err(e) = ctx.repos.job_queue.complete(&job.key).await {
                error!("Completing job: {} failed: {:?}", job.key, e);
            }
        }
        Ok(JobOutcome::Reschedule(due_at)) => {
            if let Err(e) = ctx.repos.job_queue.reschedule(&job.key, due_at).await {
                error!("Rescheduling job: {} failed: {:?}", job.key, e);
            }
        }
        Err(e) => {
            let now = ctx.sys.get_timestamp_millis();
            if let Err(e) = ctx
                .repos
                .job_queue
                .fail(&job.key, now, &e.to_string())
                .await
            {
                error!("Failing job: {} failed: {:?}", job.key, e);
            }
        }
    }
}

/// Delivery handler for one claimed job.
///
/// Idempotent by construction: the job can be redelivered after a crash or
/// an expired lease, so the persisted `sent` flag, not the job itself, is
/// the authority on whether anything still needs to happen. `Err` means the
/// attempt failed and the queue's retry policy applies.
pub(crate) async fn process_due_job(
    job: &ScheduledJob,
    ctx: &CarePushContext,
) -> anyhow::Result<JobOutcome> {
    let notification = match ctx.repos.notifications.find(&job.notification_id).await {
        Some(notification) => notification,
        // Deleted after the job was claimed
        None => return Ok(JobOutcome::Complete),
    };
    if notification.sent {
        return Ok(JobOutcome::Complete);
    }

    // Safety net against clock skew and premature wakes: re-derive the
    // target from the persisted record and never deliver early. The queue's
    // due time is the primary schedule; this check is the backstop.
    let target = match kst::parse_kst_string(&notification.send_at) {
        Ok(target) => target,
        Err(e) => {
            error!(
                "Invalid sendAt on stored notification: {}: {:?}",
                notification.id, e
            );
            return Ok(JobOutcome::Complete);
        }
    };
    let now = ctx.sys.get_timestamp_millis();
    if now + ctx.config.skew_tolerance_millis < target {
        return Ok(JobOutcome::Reschedule(target));
    }

    let device_tokens = ctx
        .repos
        .device_tokens
        .find_by_user(&notification.user_id)
        .await;
    if device_tokens.is_empty() {
        info!(
            "No registered device tokens for user: {}, nothing to deliver",
            notification.user_id
        );
        return Ok(JobOutcome::Complete);
    }

    let message = PushMessage {
        title: notification.title.clone(),
        body: notification.body.clone(),
        deep_link: notification.deep_link.clone().unwrap_or_default(),
        tokens: device_tokens.into_iter().map(|t| t.token).collect(),
    };
    let report = ctx.push.send_multicast(&message).await?;

    if let Err(e) = ctx
        .repos
        .device_tokens
        .handle_delivery_report(&notification.user_id, &report)
        .await
    {
        // Pruning is best effort; the send already happened
        warn!(
            "Handling delivery report for user: {} failed: {:?}",
            notification.user_id, e
        );
    }

    // Mark sent only after a successful dispatch. A failed write here fails
    // the job, and the retry can duplicate the push (at-least-once); the
    // `sent` re-check above narrows that window.
    let mut delivered = notification;
    delivered.sent = true;
    ctx.repos.notifications.save(&delivered).await?;

    Ok(JobOutcome::Complete)
}

#[cfg(test)]
mod test {
    use super::*;
    use carepush_domain::{DeviceToken, JobStatus, Notification, ID};
    use carepush_infra::{InMemoryPushService, StaticSys};

    struct TestContext {
        ctx: CarePushContext,
        push: InMemoryPushService,
    }

    fn setup(now: i64) -> TestContext {
        let mut ctx = CarePushContext::create_inmemory();
        ctx.sys = Arc::new(StaticSys(now));
        let push = InMemoryPushService::new();
        ctx.push = Arc::new(push.clone());
        TestContext { ctx, push }
    }

    const SEND_AT: &str = "2025-08-10 15:20:54";

    fn target() -> i64 {
        kst::parse_kst_string(SEND_AT).unwrap()
    }

    fn notification(user_id: &ID) -> Notification {
        Notification {
            id: Default::default(),
            user_id: user_id.clone(),
            title: "Take medicine".into(),
            body: "8am dose".into(),
            deep_link: Some("app://medication".into()),
            send_at: SEND_AT.into(),
            sent: false,
            created: 0,
        }
    }

    fn device_token(user_id: &ID, token: &str) -> DeviceToken {
        DeviceToken {
            user_id: user_id.clone(),
            token: token.into(),
            platform: "ios".into(),
            timezone: "Asia/Seoul".into(),
            registered_at: 0,
        }
    }

    /// Enqueues a job due "now" and claims it, the state a worker sees when
    /// its handler starts
    async fn enqueue_and_claim(ctx: &CarePushContext, notification_id: ID) -> ScheduledJob {
        let now = ctx.sys.get_timestamp_millis();
        let job = ScheduledJob::new(notification_id, now, 5, 3000);
        ctx.repos.job_queue.enqueue(&job).await.unwrap();
        let claimed = ctx.repos.job_queue.claim_due(now, 1).await.unwrap();
        assert_eq!(claimed.len(), 1);
        claimed.into_iter().next().unwrap()
    }

    #[actix_web::main]
    #[test]
    async fn discards_a_job_whose_notification_was_deleted() {
        let TestContext { ctx, push } = setup(target());
        let job = enqueue_and_claim(&ctx, ID::new()).await;

        settle_claimed_job(&job, &ctx).await;

        assert!(ctx.repos.job_queue.lookup(&job.key).await.is_none());
        assert!(push.sent_messages().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn second_delivery_for_a_sent_notification_is_a_noop() {
        let TestContext { ctx, push } = setup(target());
        let user_id = ID::new();

        let mut n = notification(&user_id);
        n.sent = true;
        ctx.repos.notifications.insert(&n).await.unwrap();
        ctx.repos
            .device_tokens
            .register(&device_token(&user_id, "token-1"))
            .await
            .unwrap();

        let job = enqueue_and_claim(&ctx, n.id.clone()).await;
        let outcome = process_due_job(&job, &ctx).await.unwrap();

        assert_eq!(outcome, JobOutcome::Complete);
        assert!(push.sent_messages().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn reschedules_a_job_claimed_too_early() {
        // Woken 10 seconds before the target, beyond the skew tolerance
        let TestContext { ctx, push } = setup(target() - 10 * 1000);
        let user_id = ID::new();

        let n = notification(&user_id);
        ctx.repos.notifications.insert(&n).await.unwrap();

        let job = enqueue_and_claim(&ctx, n.id.clone()).await;
        let outcome = process_due_job(&job, &ctx).await.unwrap();

        assert_eq!(outcome, JobOutcome::Reschedule(target()));
        assert!(push.sent_messages().is_empty());

        settle_claimed_job(&job, &ctx).await;
        let rescheduled = ctx.repos.job_queue.lookup(&job.key).await.unwrap();
        assert_eq!(rescheduled.status, JobStatus::Scheduled);
        assert_eq!(rescheduled.due_at, target());
    }

    #[actix_web::main]
    #[test]
    async fn delivers_within_the_skew_tolerance() {
        let TestContext { ctx, push } = setup(target() - 2000);
        let user_id = ID::new();

        let n = notification(&user_id);
        ctx.repos.notifications.insert(&n).await.unwrap();
        ctx.repos
            .device_tokens
            .register(&device_token(&user_id, "token-1"))
            .await
            .unwrap();

        let job = enqueue_and_claim(&ctx, n.id.clone()).await;
        let outcome = process_due_job(&job, &ctx).await.unwrap();

        assert_eq!(outcome, JobOutcome::Complete);
        assert_eq!(push.sent_messages().len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn discards_when_the_user_has_no_device_tokens() {
        let TestContext { ctx, push } = setup(target());
        let user_id = ID::new();

        let n = notification(&user_id);
        ctx.repos.notifications.insert(&n).await.unwrap();

        let job = enqueue_and_claim(&ctx, n.id.clone()).await;
        let outcome = process_due_job(&job, &ctx).await.unwrap();

        assert_eq!(outcome, JobOutcome::Complete);
        assert!(push.sent_messages().is_empty());
        // Undeliverable, but not sent: the record stays pending
        let stored = ctx.repos.notifications.find(&n.id).await.unwrap();
        assert!(!stored.sent);
    }

    #[actix_web::main]
    #[test]
    async fn delivers_to_all_tokens_and_marks_sent() {
        let TestContext { ctx, push } = setup(target() + 1000);
        let user_id = ID::new();

        let n = notification(&user_id);
        ctx.repos.notifications.insert(&n).await.unwrap();
        for token in ["token-1", "token-2"] {
            ctx.repos
                .device_tokens
                .register(&device_token(&user_id, token))
                .await
                .unwrap();
        }

        let job = enqueue_and_claim(&ctx, n.id.clone()).await;
        settle_claimed_job(&job, &ctx).await;

        let messages = push.sent_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].title, "Take medicine");
        assert_eq!(messages[0].body, "8am dose");
        assert_eq!(messages[0].deep_link, "app://medication");
        assert_eq!(messages[0].tokens.len(), 2);

        let stored = ctx.repos.notifications.find(&n.id).await.unwrap();
        assert!(stored.sent);
        // Successful jobs are purged
        assert!(ctx.repos.job_queue.lookup(&job.key).await.is_none());
    }

    #[actix_web::main]
    #[test]
    async fn failed_dispatch_goes_back_to_the_queue_for_retry() {
        let TestContext { ctx, push } = setup(target());
        let user_id = ID::new();

        let n = notification(&user_id);
        ctx.repos.notifications.insert(&n).await.unwrap();
        ctx.repos
            .device_tokens
            .register(&device_token(&user_id, "token-1"))
            .await
            .unwrap();
        push.set_failing(true);

        let job = enqueue_and_claim(&ctx, n.id.clone()).await;
        settle_claimed_job(&job, &ctx).await;

        let retried = ctx.repos.job_queue.lookup(&job.key).await.unwrap();
        assert_eq!(retried.status, JobStatus::Scheduled);
        assert_eq!(retried.attempts, 1);
        assert_eq!(retried.due_at, target() + 3000);
        // Not marked sent, so the retry will dispatch
        let stored = ctx.repos.notifications.find(&n.id).await.unwrap();
        assert!(!stored.sent);
    }

    #[actix_web::main]
    #[test]
    async fn hands_the_delivery_report_to_the_token_store() {
        let TestContext { ctx, push } = setup(target());
        let user_id = ID::new();

        let n = notification(&user_id);
        ctx.repos.notifications.insert(&n).await.unwrap();
        for token in ["stale", "active"] {
            ctx.repos
                .device_tokens
                .register(&device_token(&user_id, token))
                .await
                .unwrap();
        }
        push.mark_unregistered("stale");

        let job = enqueue_and_claim(&ctx, n.id.clone()).await;
        settle_claimed_job(&job, &ctx).await;

        // The token store pruned the unregistered token
        let tokens = ctx.repos.device_tokens.find_by_user(&user_id).await;
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, "active");
        // A partial report is still a successful dispatch
        let stored = ctx.repos.notifications.find(&n.id).await.unwrap();
        assert!(stored.sent);
    }

    #[actix_web::main]
    #[test]
    async fn discards_a_record_with_an_unparseable_send_at() {
        let TestContext { ctx, push } = setup(target());
        let user_id = ID::new();

        let mut n = notification(&user_id);
        n.send_at = "whenever".into();
        ctx.repos.notifications.insert(&n).await.unwrap();
        ctx.repos
            .device_tokens
            .register(&device_token(&user_id, "token-1"))
            .await
            .unwrap();

        let job = enqueue_and_claim(&ctx, n.id.clone()).await;
        let outcome = process_due_job(&job, &ctx).await.unwrap();

        assert_eq!(outcome, JobOutcome::Complete);
        assert!(push.sent_messages().is_empty());
    }
}
