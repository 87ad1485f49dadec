use crate::error::CarePushError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use carepush_api_structs::delete_notification::*;
use carepush_domain::{ScheduledJob, ID};
use carepush_infra::CarePushContext;

pub async fn delete_notification_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<CarePushContext>,
) -> Result<HttpResponse, CarePushError> {
    let _user_id = protect_route(&http_req, &ctx)?;

    let usecase = DeleteNotificationUseCase {
        notification_id: path_params.notification_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|_| HttpResponse::Ok().json(APIResponse::new()))
        .map_err(CarePushError::from)
}

/// Deleting is idempotent: deleting a missing notification succeeds, so a
/// client retry after a lost response observes the same outcome.
#[derive(Debug)]
pub struct DeleteNotificationUseCase {
    pub notification_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for CarePushError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteNotificationUseCase {
    type Response = ();

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteNotification";

    async fn execute(&mut self, ctx: &CarePushContext) -> Result<Self::Response, Self::Error> {
        // Cancel before deleting the record, so a worker that still claims
        // the job sees the record gone and discards it.
        ctx.repos
            .job_queue
            .cancel(&ScheduledJob::key_for(&self.notification_id))
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        ctx.repos.notifications.delete(&self.notification_id).await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::notification::create_notification::CreateNotificationUseCase;
    use carepush_domain::kst;
    use carepush_infra::StaticSys;
    use std::sync::Arc;

    #[actix_web::main]
    #[test]
    async fn deletes_the_record_and_its_job() {
        let now = kst::parse_kst_string("2025-03-01 07:59:00").unwrap();
        let mut ctx = CarePushContext::create_inmemory();
        ctx.sys = Arc::new(StaticSys(now));

        let mut create = CreateNotificationUseCase {
            user_id: ID::new(),
            title: "Take medicine".into(),
            body: "8am dose".into(),
            deep_link: None,
            send_at: "2025-03-01 08:00:00".into(),
        };
        let notification = create.execute(&ctx).await.unwrap();
        let key = ScheduledJob::key_for(&notification.id);
        assert!(ctx.repos.job_queue.lookup(&key).await.is_some());

        let mut usecase = DeleteNotificationUseCase {
            notification_id: notification.id.clone(),
        };
        usecase.execute(&ctx).await.unwrap();

        assert!(ctx.repos.notifications.find(&notification.id).await.is_none());
        assert!(ctx.repos.job_queue.lookup(&key).await.is_none());
    }

    #[actix_web::main]
    #[test]
    async fn deleting_twice_is_not_an_error() {
        let ctx = CarePushContext::create_inmemory();
        let notification_id = ID::new();

        let mut usecase = DeleteNotificationUseCase {
            notification_id: notification_id.clone(),
        };
        assert!(usecase.execute(&ctx).await.is_ok());
        assert!(usecase.execute(&ctx).await.is_ok());
    }
}
