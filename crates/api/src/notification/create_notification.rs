use crate::error::CarePushError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use carepush_api_structs::create_notification::*;
use carepush_domain::{kst, Notification, ScheduledJob, ID};
use carepush_infra::CarePushContext;

pub async fn create_notification_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<CarePushContext>,
) -> Result<HttpResponse, CarePushError> {
    let user_id = protect_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = CreateNotificationUseCase {
        user_id,
        title: body.title,
        body: body.body,
        deep_link: body.deep_link,
        send_at: body.send_at,
    };

    execute(usecase, &ctx)
        .await
        .map(|notification| HttpResponse::Ok().json(APIResponse::new(notification.id)))
        .map_err(CarePushError::from)
}

#[derive(Debug)]
pub struct CreateNotificationUseCase {
    pub user_id: ID,
    pub title: String,
    pub body: String,
    pub deep_link: Option<String>,
    /// KST civil time string, validated against the minimum lead time
    pub send_at: String,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    EmptyTitle,
    InvalidSendAt(String),
    SendAtTooSoon(String),
    StorageError,
}

impl From<UseCaseError> for CarePushError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyTitle => Self::BadClientData("Title cannot be empty".into()),
            UseCaseError::InvalidSendAt(send_at) => Self::BadClientData(format!(
                "Invalid sendAt: {}, expected a KST datetime formatted like: 2025-03-01 08:00:00",
                send_at
            )),
            UseCaseError::SendAtTooSoon(send_at) => Self::BadClientData(format!(
                "sendAt: {} must be at least 30 seconds in the future",
                send_at
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateNotificationUseCase {
    type Response = Notification;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateNotification";

    async fn execute(&mut self, ctx: &CarePushContext) -> Result<Self::Response, Self::Error> {
        if self.title.trim().is_empty() {
            return Err(UseCaseError::EmptyTitle);
        }

        let target = kst::parse_kst_string(&self.send_at)
            .map_err(|_| UseCaseError::InvalidSendAt(self.send_at.clone()))?;

        let now = ctx.sys.get_timestamp_millis();
        if target < now + ctx.config.min_lead_time_millis {
            return Err(UseCaseError::SendAtTooSoon(self.send_at.clone()));
        }

        let notification = Notification {
            id: Default::default(),
            user_id: self.user_id.clone(),
            title: self.title.clone(),
            body: self.body.clone(),
            deep_link: self.deep_link.clone(),
            send_at: self.send_at.clone(),
            sent: false,
            created: now,
        };
        ctx.repos
            .notifications
            .insert(&notification)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let job = ScheduledJob::new(
            notification.id.clone(),
            target,
            ctx.config.job_max_attempts,
            ctx.config.job_backoff_base_millis,
        );
        ctx.repos
            .job_queue
            .enqueue(&job)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(notification)
    }
}
