use crate::error::CarePushError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use carepush_api_structs::update_notification::*;
use carepush_domain::{kst, Notification, ScheduledJob, ID};
use carepush_infra::CarePushContext;

pub async fn update_notification_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<CarePushContext>,
) -> Result<HttpResponse, CarePushError> {
    let _user_id = protect_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = UpdateNotificationUseCase {
        notification_id: path_params.notification_id.clone(),
        title: body.title,
        body: body.body,
        send_at: body.send_at,
    };

    execute(usecase, &ctx)
        .await
        .map(|notification| HttpResponse::Ok().json(APIResponse::new(notification)))
        .map_err(CarePushError::from)
}

#[derive(Debug)]
pub struct UpdateNotificationUseCase {
    pub notification_id: ID,
    pub title: Option<String>,
    pub body: Option<String>,
    pub send_at: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    AlreadySent(ID),
    InvalidSendAt(String),
    SendAtNotInFuture(String),
    StorageError,
}

impl From<UseCaseError> for CarePushError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(notification_id) => Self::NotFound(format!(
                "The notification with id: {}, was not found.",
                notification_id
            )),
            UseCaseError::AlreadySent(notification_id) => Self::Conflict(format!(
                "The notification with id: {} was already sent and can no longer be changed.",
                notification_id
            )),
            UseCaseError::InvalidSendAt(send_at) => Self::BadClientData(format!(
                "Invalid sendAt: {}, expected a KST datetime formatted like: 2025-03-01 08:00:00",
                send_at
            )),
            UseCaseError::SendAtNotInFuture(send_at) => {
                Self::BadClientData(format!("sendAt: {} must be in the future", send_at))
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateNotificationUseCase {
    type Response = Notification;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateNotification";

    async fn execute(&mut self, ctx: &CarePushContext) -> Result<Self::Response, Self::Error> {
        let mut notification = match ctx.repos.notifications.find(&self.notification_id).await {
            Some(notification) => notification,
            None => return Err(UseCaseError::NotFound(self.notification_id.clone())),
        };
        if notification.sent {
            return Err(UseCaseError::AlreadySent(self.notification_id.clone()));
        }

        if let Some(title) = &self.title {
            notification.title = title.clone();
        }
        if let Some(body) = &self.body {
            notification.body = body.clone();
        }
        if let Some(send_at) = &self.send_at {
            let target = kst::parse_kst_string(send_at)
                .map_err(|_| UseCaseError::InvalidSendAt(send_at.clone()))?;
            if target <= ctx.sys.get_timestamp_millis() {
                return Err(UseCaseError::SendAtNotInFuture(send_at.clone()));
            }
            notification.send_at = send_at.clone();
        }

        let target = kst::parse_kst_string(&notification.send_at)
            .map_err(|_| UseCaseError::InvalidSendAt(notification.send_at.clone()))?;

        // Cancel-then-re-enqueue under the same key, also when sendAt did
        // not change: one code path, and the one-job-per-key invariant
        // holds either way.
        let key = ScheduledJob::key_for(&notification.id);
        ctx.repos
            .job_queue
            .cancel(&key)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        ctx.repos
            .notifications
            .save(&notification)
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
