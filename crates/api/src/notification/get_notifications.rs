use crate::error::CarePushError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use carepush_api_structs::get_notifications::*;
use carepush_domain::{Notification, ID};
use carepush_infra::CarePushContext;

pub async fn get_notifications_controller(
    http_req: HttpRequest,
    ctx: web::Data<CarePushContext>,
) -> Result<HttpResponse, CarePushError> {
    let user_id = protect_route(&http_req, &ctx)?;

    let usecase = GetNotificationsUseCase { user_id };

    execute(usecase, &ctx)
        .await
        .map(|notifications| HttpResponse::Ok().json(APIResponse::new(notifications)))
        .map_err(CarePushError::from)
}

#[derive(Debug)]
pub struct GetNotificationsUseCase {
    pub user_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {}

impl From<UseCaseError> for CarePushError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetNotificationsUseCase {
    type Response = Vec<Notification>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetNotifications";

    async fn execute(&mut self, ctx: &CarePushContext) -> Result<Self::Response, Self::Error> {
        Ok(ctx.repos.notifications.find_by_user(&self.user_id).await)
    }
}
