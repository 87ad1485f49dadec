use crate::error::CarePushError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use carepush_api_structs::register_device_token::*;
use carepush_domain::{DeviceToken, ID};
use carepush_infra::CarePushContext;

pub async fn register_device_token_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<CarePushContext>,
) -> Result<HttpResponse, CarePushError> {
    let user_id = protect_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = RegisterDeviceTokenUseCase {
        user_id,
        token: body.token,
        platform: body.platform,
        timezone: body.timezone,
    };

    execute(usecase, &ctx)
        .await
        .map(|_| HttpResponse::Ok().json(APIResponse::new()))
        .map_err(CarePushError::from)
}

#[derive(Debug)]
pub struct RegisterDeviceTokenUseCase {
    pub user_id: ID,
    pub token: String,
    pub platform: String,
    pub timezone: String,
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
impl UseCase for RegisterDeviceTokenUseCase {
    type Response = DeviceToken;

    type Error = UseCaseError;

    const NAME: &'static str = "RegisterDeviceToken";

    async fn execute(&mut self, ctx: &CarePushContext) -> Result<Self::Response, Self::Error> {
        let device_token = DeviceToken {
            user_id: self.user_id.clone(),
            token: self.token.clone(),
            platform: self.platform.clone(),
            timezone: self.timezone.clone(),
            registered_at: ctx.sys.get_timestamp_millis(),
        };
        ctx.repos
            .device_tokens
            .register(&device_token)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(device_token)
    }
}
