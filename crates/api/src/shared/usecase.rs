use carepush_infra::CarePushContext;
use std::fmt::Debug;
use tracing::error;

#[async_trait::async_trait(?Send)]
pub trait UseCase: Debug {
    type Response;
    type Error;

    /// UseCase name to be used in logging
    const NAME: &'static str;

    async fn execute(&mut self, ctx: &CarePushContext) -> Result<Self::Response, Self::Error>;
}

#[tracing::instrument(name = "Executing usecase", skip(usecase, ctx))]
pub async fn execute<U>(mut usecase: U, ctx: &CarePushContext) -> Result<U::Response, U::Error>
where
    U: UseCase,
    U::Error: Debug,
{
    let res = usecase.execute(ctx).await;

    if let Err(e) = &res {
        error!("Use case: {} error: {:?}", U::NAME, e);
    }

    res
}
