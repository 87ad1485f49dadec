mod inmemory;
mod postgres;

pub use inmemory::InMemoryDeviceTokenRepo;
pub use postgres::PostgresDeviceTokenRepo;

use crate::repos::shared::repo::DeleteResult;
use carepush_domain::{DeviceToken, PushDeliveryReport, ID};

#[async_trait::async_trait]
pub trait IDeviceTokenRepo: Send + Sync {
    /// Registers a device token, replacing platform and timezone when the
    /// `(user_id, token)` pair is already known
    async fn register(&self, device_token: &DeviceToken) -> anyhow::Result<()>;
    async fn find_by_user(&self, user_id: &ID) -> Vec<DeviceToken>;
    async fn delete(&self, user_id: &ID, token: &str) -> anyhow::Result<DeleteResult>;
    /// Prunes the tokens a delivery report marked unregistered. The
    /// delivery worker only hands over the report; which tokens disappear
    /// is this store's decision.
    async fn handle_delivery_report(
        &self,
        user_id: &ID,
        report: &PushDeliveryReport,
    ) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CarePushContext;
    use carepush_domain::TokenDeliveryOutcome;

    fn device_token(user_id: &ID, token: &str) -> DeviceToken {
        DeviceToken {
            user_id: user_id.clone(),
            token: token.into(),
            platform: "ios".into(),
            timezone: "Asia/Seoul".into(),
            registered_at: 0,
        }
    }

    #[tokio::test]
    async fn register_is_an_upsert() {
        let ctx = CarePushContext::create_inmemory();
        let user_id = ID::new();

        let token = device_token(&user_id, "token-1");
        ctx.repos.device_tokens.register(&token).await.unwrap();

        let mut replaced = token.clone();
        replaced.platform = "android".into();
        ctx.repos.device_tokens.register(&replaced).await.unwrap();

        let tokens = ctx.repos.device_tokens.find_by_user(&user_id).await;
        assert_eq!(tokens, vec![replaced]);
    }

    #[tokio::test]
    async fn finds_only_the_users_tokens() {
        let ctx = CarePushContext::create_inmemory();
        let user_id = ID::new();
        let other_user_id = ID::new();

        ctx.repos
            .device_tokens
            .register(&device_token(&user_id, "token-1"))
            .await
            .unwrap();
        ctx.repos
            .device_tokens
            .register(&device_token(&other_user_id, "token-2"))
            .await
            .unwrap();

        let tokens = ctx.repos.device_tokens.find_by_user(&user_id).await;
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, "token-1");
    }

    #[tokio::test]
    async fn prunes_unregistered_tokens_from_delivery_report() {
        let ctx = CarePushContext::create_inmemory();
        let user_id = ID::new();

        ctx.repos
            .device_tokens
            .register(&device_token(&user_id, "stale"))
            .await
            .unwrap();
        ctx.repos
            .device_tokens
            .register(&device_token(&user_id, "active"))
            .await
            .unwrap();

        let report = PushDeliveryReport {
            success_count: 1,
            failure_count: 1,
            outcomes: vec![
                TokenDeliveryOutcome {
                    token: "stale".into(),
                    delivered: false,
                    unregistered: true,
                    error: Some("NotRegistered".into()),
                },
                TokenDeliveryOutcome {
                    token: "active".into(),
                    delivered: true,
                    unregistered: false,
                    error: None,
                },
            ],
        };
        ctx.repos
            .device_tokens
            .handle_delivery_report(&user_id, &report)
            .await
            .unwrap();

        let tokens = ctx.repos.device_tokens.find_by_user(&user_id).await;
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, "active");
    }
}
