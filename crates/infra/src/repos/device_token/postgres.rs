use super::IDeviceTokenRepo;
use crate::repos::shared::repo::DeleteResult;

use carepush_domain::{DeviceToken, PushDeliveryReport, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresDeviceTokenRepo {
    pool: PgPool,
}

impl PostgresDeviceTokenRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DeviceTokenRaw {
    user_uid: Uuid,
    token: String,
    platform: String,
    timezone: String,
    registered_at: i64,
}

impl From<DeviceTokenRaw> for DeviceToken {
    fn from(raw: DeviceTokenRaw) -> Self {
        Self {
            user_id: raw.user_uid.into(),
            token: raw.token,
            platform: raw.platform,
            timezone: raw.timezone,
            registered_at: raw.registered_at,
        }
    }
}

#[async_trait::async_trait]
impl IDeviceTokenRepo for PostgresDeviceTokenRepo {
    async fn register(&self, device_token: &DeviceToken) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO device_tokens
            (user_uid, token, platform, timezone, registered_at)
            VALUES($1, $2, $3, $4, $5)
            ON CONFLICT (user_uid, token) DO UPDATE
            SET platform = $3,
                timezone = $4,
                registered_at = $5
            "#,
        )
        .bind(device_token.user_id.inner_ref())
        .bind(&device_token.token)
        .bind(&device_token.platform)
        .bind(&device_token.timezone)
        .bind(device_token.registered_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<DeviceToken> {
        sqlx::query_as::<_, DeviceTokenRaw>(
            r#"
            SELECT * FROM device_tokens
            WHERE user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.into())
        .collect()
    }

    async fn delete(&self, user_id: &ID, token: &str) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM device_tokens
            WHERE user_uid = $1 AND token = $2
            "#,
        )
        .bind(user_id.inner_ref())
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }

    async fn handle_delivery_report(
        &self,
        user_id: &ID,
        report: &PushDeliveryReport,
    ) -> anyhow::Result<()> {
        let unregistered = report
            .unregistered_tokens()
            .into_iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>();
        if unregistered.is_empty() {
            return Ok(());
        }
        sqlx::query(
            r#"
            DELETE FROM device_tokens
            WHERE user_uid = $1 AND token = ANY($2)
            "#,
        )
        .bind(user_id.inner_ref())
        .bind(&unregistered)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
