use super::INotificationRepo;

use carepush_domain::{Notification, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRaw {
    notification_uid: Uuid,
    user_uid: Uuid,
    title: String,
    body: String,
    deep_link: Option<String>,
    send_at: String,
    sent: bool,
    created: i64,
}

impl From<NotificationRaw> for Notification {
    fn from(raw: NotificationRaw) -> Self {
        Self {
            id: raw.notification_uid.into(),
            user_id: raw.user_uid.into(),
            title: raw.title,
            body: raw.body,
            deep_link: raw.deep_link,
            send_at: raw.send_at,
            sent: raw.sent,
            created: raw.created,
        }
    }
}

#[async_trait::async_trait]
impl INotificationRepo for PostgresNotificationRepo {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications
            (notification_uid, user_uid, title, body, deep_link, send_at, sent, created)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(notification.id.inner_ref())
        .bind(notification.user_id.inner_ref())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(&notification.deep_link)
        .bind(&notification.send_at)
        .bind(notification.sent)
        .bind(notification.created)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, notification: &Notification) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET title = $2,
                body = $3,
                deep_link = $4,
                send_at = $5,
                sent = $6
            WHERE notification_uid = $1
            "#,
        )
        .bind(notification.id.inner_ref())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(&notification.deep_link)
        .bind(&notification.send_at)
        .bind(notification.sent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, notification_id: &ID) -> Option<Notification> {
        match sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications
            WHERE notification_uid = $1
            "#,
        )
        .bind(notification_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        {
            Ok(notification) => notification.map(|n| n.into()),
            Err(e) => {
                error!("Find notification query failed: {:?}", e);
                None
            }
        }
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Notification> {
        sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications
            WHERE user_uid = $1
            ORDER BY notification_uid ASC
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|n| n.into())
        .collect()
    }

    async fn delete(&self, notification_id: &ID) -> Option<Notification> {
        match sqlx::query_as::<_, NotificationRaw>(
            r#"
            DELETE FROM notifications
            WHERE notification_uid = $1
            RETURNING *
            "#,
        )
        .bind(notification_id.inner_ref())
        .fetch_one(&self.pool)
        .await
        {
            Ok(notification) => Some(notification.into()),
            Err(_) => None,
        }
    }
}
