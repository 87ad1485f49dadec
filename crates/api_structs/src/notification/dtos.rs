use carepush_domain::{Notification, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDTO {
    pub id: ID,
    pub user_id: ID,
    pub title: String,
    pub body: String,
    pub deep_link: Option<String>,
    /// KST civil time string, `"YYYY-MM-DD HH:mm:ss"` — deliberately not
    /// ISO-8601 UTC
    pub send_at: String,
    pub sent: bool,
    pub created: i64,
}

impl NotificationDTO {
    pub fn new(notification: Notification) -> Self {
        Self {
            id: notification.id,
            user_id: notification.user_id,
            title: notification.title,
            body: notification.body,
            deep_link: notification.deep_link,
            send_at: notification.send_at,
            sent: notification.sent,
            created: notification.created,
        }
    }
}
