use crate::dtos::NotificationDTO;
use carepush_domain::ID;
use serde::{Deserialize, Serialize};

pub mod create_notification {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub title: String,
        pub body: String,
        /// KST civil time string, `"YYYY-MM-DD HH:mm:ss"`
        pub send_at: String,
        pub deep_link: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub id: ID,
    }

    impl APIResponse {
        pub fn new(id: ID) -> Self {
            Self { id }
        }
    }
}

pub mod get_notifications {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub notifications: Vec<NotificationDTO>,
    }

    impl APIResponse {
        pub fn new(notifications: Vec<carepush_domain::Notification>) -> Self {
            Self {
                notifications: notifications.into_iter().map(NotificationDTO::new).collect(),
            }
        }
    }
}

pub mod update_notification {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub notification_id: ID,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub title: Option<String>,
        pub body: Option<String>,
        pub send_at: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub id: ID,
        pub title: String,
        pub body: String,
        pub send_at: String,
    }

    impl APIResponse {
        pub fn new(notification: carepush_domain::Notification) -> Self {
            Self {
                id: notification.id,
                title: notification.title,
                body: notification.body,
                send_at: notification.send_at,
            }
        }
    }
}

pub mod delete_notification {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub notification_id: ID,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub success: bool,
    }

    impl APIResponse {
        pub fn new() -> Self {
            Self { success: true }
        }
    }

    impl Default for APIResponse {
        fn default() -> Self {
            Self::new()
        }
    }
}
