use super::INotificationRepo;
use crate::repos::shared::inmemory_repo::*;
use carepush_domain::{Entity, Notification, ID};

pub struct InMemoryNotificationRepo {
    notifications: std::sync::Mutex<Vec<Notification>>,
}

impl InMemoryNotificationRepo {
    pub fn new() -> Self {
        Self {
            notifications: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl INotificationRepo for InMemoryNotificationRepo {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        insert(notification, &self.notifications);
        Ok(())
    }

    async fn save(&self, notification: &Notification) -> anyhow::Result<()> {
        save(notification, &self.notifications);
        Ok(())
    }

    async fn find(&self, notification_id: &ID) -> Option<Notification> {
        find(notification_id, &self.notifications)
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Notification> {
        let mut notifications = find_by(&self.notifications, |n| n.user_id == *user_id);
        notifications.sort_by(|a, b| a.id().cmp(&b.id()));
        notifications
    }

    async fn delete(&self, notification_id: &ID) -> Option<Notification> {
        delete(notification_id, &self.notifications)
    }
}
