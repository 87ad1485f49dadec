mod inmemory;
mod postgres;

pub use inmemory::InMemoryNotificationRepo;
pub use postgres::PostgresNotificationRepo;

use carepush_domain::{Notification, ID};

#[async_trait::async_trait]
pub trait INotificationRepo: Send + Sync {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()>;
    async fn save(&self, notification: &Notification) -> anyhow::Result<()>;
    async fn find(&self, notification_id: &ID) -> Option<Notification>;
    /// All notifications for a user, ordered by id ascending. Ids are
    /// time-ordered so the listing is stable.
    async fn find_by_user(&self, user_id: &ID) -> Vec<Notification>;
    async fn delete(&self, notification_id: &ID) -> Option<Notification>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CarePushContext;
    use carepush_domain::Entity;

    fn notification(user_id: &ID, title: &str) -> Notification {
        Notification {
            id: Default::default(),
            user_id: user_id.clone(),
            title: title.into(),
            body: "body".into(),
            deep_link: None,
            send_at: "2025-08-10 15:20:54".into(),
            sent: false,
            created: 0,
        }
    }

    #[tokio::test]
    async fn crud_notification() {
        let ctx = CarePushContext::create_inmemory();
        let user_id = ID::new();

        let n = notification(&user_id, "Take medicine");
        ctx.repos.notifications.insert(&n).await.unwrap();
        assert_eq!(ctx.repos.notifications.find(&n.id).await, Some(n.clone()));

        let mut updated = n.clone();
        updated.title = "Take medicine at noon".into();
        updated.sent = true;
        ctx.repos.notifications.save(&updated).await.unwrap();
        assert_eq!(
            ctx.repos.notifications.find(&n.id).await,
            Some(updated.clone())
        );

        let deleted = ctx.repos.notifications.delete(&n.id).await;
        assert_eq!(deleted, Some(updated));
        assert!(ctx.repos.notifications.find(&n.id).await.is_none());
        // Deleting twice is not an error, just a miss
        assert!(ctx.repos.notifications.delete(&n.id).await.is_none());
    }

    #[tokio::test]
    async fn lists_only_the_users_notifications_in_id_order() {
        let ctx = CarePushContext::create_inmemory();
        let user_id = ID::new();
        let other_user_id = ID::new();

        let mut first = notification(&user_id, "first");
        first.id = "018f0000-0000-7000-8000-000000000001".parse().unwrap();
        let mut second = notification(&user_id, "second");
        second.id = "018f0000-0000-7000-8000-000000000002".parse().unwrap();
        let other = notification(&other_user_id, "other");
        for n in [&second, &other, &first] {
            ctx.repos.notifications.insert(n).await.unwrap();
        }

        let listed = ctx.repos.notifications.find_by_user(&user_id).await;
        assert_eq!(
            listed.iter().map(|n| n.id()).collect::<Vec<_>>(),
            vec![first.id(), second.id()]
        );
    }
}
