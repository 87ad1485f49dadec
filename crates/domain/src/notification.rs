use crate::shared::entity::{Entity, ID};

/// A `Notification` is a push message scheduled for a single user, for
/// example a medication reminder entered by a caregiver.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: ID,
    /// The user whose registered devices receive the push
    pub user_id: ID,
    pub title: String,
    pub body: String,
    /// Optional app route opened when the notification is tapped
    pub deep_link: Option<String>,
    /// Target send time as a KST civil time string, seconds precision.
    /// Immutable once `sent` is true.
    pub send_at: String,
    /// Set by the delivery worker after a successful dispatch. Guards
    /// against duplicate delivery when a job is redelivered.
    pub sent: bool,
    /// Creation timestamp in UTC millis
    pub created: i64,
}

impl Entity<ID> for Notification {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
