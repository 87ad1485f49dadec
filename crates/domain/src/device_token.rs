use crate::shared::entity::ID;

/// A push-capable device registered by a user, identified by
/// `(user_id, token)`. Platform and timezone are opaque to the scheduler;
/// they are stored for the push provider and operator tooling.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceToken {
    pub user_id: ID,
    pub token: String,
    pub platform: String,
    pub timezone: String,
    /// Registration timestamp in UTC millis
    pub registered_at: i64,
}
