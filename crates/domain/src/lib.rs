mod device_token;
pub mod kst;
mod notification;
mod push;
mod scheduled_job;
mod shared;

pub use device_token::DeviceToken;
pub use notification::Notification;
pub use push::{PushDeliveryReport, PushMessage, TokenDeliveryOutcome};
pub use scheduled_job::{JobStatus, ScheduledJob, JOB_KEY_PREFIX};
pub use shared::entity::{Entity, ID};
