mod device_token;
mod job_queue;
mod notification;
mod shared;

use device_token::{InMemoryDeviceTokenRepo, PostgresDeviceTokenRepo};
pub use device_token::IDeviceTokenRepo;
use job_queue::{InMemoryJobQueue, PostgresJobQueue};
pub use job_queue::IJobQueue;
use notification::{InMemoryNotificationRepo, PostgresNotificationRepo};
pub use notification::INotificationRepo;
pub use shared::repo::DeleteResult;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub notifications: Arc<dyn INotificationRepo>,
    pub device_tokens: Arc<dyn IDeviceTokenRepo>,
    pub job_queue: Arc<dyn IJobQueue>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");
        Ok(Self {
            notifications: Arc::new(PostgresNotificationRepo::new(pool.clone())),
            device_tokens: Arc::new(PostgresDeviceTokenRepo::new(pool.clone())),
            job_queue: Arc::new(PostgresJobQueue::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            notifications: Arc::new(InMemoryNotificationRepo::new()),
            device_tokens: Arc::new(InMemoryDeviceTokenRepo::new()),
            job_queue: Arc::new(InMemoryJobQueue::new()),
        }
    }
}
