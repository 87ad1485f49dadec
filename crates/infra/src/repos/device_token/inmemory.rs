use super::IDeviceTokenRepo;
use crate::repos::shared::repo::DeleteResult;
use carepush_domain::{DeviceToken, PushDeliveryReport, ID};
use std::sync::Mutex;

pub struct InMemoryDeviceTokenRepo {
    device_tokens: Mutex<Vec<DeviceToken>>,
}

impl InMemoryDeviceTokenRepo {
    pub fn new() -> Self {
        Self {
            device_tokens: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IDeviceTokenRepo for InMemoryDeviceTokenRepo {
    async fn register(&self, device_token: &DeviceToken) -> anyhow::Result<()> {
        let mut device_tokens = self.device_tokens.lock().unwrap();
        device_tokens
            .retain(|t| !(t.user_id == device_token.user_id && t.token == device_token.token));
        device_tokens.push(device_token.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<DeviceToken> {
        let device_tokens = self.device_tokens.lock().unwrap();
        device_tokens
            .iter()
            .filter(|t| t.user_id == *user_id)
            .cloned()
            .collect()
    }

    async fn delete(&self, user_id: &ID, token: &str) -> anyhow::Result<DeleteResult> {
        let mut device_tokens = self.device_tokens.lock().unwrap();
        let before = device_tokens.len();
        device_tokens.retain(|t| !(t.user_id == *user_id && t.token == token));
        Ok(DeleteResult {
            deleted_count: (before - device_tokens.len()) as i64,
        })
    }

    async fn handle_delivery_report(
        &self,
        user_id: &ID,
        report: &PushDeliveryReport,
    ) -> anyhow::Result<()> {
        let unregistered = report.unregistered_tokens();
        if unregistered.is_empty() {
            return Ok(());
        }
        let mut device_tokens = self.device_tokens.lock().unwrap();
        device_tokens
            .retain(|t| !(t.user_id == *user_id && unregistered.contains(&t.token.as_str())));
        Ok(())
    }
}
