mod fcm;
mod inmemory;

pub use fcm::FcmPushService;
pub use inmemory::InMemoryPushService;

use carepush_domain::{PushDeliveryReport, PushMessage};

/// Multicast push delivery capability. Production talks to the push
/// provider over HTTP; tests record messages in memory.
#[async_trait::async_trait]
pub trait IPushService: Send + Sync {
    /// Sends `message` to all of its tokens in one provider call.
    ///
    /// `Err` means the transport or provider failed as a whole and the send
    /// may be retried. Per-token failures do not fail the call; they are
    /// reported in the returned report.
    async fn send_multicast(&self, message: &PushMessage) -> anyhow::Result<PushDeliveryReport>;
}
