use super::IPushService;
use carepush_domain::{PushDeliveryReport, PushMessage, TokenDeliveryOutcome};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Push service for tests: records every multicast instead of talking to a
/// provider. Clones share state, so a test can keep a handle while the
/// context owns another.
#[derive(Clone, Default)]
pub struct InMemoryPushService {
    sent: Arc<Mutex<Vec<PushMessage>>>,
    unregistered: Arc<Mutex<HashSet<String>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryPushService {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn sent_messages(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Makes every subsequent send fail as a whole, like a provider outage
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Marks a token so the provider reports it unregistered
    pub fn mark_unregistered(&self, token: &str) {
        self.unregistered.lock().unwrap().insert(token.to_string());
    }
}

#[async_trait::async_trait]
impl IPushService for InMemoryPushService {
    async fn send_multicast(&self, message: &PushMessage) -> anyhow::Result<PushDeliveryReport> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow::Error::msg("Push provider is unavailable"));
        }

        let unregistered = self.unregistered.lock().unwrap();
        let outcomes = message
            .tokens
            .iter()
            .map(|token| {
                let is_unregistered = unregistered.contains(token);
                TokenDeliveryOutcome {
                    token: token.clone(),
                    delivered: !is_unregistered,
                    unregistered: is_unregistered,
                    error: is_unregistered.then(|| "NotRegistered".to_string()),
                }
            })
            .collect::<Vec<_>>();

        let success_count = outcomes.iter().filter(|o| o.delivered).count();
        let failure_count = outcomes.len() - success_count;

        self.sent.lock().unwrap().push(message.clone());

        Ok(PushDeliveryReport {
            success_count,
            failure_count,
            outcomes,
        })
    }
}
