use super::IPushService;
use carepush_domain::{PushDeliveryReport, PushMessage, TokenDeliveryOutcome};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Provider error codes that mean the token is gone for good and should be
/// pruned rather than retried
const UNREGISTERED_ERRORS: [&str; 3] = ["NotRegistered", "InvalidRegistration", "MismatchSenderId"];

pub struct FcmPushService {
    client: Client,
    endpoint: String,
    server_key: String,
}

impl FcmPushService {
    pub fn new(endpoint: String, server_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            server_key,
        }
    }
}

#[derive(Debug, Serialize)]
struct FcmMulticastRequest<'a> {
    registration_ids: &'a [String],
    notification: FcmNotification<'a>,
    data: FcmData<'a>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct FcmData<'a> {
    #[serde(rename = "deepLink")]
    deep_link: &'a str,
}

#[derive(Debug, Deserialize)]
struct FcmMulticastResponse {
    success: usize,
    failure: usize,
    results: Vec<FcmSendResult>,
}

#[derive(Debug, Deserialize)]
struct FcmSendResult {
    #[serde(default)]
    error: Option<String>,
}

#[async_trait::async_trait]
impl IPushService for FcmPushService {
    async fn send_multicast(&self, message: &PushMessage) -> anyhow::Result<PushDeliveryReport> {
        let request = FcmMulticastRequest {
            registration_ids: &message.tokens,
            notification: FcmNotification {
                title: &message.title,
                body: &message.body,
            },
            data: FcmData {
                deep_link: &message.deep_link,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<FcmMulticastResponse>()
            .await?;

        if response.failure > 0 {
            warn!(
                "Push provider rejected {} of {} tokens",
                response.failure,
                message.tokens.len()
            );
        }

        let outcomes = message
            .tokens
            .iter()
            .zip(response.results.iter())
            .map(|(token, result)| TokenDeliveryOutcome {
                token: token.clone(),
                delivered: result.error.is_none(),
                unregistered: result
                    .error
                    .as_deref()
                    .map(|e| UNREGISTERED_ERRORS.contains(&e))
                    .unwrap_or(false),
                error: result.error.clone(),
            })
            .collect();

        Ok(PushDeliveryReport {
            success_count: response.success,
            failure_count: response.failure,
            outcomes,
        })
    }
}
