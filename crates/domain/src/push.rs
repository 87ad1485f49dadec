/// One logical notification fanned out to all of a user's registered device
/// tokens in a single provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub deep_link: String,
    pub tokens: Vec<String>,
}

/// Outcome of a multicast dispatch for a single token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDeliveryOutcome {
    pub token: String,
    pub delivered: bool,
    /// The provider reported the token as no longer valid. The token store
    /// prunes these when handed the report.
    pub unregistered: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PushDeliveryReport {
    pub success_count: usize,
    pub failure_count: usize,
    pub outcomes: Vec<TokenDeliveryOutcome>,
}

impl PushDeliveryReport {
    /// Tokens the provider rejected as unregistered or invalid
    pub fn unregistered_tokens(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.unregistered)
            .map(|o| o.token.as_str())
            .collect()
    }
}
