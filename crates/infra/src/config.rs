use carepush_utils::create_random_secret;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Secret used to verify API bearer tokens
    pub api_secret: String,
    /// HTTP endpoint of the push provider's multicast send API
    pub fcm_endpoint: String,
    /// Server key presented to the push provider
    pub fcm_server_key: String,
    /// Minimum lead time in millis between "now" and a new notification's
    /// send time
    pub min_lead_time_millis: i64,
    /// Clock-skew tolerance in millis when the delivery worker re-validates
    /// that a claimed job is actually due
    pub skew_tolerance_millis: i64,
    /// Number of concurrently executing delivery handlers
    pub delivery_concurrency: usize,
    /// Delivery attempts allowed per job before it is marked failed
    pub job_max_attempts: i64,
    /// Base delay in millis for the exponential retry backoff, doubling
    /// each attempt
    pub job_backoff_base_millis: i64,
}

impl Config {
    pub fn new() -> Self {
        let api_secret = match std::env::var("API_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                info!("Did not find API_SECRET environment variable. Going to create one.");
                let secret = create_random_secret(32);
                info!("API secret was generated and set to: {}", secret);
                secret
            }
        };
        let fcm_server_key = match std::env::var("FCM_SERVER_KEY") {
            Ok(key) => key,
            Err(_) => {
                warn!("Did not find FCM_SERVER_KEY environment variable. Push delivery will be rejected by the provider until it is set.");
                String::new()
            }
        };
        let fcm_endpoint = std::env::var("FCM_ENDPOINT")
            .unwrap_or_else(|_| "https://fcm.googleapis.com/fcm/send".into());
        let default_port = "3000";
        let port = std::env::var("PORT").unwrap_or(default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };
        Self {
            port,
            api_secret,
            fcm_endpoint,
            fcm_server_key,
            min_lead_time_millis: 1000 * 30, // 30 seconds
            skew_tolerance_millis: 2000,
            delivery_concurrency: 5,
            job_max_attempts: 5,
            job_backoff_base_millis: 3000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
