use serde::{Deserialize, Serialize};

pub mod register_device_token {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub token: String,
        pub platform: String,
        pub timezone: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub success: bool,
    }

    impl APIResponse {
        pub fn new() -> Self {
            Self { success: true }
        }
    }

    impl Default for APIResponse {
        fn default() -> Self {
            Self::new()
        }
    }
}
