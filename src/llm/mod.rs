pub mod chat;

use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub base_url: Option<String>,
    pub completion_model: Option<String>,
    pub request_timeout: Option<Duration>,
}
