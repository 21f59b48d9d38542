pub mod ollama;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use super::LlmConfig;
use self::ollama::OllamaClient;

#[derive(Debug, Error)]
pub enum ChatError {
    /// The runtime answered with something other than 200 OK.
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("{0}")]
    Connection(#[source] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("response contained no choices")]
    EmptyChoices,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ChatError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Arc<dyn ChatClient> {
    Arc::new(OllamaClient::from_config(config))
}

/// Turns the outcome of a completion into the text shown in the chat window.
/// Failures never reach the browser as errors, only as an inline message.
pub fn reply_for(result: Result<String, ChatError>) -> String {
    match result {
        Ok(reply) => reply,
        Err(ChatError::Status(code)) => format!("(Ollama error: {})", code),
        Err(e) => format!("(Ollama connection error: {})", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_passes_text_through() {
        assert_eq!(reply_for(Ok("hi there".to_string())), "hi there");
    }

    #[test]
    fn reply_reports_status_code() {
        assert_eq!(reply_for(Err(ChatError::Status(503))), "(Ollama error: 503)");
    }

    #[test]
    fn reply_reports_missing_choices_as_connection_error() {
        assert_eq!(
            reply_for(Err(ChatError::EmptyChoices)),
            "(Ollama connection error: response contained no choices)"
        );
    }
}
