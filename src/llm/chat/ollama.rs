use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use serde::{ Deserialize, Serialize };
use std::time::Duration;

use super::{ ChatClient, ChatError };
use crate::llm::LlmConfig;

pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_MODEL: &str = "gemma3:1b";

/// Talks to the OpenAI-compatible endpoint Ollama exposes at `/v1/chat/completions`.
#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
    request_timeout: Option<Duration>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>) -> Self {
        let model = completion_model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = base_url.unwrap_or_else(|| DEFAULT_OLLAMA_URL.into());

        Self {
            http: HttpClient::new(),
            base_url: url.trim_end_matches('/').to_string(),
            completion_model: model,
            request_timeout: None,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        let mut client = Self::new(config.base_url.clone(), config.completion_model.clone());
        client.request_timeout = config.request_timeout;
        client
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, ChatError> {
        let url = self.completions_url();
        let req = ChatCompletionRequest {
            model: &self.completion_model,
            messages: vec![Message { role: "user", content: prompt }],
        };

        let mut builder = self.http.post(&url).header(CONTENT_TYPE, "application/json").json(&req);
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }

        debug!("POST {} ({} prompt bytes)", url, prompt.len());
        let resp = builder.send().await.map_err(ChatError::Connection)?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(ChatError::Status(status.as_u16()));
        }

        let data = resp.json::<ChatCompletionResponse>().await.map_err(ChatError::Decode)?;
        data.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ChatError::EmptyChoices)
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
