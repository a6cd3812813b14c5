//! Answering service boundary
//!
//! `AnswerService` is the one seam between the pipeline and the remote
//! service. `HttpAnswerService` talks to a chat-completions endpoint.

use crate::config::Config;
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("realty-scout/", env!("CARGO_PKG_VERSION"));

/// Sends one prompt, returns the answer text
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn ask(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

/// Chat-completions client with bearer authentication
pub struct HttpAnswerService {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl HttpAnswerService {
    /// Build the client from configuration
    ///
    /// Fails if no API key is configured or the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ScoutError::Config("no API key configured (set PERPLEXITY_API_KEY)".to_string()))?
            .to_string();

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10).min(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl AnswerService for HttpAnswerService {
    async fn ask(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "Sending request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ScoutError::Transport(format!("HTTP {}: {}", status, text)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::MissingAnswer(format!("unreadable response body: {}", e)))?;

        extract_answer(parsed)
    }
}

fn extract_answer(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .map(|message| message.content.trim().to_string())
        .ok_or_else(|| ScoutError::MissingAnswer("no choices[0].message.content".to_string()))
}
