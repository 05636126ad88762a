use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use giftroute_core::config::LlmConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

/// Chat-completion seam. The generator only ever needs a message list in and
/// raw text out, which keeps test doubles trivial.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage], json: bool) -> Result<String>;
}

/// Client for an OpenAI-compatible `chat/completions` endpoint.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl OpenAiChatClient {
    /// Returns `None` when no API key is configured; the caller maps that to
    /// its own not-configured failure.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| anyhow!("failed to build LLM http client: {error}"))?;
        Ok(Some(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        }))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn chat(&self, messages: &[ChatMessage], json: bool) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            response_format: json.then_some(ResponseFormat { format_type: "json_object" }),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|error| anyhow!("LLM request failed: {error}"))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|error| anyhow!("LLM response body unreadable: {error}"))?;
        if !status.is_success() {
            return Err(anyhow!("LLM endpoint returned status {status}"));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|error| anyhow!("LLM response is not a chat completion: {error}"))?;

        let choice = parsed.choices.into_iter().next();
        if let Some(refusal) = choice.as_ref().and_then(|c| c.message.refusal.clone()) {
            return Err(anyhow!("LLM refused the request: {refusal}"));
        }
        let content = choice.and_then(|c| c.message.content).unwrap_or_default();
        if content.is_empty() {
            return Err(anyhow!("LLM returned an empty completion"));
        }
        Ok(content)
    }
}
