//! Specifier backed by the Anthropic Messages API.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    ConfigurationError, GeneratedArtifact, GenerationClient, GenerationContext, GenerationFailure,
    GenerationRole,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{build_client, send_json};
use crate::prompts::specifier_user_message;

/// Anthropic adapter configuration.
#[derive(Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub version: String,
    pub timeout: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.anthropic.com/v1".to_string(),
            model: "claude-3-5-sonnet-latest".to_string(),
            max_tokens: 1200,
            version: "2023-06-01".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("version", &self.version)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Drafts the specification from the raw requirement prompt.
#[derive(Debug)]
pub struct AnthropicSpecifier {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicSpecifier {
    /// Creates the adapter. The API key is required.
    pub fn new(config: AnthropicConfig) -> Result<Self, ConfigurationError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigurationError::new("Anthropic API key is required"));
        }

        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl GenerationClient for AnthropicSpecifier {
    fn role(&self) -> GenerationRole {
        GenerationRole::Specifier
    }

    async fn generate(
        &self,
        context: GenerationContext<'_>,
    ) -> Result<GeneratedArtifact, GenerationFailure> {
        let content = specifier_user_message(context.input);
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![MessagesMessage {
                role: "user",
                content: &content,
            }],
        };

        debug!(model = %self.config.model, "Calling Anthropic messages API");
        let response: MessagesResponse = send_json(
            self.client
                .post(format!("{}/messages", self.config.base_url))
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", &self.config.version)
                .json(&request),
        )
        .await
        .map_err(|e| GenerationFailure::new(GenerationRole::Specifier, e))?;

        Ok(GeneratedArtifact::new(response.into_text()))
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<MessagesMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct MessagesMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Text of the first `text` block, or `""` if there is none.
    fn into_text(self) -> String {
        self.content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .unwrap_or_default()
    }
}
