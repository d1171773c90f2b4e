//! Designer backed by the OpenAI Chat Completions API.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    ConfigurationError, GeneratedArtifact, GenerationClient, GenerationContext, GenerationFailure,
    GenerationRole,
};
use reqwest::Client;
use tracing::debug;

use crate::chat::{ChatMessage, ChatRequest, ChatResponse};
use crate::http::{build_client, send_json};
use crate::prompts::DESIGNER_SYSTEM;

/// OpenAI adapter configuration.
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Derives the design (ER diagram, API definitions) from the specification.
#[derive(Debug)]
pub struct OpenAiDesigner {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiDesigner {
    /// Creates the adapter. The API key is required.
    pub fn new(config: OpenAiConfig) -> Result<Self, ConfigurationError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigurationError::new("OpenAI API key is required"));
        }

        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl GenerationClient for OpenAiDesigner {
    fn role(&self) -> GenerationRole {
        GenerationRole::Designer
    }

    async fn generate(
        &self,
        context: GenerationContext<'_>,
    ) -> Result<GeneratedArtifact, GenerationFailure> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage::system(DESIGNER_SYSTEM),
                ChatMessage::user(context.input),
            ],
        };

        debug!(model = %self.config.model, "Calling OpenAI chat completions API");
        let response: ChatResponse = send_json(
            self.client
                .post(format!("{}/chat/completions", self.config.base_url))
                .bearer_auth(&self.config.api_key)
                .json(&request),
        )
        .await
        .map_err(|e| GenerationFailure::new(GenerationRole::Designer, e))?;

        Ok(GeneratedArtifact::new(response.into_text()))
    }
}
