//! Researcher backed by Perplexity's OpenAI-compatible chat API.
//!
//! The only role allowed to run without a credential: when unconfigured it
//! returns [`RESEARCH_UNAVAILABLE`] without any network call.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    ConfigurationError, GeneratedArtifact, GenerationClient, GenerationContext, GenerationFailure,
    GenerationRole,
};
use reqwest::Client;
use tracing::{debug, warn};

use crate::chat::{ChatMessage, ChatRequest, ChatResponse};
use crate::http::{build_client, send_json};
use crate::prompts::{researcher_user_message, RESEARCHER_SYSTEM, RESEARCH_UNAVAILABLE};
use crate::Credential;

/// Perplexity adapter configuration.
#[derive(Debug, Clone)]
pub struct PerplexityConfig {
    pub credential: Credential,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for PerplexityConfig {
    fn default() -> Self {
        Self {
            credential: Credential::Unconfigured,
            base_url: "https://api.perplexity.ai".to_string(),
            model: "pplx-70b-online".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

struct Connection {
    api_key: String,
    client: Client,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("api_key", &"***")
            .finish_non_exhaustive()
    }
}

/// Gathers background research for the specification.
#[derive(Debug)]
pub struct PerplexityResearcher {
    connection: Option<Connection>,
    base_url: String,
    model: String,
}

impl PerplexityResearcher {
    /// Creates the adapter. Never fails for a missing key; only for an HTTP
    /// client that cannot be built.
    pub fn new(config: PerplexityConfig) -> Result<Self, ConfigurationError> {
        let connection = match config.credential {
            Credential::Configured(api_key) => Some(Connection {
                api_key,
                client: build_client(config.timeout)?,
            }),
            Credential::Unconfigured => {
                warn!("Perplexity API key not set; research will be skipped");
                None
            }
        };

        Ok(Self {
            connection,
            base_url: config.base_url,
            model: config.model,
        })
    }

    /// `true` if calls go out to the service.
    pub fn is_configured(&self) -> bool {
        self.connection.is_some()
    }
}

#[async_trait]
impl GenerationClient for PerplexityResearcher {
    fn role(&self) -> GenerationRole {
        GenerationRole::Researcher
    }

    async fn generate(
        &self,
        context: GenerationContext<'_>,
    ) -> Result<GeneratedArtifact, GenerationFailure> {
        let Some(connection) = &self.connection else {
            debug!("Skipping research: Perplexity API key not set");
            return Ok(GeneratedArtifact::new(RESEARCH_UNAVAILABLE));
        };

        let user = researcher_user_message(context.title, context.input);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::system(RESEARCHER_SYSTEM), ChatMessage::user(&user)],
        };

        debug!(model = %self.model, "Calling Perplexity chat completions API");
        let response: ChatResponse = send_json(
            connection
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&connection.api_key)
                .json(&request),
        )
        .await
        .map_err(|e| GenerationFailure::new(GenerationRole::Researcher, e))?;

        Ok(GeneratedArtifact::new(response.into_text()))
    }
}
