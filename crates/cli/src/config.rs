//! Startup configuration.
//!
//! Every value is read once, before any run is accepted. Blank values count as
//! missing. The Researcher credential is the only optional secret; its absence
//! is resolved here into [`Credential::Unconfigured`].

use llm::{AnthropicConfig, Credential, OpenAiConfig, PerplexityConfig};
use notion::{NotionConfig, NotionTokens};
use pipeline::{CollectionId, ConfigurationError};
use serde::Serialize;

pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const PERPLEXITY_API_KEY: &str = "PERPLEXITY_API_KEY";
pub const NOTION_TOKENS_JSON: &str = "NOTION_TOKENS_JSON";
pub const NOTION_TOKEN_KEY: &str = "NOTION_TOKEN_KEY";
pub const NOTION_TASK_DB_ID: &str = "NOTION_TASK_DB_ID";
pub const NOTION_INPUT_DB_ID: &str = "NOTION_INPUT_DB_ID";
pub const ANTHROPIC_MODEL: &str = "ANTHROPIC_MODEL";
pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const PERPLEXITY_MODEL: &str = "PERPLEXITY_MODEL";

/// Integration whose Notion token the record store uses by default.
pub const DEFAULT_NOTION_INTEGRATION: &str = "claude";

/// Fully resolved configuration for every adapter.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub anthropic: AnthropicConfig,
    pub openai: OpenAiConfig,
    pub perplexity: PerplexityConfig,
    pub notion: NotionConfig,
    pub notion_integration: String,
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads values through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| value(name).ok_or_else(|| ConfigurationError::missing(name));
        let collection = |name: &str| {
            required(name).and_then(|id| {
                CollectionId::new(id).ok_or_else(|| ConfigurationError::missing(name))
            })
        };

        let mut anthropic = AnthropicConfig {
            api_key: required(ANTHROPIC_API_KEY)?,
            ..Default::default()
        };
        if let Some(model) = value(ANTHROPIC_MODEL) {
            anthropic.model = model;
        }

        let mut openai = OpenAiConfig {
            api_key: required(OPENAI_API_KEY)?,
            ..Default::default()
        };
        if let Some(model) = value(OPENAI_MODEL) {
            openai.model = model;
        }

        let mut perplexity = PerplexityConfig {
            credential: Credential::from_value(value(PERPLEXITY_API_KEY)),
            ..Default::default()
        };
        if let Some(model) = value(PERPLEXITY_MODEL) {
            perplexity.model = model;
        }

        let tokens = NotionTokens::parse(&required(NOTION_TOKENS_JSON)?)?;
        let notion_integration =
            value(NOTION_TOKEN_KEY).unwrap_or_else(|| DEFAULT_NOTION_INTEGRATION.to_string());
        let notion = NotionConfig::new(
            tokens.select(&notion_integration)?,
            collection(NOTION_TASK_DB_ID)?,
            collection(NOTION_INPUT_DB_ID)?,
        );

        Ok(Self {
            anthropic,
            openai,
            perplexity,
            notion,
            notion_integration,
        })
    }

    /// A printable view with every secret removed.
    pub fn redacted(&self) -> RedactedConfig<'_> {
        RedactedConfig {
            specifier: ProviderView {
                base_url: &self.anthropic.base_url,
                model: &self.anthropic.model,
                credential: "configured",
            },
            designer: ProviderView {
                base_url: &self.openai.base_url,
                model: &self.openai.model,
                credential: "configured",
            },
            researcher: ProviderView {
                base_url: &self.perplexity.base_url,
                model: &self.perplexity.model,
                credential: if self.perplexity.credential.is_configured() {
                    "configured"
                } else {
                    "unconfigured"
                },
            },
            notion: NotionView {
                base_url: &self.notion.base_url,
                version: &self.notion.version,
                integration: &self.notion_integration,
                task_database: self.notion.task_database.as_str(),
                source_database: self.notion.source_database.as_str(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedConfig<'a> {
    specifier: ProviderView<'a>,
    designer: ProviderView<'a>,
    researcher: ProviderView<'a>,
    notion: NotionView<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderView<'a> {
    base_url: &'a str,
    model: &'a str,
    credential: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotionView<'a> {
    base_url: &'a str,
    version: &'a str,
    integration: &'a str,
    task_database: &'a str,
    source_database: &'a str,
}
