//! Notion adapter configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use pipeline::{CollectionId, ConfigurationError};
use serde::Deserialize;

/// Integration tokens keyed by integration name.
///
/// Deployed as a JSON object, e.g.
/// `{"claude": "secret_a", "chatgpt": "secret_b", "perplexity": "secret_c"}`.
/// Each integration is shared with the databases it writes to; the record store
/// uses one of them.
#[derive(Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct NotionTokens(BTreeMap<String, String>);

impl NotionTokens {
    /// Parses the JSON token map.
    pub fn parse(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json)
            .map_err(|e| ConfigurationError::new(format!("Notion token map is not valid JSON: {e}")))
    }

    /// Returns the token for `integration`.
    pub fn select(&self, integration: &str) -> Result<String, ConfigurationError> {
        self.0
            .get(integration)
            .filter(|token| !token.trim().is_empty())
            .cloned()
            .ok_or_else(|| {
                ConfigurationError::new(format!(
                    "Notion token map has no token for integration '{integration}'"
                ))
            })
    }

    /// Integration names present in the map.
    pub fn integrations(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for NotionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.integrations()).finish()
    }
}

/// Connection and target settings for [`NotionRecordBackend`].
///
/// [`NotionRecordBackend`]: crate::NotionRecordBackend
#[derive(Clone)]
pub struct NotionConfig {
    pub token: String,
    pub task_database: CollectionId,
    pub source_database: CollectionId,
    pub base_url: String,
    pub version: String,
    pub timeout: Duration,
}

impl NotionConfig {
    /// Settings for the public Notion API.
    pub fn new(token: String, task_database: CollectionId, source_database: CollectionId) -> Self {
        Self {
            token,
            task_database,
            source_database,
            base_url: "https://api.notion.com/v1".to_string(),
            version: "2022-06-28".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("token", &"***")
            .field("task_database", &self.task_database)
            .field("source_database", &self.source_database)
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .field("timeout", &self.timeout)
            .finish()
    }
}
