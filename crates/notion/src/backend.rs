//! [`RecordBackend`] implementation over the Notion REST API.

use async_trait::async_trait;
use pipeline::{
    BoxError, ConfigurationError, NewTaskRecord, RecordBackend, SourceRecordId, SourceUrl,
    TaskRecordId,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::blocks::{paragraphs, rich_text};
use crate::{NotionConfig, NotionError};

const TITLE_PROPERTY: &str = "Name";
const URL_PROPERTY: &str = "URL";
const STATUS_PROPERTY: &str = "Status";
const RELATION_PROPERTY: &str = "Input Warehouse";

/// Notion-backed record store primitives.
#[derive(Debug)]
pub struct NotionRecordBackend {
    config: NotionConfig,
    client: Client,
}

impl NotionRecordBackend {
    pub fn new(config: NotionConfig) -> Result<Self, ConfigurationError> {
        if config.token.trim().is_empty() {
            return Err(ConfigurationError::new("Notion integration token is required"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigurationError::new(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/{path}", self.config.base_url))
            .bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.version)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, NotionError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(NotionError::Decode)
    }

    async fn create_page(&self, body: Value) -> Result<String, NotionError> {
        let page: PageRef = Self::send(self.post("pages").json(&body)).await?;
        if page.id.is_empty() {
            return Err(NotionError::MissingId);
        }
        Ok(page.id)
    }

    fn source_page(&self, title: &str, url: &SourceUrl) -> Value {
        // Notion shows an untitled page for an empty title; use the URL instead.
        let title = if title.is_empty() { url.as_str() } else { title };

        json!({
            "parent": { "database_id": self.config.source_database.as_str() },
            "properties": {
                TITLE_PROPERTY: { "title": rich_text(title) },
                URL_PROPERTY: { "url": url.as_str() },
            }
        })
    }

    fn task_page(&self, task: &NewTaskRecord) -> Value {
        let mut properties = json!({
            TITLE_PROPERTY: { "title": rich_text(&task.title) },
            STATUS_PROPERTY: { "select": { "name": task.status.as_str() } },
        });
        if let Some(source) = &task.related_source {
            properties[RELATION_PROPERTY] = json!({ "relation": [{ "id": source.as_str() }] });
        }

        json!({
            "parent": { "database_id": self.config.task_database.as_str() },
            "properties": properties,
            "children": paragraphs(task.body.as_str()),
        })
    }
}

#[async_trait]
impl RecordBackend for NotionRecordBackend {
    async fn find_source_by_url(
        &self,
        url: &SourceUrl,
    ) -> Result<Option<SourceRecordId>, BoxError> {
        debug!(source_url = %url, "Querying source database");
        let path = format!("databases/{}/query", self.config.source_database);
        let body = json!({
            "filter": { "property": URL_PROPERTY, "url": { "equals": url.as_str() } },
            "page_size": 1,
        });

        let response: QueryResponse = Self::send(self.post(&path).json(&body)).await?;
        match response.results.into_iter().next() {
            Some(page) => Ok(Some(
                SourceRecordId::new(page.id).ok_or(NotionError::MissingId)?,
            )),
            None => Ok(None),
        }
    }

    async fn create_source_record(
        &self,
        title: &str,
        url: &SourceUrl,
    ) -> Result<SourceRecordId, BoxError> {
        debug!(source_url = %url, "Creating source page");
        let id = self.create_page(self.source_page(title, url)).await?;
        SourceRecordId::new(id).ok_or_else(|| NotionError::MissingId.into())
    }

    async fn create_task_record(&self, task: &NewTaskRecord) -> Result<TaskRecordId, BoxError> {
        debug!(title = %task.title, "Creating task page");
        let id = self.create_page(self.task_page(task)).await?;
        TaskRecordId::new(id).ok_or_else(|| NotionError::MissingId.into())
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<PageRef>,
}

#[derive(Debug, Deserialize)]
struct PageRef {
    #[serde(default)]
    id: String,
}
