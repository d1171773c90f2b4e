//! Record store port and the upsert-and-relate algorithm.
//!
//! [`RecordBackend`] is the three-primitive port an external record-keeping
//! service must supply. [`RecordStore`] builds the filing stage on top of it:
//!
//! 1. No source URL: skip source handling entirely.
//! 2. Look up a source record by exact URL.
//! 3. Create one if the lookup found nothing.
//! 4. Create the task record with status `Review`, the rendered body, and the
//!    source relation (if any).
//! 5. Return the task record id.
//!
//! ## Concurrency
//!
//! Steps 2–3 are a check-then-act sequence against a remote store with no
//! compare-and-create primitive. Two concurrent runs for the same new URL may
//! both observe "absent" and both create a source record, leaving duplicates
//! for one URL. This layer does not lock against that (the store is remote and
//! multi-tenant, so no local lock would help) and does not mask it: each task
//! still relates to a source record that exists, just not necessarily the same
//! one.
//!
//! ## Partial failure
//!
//! No rollback. A source record created in step 3 stays in the store if step 4
//! fails.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::{
    Artifacts, BoxError, NewTaskRecord, SourceRecordId, SourceReference, SourceUrl, StoreFailure,
    StoreStage, TaskBody, TaskRecordId, TaskStatus,
};

/// Title given to a newly created source record when the request has none.
pub const FALLBACK_SOURCE_TITLE: &str = "Imported Source";

/// Primitive operations of the external record store.
///
/// Implementations translate these into the store's own API and report any
/// failure as a boxed error; [`RecordStore`] tags it with the failing
/// [`StoreStage`].
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Finds a source record whose URL equals `url` exactly (case-sensitive).
    ///
    /// The store does not guarantee uniqueness; if several records match, the
    /// first one the store returns is used.
    async fn find_source_by_url(&self, url: &SourceUrl)
        -> Result<Option<SourceRecordId>, BoxError>;

    /// Creates a new source record.
    async fn create_source_record(
        &self,
        title: &str,
        url: &SourceUrl,
    ) -> Result<SourceRecordId, BoxError>;

    /// Creates a new task record.
    async fn create_task_record(&self, task: &NewTaskRecord) -> Result<TaskRecordId, BoxError>;
}

/// The filing stage: source deduplication plus task creation.
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn RecordBackend>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn RecordBackend>) -> Self {
        Self { backend }
    }

    /// Returns the id of the source record for `source.url`, creating one if
    /// none exists.
    ///
    /// Subject to the check-then-act race described in the module docs.
    #[instrument(skip_all, fields(source_url = %source.url))]
    pub async fn upsert_source(
        &self,
        source: &SourceReference,
    ) -> Result<SourceRecordId, StoreFailure> {
        let existing = self
            .backend
            .find_source_by_url(&source.url)
            .await
            .map_err(|e| StoreFailure::new(StoreStage::LookupSource, e))?;

        if let Some(id) = existing {
            debug!(source_record_id = %id, "Reusing existing source record");
            return Ok(id);
        }

        let title = source.title.as_deref().unwrap_or(FALLBACK_SOURCE_TITLE);
        let id = self
            .backend
            .create_source_record(title, &source.url)
            .await
            .map_err(|e| StoreFailure::new(StoreStage::CreateSource, e))?;

        info!(source_record_id = %id, "Created source record");
        Ok(id)
    }

    /// Upserts the source record (if any) and files the task record.
    #[instrument(skip_all, fields(title = %title, source_linked = source.is_some()))]
    pub async fn upsert_source_and_file(
        &self,
        title: &str,
        artifacts: &Artifacts,
        source: Option<&SourceReference>,
    ) -> Result<TaskRecordId, StoreFailure> {
        let related_source = match source {
            Some(source) => Some(self.upsert_source(source).await?),
            None => None,
        };

        let task = NewTaskRecord {
            title: title.to_string(),
            status: TaskStatus::Review,
            body: TaskBody::render(artifacts),
            related_source,
        };

        let id = self
            .backend
            .create_task_record(&task)
            .await
            .map_err(|e| StoreFailure::new(StoreStage::CreateTask, e))?;

        info!(task_record_id = %id, "Filed task record");
        Ok(id)
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}
