//! In-memory doubles for the pipeline ports.
//!
//! Enabled for this crate's own tests and, through the `test-support` feature,
//! for downstream crates' tests. Both doubles record every call so tests can
//! assert on call counts and ordering.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Barrier;

use crate::{
    BoxError, GeneratedArtifact, GenerationClient, GenerationContext, GenerationFailure,
    GenerationRole, NewTaskRecord, RecordBackend, SourceRecord, SourceRecordId, SourceUrl,
    TaskRecord, TaskRecordId,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Error produced by a double configured to fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("injected failure: {0}")]
pub struct InjectedFailure(pub String);

// ---------------------------------------------------------------------------
// Record backend
// ---------------------------------------------------------------------------

/// A record backend primitive, as recorded by [`InMemoryRecordBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    FindSource,
    CreateSource,
    CreateTask,
}

#[derive(Debug, Default)]
struct BackendState {
    sources: Vec<SourceRecord>,
    tasks: Vec<TaskRecord>,
    calls: Vec<BackendCall>,
    next_id: u64,
}

impl BackendState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// A [`RecordBackend`] that keeps records in memory.
///
/// Like the real store it has no compare-and-create primitive. With
/// [`with_lookup_barrier`](Self::with_lookup_barrier), every lookup waits
/// until `n` lookups are in flight before returning, which forces concurrent
/// runs to all observe "absent" before any of them creates a source record.
#[derive(Debug, Default)]
pub struct InMemoryRecordBackend {
    state: Mutex<BackendState>,
    failing: Option<BackendCall>,
    lookup_barrier: Option<Arc<Barrier>>,
}

impl InMemoryRecordBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call to `call` fail with an [`InjectedFailure`].
    #[must_use]
    pub fn failing_on(mut self, call: BackendCall) -> Self {
        self.failing = Some(call);
        self
    }

    /// Holds each lookup until `n` lookups have been issued.
    #[must_use]
    pub fn with_lookup_barrier(mut self, n: usize) -> Self {
        self.lookup_barrier = Some(Arc::new(Barrier::new(n)));
        self
    }

    /// Inserts a source record directly, bypassing call recording.
    pub fn seed_source(&self, url: &str, title: &str) -> SourceRecordId {
        let mut state = lock(&self.state);
        let id = SourceRecordId::new(state.next_id("source")).unwrap_or_else(|| unreachable!());
        state.sources.push(SourceRecord {
            id: id.clone(),
            url: SourceUrl::new(url).unwrap_or_else(|| panic!("seeded source url must be non-empty")),
            title: title.to_string(),
        });
        id
    }

    pub fn sources(&self) -> Vec<SourceRecord> {
        lock(&self.state).sources.clone()
    }

    pub fn tasks(&self) -> Vec<TaskRecord> {
        lock(&self.state).tasks.clone()
    }

    pub fn task(&self, id: &TaskRecordId) -> Option<TaskRecord> {
        lock(&self.state)
            .tasks
            .iter()
            .find(|task| &task.id == id)
            .cloned()
    }

    /// Every primitive call, in order, including failed ones.
    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.state).calls.clone()
    }

    pub fn create_source_count(&self) -> usize {
        self.calls()
            .into_iter()
            .filter(|call| *call == BackendCall::CreateSource)
            .count()
    }

    fn record(&self, call: BackendCall) -> Result<(), BoxError> {
        lock(&self.state).calls.push(call);
        if self.failing == Some(call) {
            return Err(Box::new(InjectedFailure(format!("{call:?}"))));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordBackend for InMemoryRecordBackend {
    async fn find_source_by_url(
        &self,
        url: &SourceUrl,
    ) -> Result<Option<SourceRecordId>, BoxError> {
        self.record(BackendCall::FindSource)?;

        let found = lock(&self.state)
            .sources
            .iter()
            .find(|source| &source.url == url)
            .map(|source| source.id.clone());

        if let Some(barrier) = &self.lookup_barrier {
            barrier.wait().await;
        }
        Ok(found)
    }

    async fn create_source_record(
        &self,
        title: &str,
        url: &SourceUrl,
    ) -> Result<SourceRecordId, BoxError> {
        self.record(BackendCall::CreateSource)?;

        let mut state = lock(&self.state);
        let id = SourceRecordId::new(state.next_id("source")).unwrap_or_else(|| unreachable!());
        state.sources.push(SourceRecord {
            id: id.clone(),
            url: url.clone(),
            title: title.to_string(),
        });
        Ok(id)
    }

    async fn create_task_record(&self, task: &NewTaskRecord) -> Result<TaskRecordId, BoxError> {
        self.record(BackendCall::CreateTask)?;

        let mut state = lock(&self.state);
        if let Some(related) = &task.related_source {
            if !state.sources.iter().any(|source| &source.id == related) {
                return Err(format!("dangling relation to source record {related}").into());
            }
        }

        let id = TaskRecordId::new(state.next_id("task")).unwrap_or_else(|| unreachable!());
        state.tasks.push(TaskRecord {
            id: id.clone(),
            title: task.title.clone(),
            status: task.status,
            body: task.body.clone(),
            related_source: task.related_source.clone(),
        });
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Generation client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Script {
    Text(String),
    Echo(String),
    Fail(String),
}

/// A [`GenerationClient`] with a fixed behaviour.
#[derive(Debug)]
pub struct ScriptedGenerationClient {
    role: GenerationRole,
    script: Script,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerationClient {
    fn with_script(role: GenerationRole, script: Script) -> Self {
        Self {
            role,
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always returns `text`.
    pub fn returning(role: GenerationRole, text: impl Into<String>) -> Self {
        Self::with_script(role, Script::Text(text.into()))
    }

    /// Returns `prefix` followed by the context input, to make chaining visible.
    pub fn echoing(role: GenerationRole, prefix: impl Into<String>) -> Self {
        Self::with_script(role, Script::Echo(prefix.into()))
    }

    /// Always fails with an [`InjectedFailure`] carrying `message`.
    pub fn failing(role: GenerationRole, message: impl Into<String>) -> Self {
        Self::with_script(role, Script::Fail(message.into()))
    }

    /// `(title, input)` of every call, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl GenerationClient for ScriptedGenerationClient {
    fn role(&self) -> GenerationRole {
        self.role
    }

    async fn generate(
        &self,
        context: GenerationContext<'_>,
    ) -> Result<GeneratedArtifact, GenerationFailure> {
        lock(&self.calls).push((context.title.to_string(), context.input.to_string()));

        match &self.script {
            Script::Text(text) => Ok(GeneratedArtifact::new(text.clone())),
            Script::Echo(prefix) => Ok(GeneratedArtifact::new(format!("{prefix}{}", context.input))),
            Script::Fail(message) => Err(GenerationFailure::new(
                self.role,
                InjectedFailure(message.clone()),
            )),
        }
    }
}
