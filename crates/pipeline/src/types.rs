//! Shared value types for the SpecFlow domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (a request always has a non-empty title and prompt, a
//! task body always follows the fixed three-section layout) and participate in
//! domain computations.

use serde::{Deserialize, Serialize};

use crate::{SourceRecordId, SourceUrl, TaskRecordId, ValidationError};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// The wire shape accepted at the system boundary.
///
/// Every field is optional here so that a malformed request can be rejected
/// with a [`ValidationError`] instead of a deserialisation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineInput {
    pub title: Option<String>,
    pub spec_prompt: Option<String>,
    pub source_url: Option<String>,
    pub source_title: Option<String>,
}

impl PipelineInput {
    /// Checks the required fields and builds a [`PipelineRequest`].
    ///
    /// `title` and `specPrompt` must be present and non-empty. An empty
    /// `sourceUrl` is treated as absent. `sourceTitle` is passed through as
    /// given, including the empty string.
    pub fn validate(self) -> Result<PipelineRequest, ValidationError> {
        let title = self.title.filter(|t| !t.is_empty());
        let spec_prompt = self.spec_prompt.filter(|p| !p.is_empty());

        let (title, spec_prompt) = match (title, spec_prompt) {
            (Some(title), Some(spec_prompt)) => (title, spec_prompt),
            (title, spec_prompt) => {
                let mut missing = Vec::new();
                if title.is_none() {
                    missing.push("title");
                }
                if spec_prompt.is_none() {
                    missing.push("specPrompt");
                }
                return Err(ValidationError { missing });
            }
        };

        let mut request = PipelineRequest::new(title, spec_prompt)?;
        if let Some(url) = self.source_url.and_then(SourceUrl::new) {
            request = request.with_source(url, self.source_title);
        }
        Ok(request)
    }
}

/// A reference to the external source a task was raised from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    /// Deduplication key for the source record.
    pub url: SourceUrl,
    /// Title to give the source record if one has to be created.
    pub title: Option<String>,
}

/// One validated pipeline invocation.
///
/// Immutable once built; scoped to a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    title: String,
    spec_prompt: String,
    source: Option<SourceReference>,
}

impl PipelineRequest {
    /// Creates a request with no source reference.
    ///
    /// Returns a [`ValidationError`] if `title` or `spec_prompt` is empty.
    pub fn new(
        title: impl Into<String>,
        spec_prompt: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        let spec_prompt = spec_prompt.into();

        let mut missing = Vec::new();
        if title.is_empty() {
            missing.push("title");
        }
        if spec_prompt.is_empty() {
            missing.push("specPrompt");
        }
        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        Ok(Self {
            title,
            spec_prompt,
            source: None,
        })
    }

    /// Attaches a source reference.
    #[must_use]
    pub fn with_source(mut self, url: SourceUrl, title: Option<String>) -> Self {
        self.source = Some(SourceReference { url, title });
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn spec_prompt(&self) -> &str {
        &self.spec_prompt
    }

    pub fn source(&self) -> Option<&SourceReference> {
        self.source.as_ref()
    }

    /// `true` if the task will be related to a source record.
    pub fn source_linked(&self) -> bool {
        self.source.is_some()
    }
}

// ---------------------------------------------------------------------------
// Artefacts
// ---------------------------------------------------------------------------

/// Free-text output of one generation stage.
///
/// May be empty; an empty artefact is a valid result, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedArtifact(String);

impl GeneratedArtifact {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for GeneratedArtifact {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for GeneratedArtifact {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl std::fmt::Display for GeneratedArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three artefacts a successful run produces, in pipeline order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    pub spec: GeneratedArtifact,
    pub design: GeneratedArtifact,
    pub research: GeneratedArtifact,
}

// ---------------------------------------------------------------------------
// Task body
// ---------------------------------------------------------------------------

const SPEC_HEADER: &str = "## Spec\n";
const DESIGN_MARKER: &str = "\n\n## Design\n";
const RESEARCH_MARKER: &str = "\n\n## Research\n";

/// Body text of a task record.
///
/// The layout is a compatibility contract with downstream readers and must not
/// change: three fixed headers in fixed order, each followed by its artefact
/// verbatim, sections separated by a blank line.
///
/// ```text
/// ## Spec
/// <spec>
///
/// ## Design
/// <design>
///
/// ## Research
/// <research>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskBody(String);

impl TaskBody {
    /// Renders the artefacts into the fixed layout.
    pub fn render(artifacts: &Artifacts) -> Self {
        Self(format!(
            "{SPEC_HEADER}{}{DESIGN_MARKER}{}{RESEARCH_MARKER}{}",
            artifacts.spec, artifacts.design, artifacts.research
        ))
    }

    /// Splits a body back into its three sections.
    ///
    /// Uses the first occurrence of each header marker, so an artefact that
    /// itself contains a `## Design` or `## Research` header line after a blank
    /// line does not round-trip. Returns `None` if the layout is not recognised.
    pub fn parse(text: &str) -> Option<Artifacts> {
        let rest = text.strip_prefix(SPEC_HEADER)?;
        let (spec, rest) = rest.split_once(DESIGN_MARKER)?;
        let (design, research) = rest.split_once(RESEARCH_MARKER)?;
        Some(Artifacts {
            spec: spec.into(),
            design: design.into(),
            research: research.into(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Workflow status a task record is filed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Awaiting human review. The only status this system ever writes.
    Review,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Review => "Review",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Draft of a task record, handed to the backend's create-task primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskRecord {
    pub title: String,
    pub status: TaskStatus,
    pub body: TaskBody,
    /// Relation target. Always a source record that exists at creation time.
    pub related_source: Option<SourceRecordId>,
}

/// A stored source record. Never updated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: SourceRecordId,
    pub url: SourceUrl,
    pub title: String,
}

/// A stored task record. Created once per successful run; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskRecordId,
    pub title: String,
    pub status: TaskStatus,
    pub body: TaskBody,
    pub related_source: Option<SourceRecordId>,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of a successful run, returned to the caller. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub title: String,
    pub task_record_id: TaskRecordId,
    pub source_linked: bool,
    pub success: bool,
}

impl PipelineResult {
    /// Builds the result for a completed run.
    pub fn completed(request: &PipelineRequest, task_record_id: TaskRecordId) -> Self {
        Self {
            title: request.title().to_string(),
            task_record_id,
            source_linked: request.source_linked(),
            success: true,
        }
    }
}
