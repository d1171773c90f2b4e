//! The text-generation port.
//!
//! Each of the three generation roles is an opaque `(context) -> text`
//! capability. Provider-specific request formatting and response extraction
//! live entirely behind [`GenerationClient`] in the `llm` crate; nothing about
//! a provider's payload shape reaches the orchestrator.

use async_trait::async_trait;

use crate::{GeneratedArtifact, GenerationFailure, GenerationRole};

/// Input handed to a [`GenerationClient`].
///
/// What `input` holds depends on the role: the raw requirement prompt for the
/// Specifier, the specification artefact for the Designer and the Researcher.
/// `title` is the task title; only the Researcher uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationContext<'a> {
    pub title: &'a str,
    pub input: &'a str,
}

/// A text-generation capability playing one pipeline role.
///
/// Implementations:
///
/// - forward an empty `input` as-is rather than rejecting it locally;
/// - return an empty artefact, not an error, when the service response carries
///   no extractable text;
/// - wrap every transport or service failure in a [`GenerationFailure`] tagged
///   with [`role`](Self::role), keeping the original error as its source;
/// - never retry, and never mutate state shared with other clients.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// The role this client plays.
    fn role(&self) -> GenerationRole;

    /// Generates the artefact for this role from `context`.
    async fn generate(
        &self,
        context: GenerationContext<'_>,
    ) -> Result<GeneratedArtifact, GenerationFailure>;
}
