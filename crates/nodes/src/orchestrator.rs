//! The four-stage pipeline orchestrator.

use std::sync::Arc;

use pipeline::{
    error_chain, Artifacts, ConfigurationError, GenerationClient, GenerationContext, GenerationRole,
    PipelineError, PipelineRequest, PipelineResult, PipelineRunId, RecordStore,
};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::PipelineState;

/// Sequences Specifier → Designer → Researcher → RecordStore for one request.
///
/// Constructed once with its collaborators and shared across runs; holds no
/// per-run state, so concurrent runs are independent except for whatever the
/// external store itself serialises.
pub struct PipelineOrchestrator {
    specifier: Arc<dyn GenerationClient>,
    designer: Arc<dyn GenerationClient>,
    researcher: Arc<dyn GenerationClient>,
    store: RecordStore,
}

impl PipelineOrchestrator {
    /// Wires the orchestrator.
    ///
    /// Returns a [`ConfigurationError`] if a client is plugged into the wrong
    /// role slot.
    pub fn new(
        specifier: Arc<dyn GenerationClient>,
        designer: Arc<dyn GenerationClient>,
        researcher: Arc<dyn GenerationClient>,
        store: RecordStore,
    ) -> Result<Self, ConfigurationError> {
        for (client, expected) in [
            (&specifier, GenerationRole::Specifier),
            (&designer, GenerationRole::Designer),
            (&researcher, GenerationRole::Researcher),
        ] {
            if client.role() != expected {
                return Err(ConfigurationError::new(format!(
                    "{} client wired into the {expected} slot",
                    client.role()
                )));
            }
        }

        Ok(Self {
            specifier,
            designer,
            researcher,
            store,
        })
    }

    /// Runs the pipeline once.
    ///
    /// Each stage starts only after the previous one succeeded. The first
    /// failure aborts the run and is returned unchanged in cause; its
    /// [`PipelineError::stage`] names the stage that failed. Nothing created
    /// before the failure is rolled back.
    pub async fn run(&self, request: &PipelineRequest) -> Result<PipelineResult, PipelineError> {
        let run_id = PipelineRunId::new_random();
        let span = info_span!("pipeline_run", %run_id, title = %request.title());

        async {
            info!(source_linked = request.source_linked(), "Pipeline started");
            let mut state = PipelineState::Idle;

            match self.execute(request, &mut state).await {
                Ok(result) => {
                    info!(task_record_id = %result.task_record_id, "Pipeline finished");
                    Ok(result)
                }
                Err(error) => {
                    state = state.fail();
                    warn!(%state, error = %error_chain(&error), "Pipeline aborted");
                    Err(error)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        request: &PipelineRequest,
        state: &mut PipelineState,
    ) -> Result<PipelineResult, PipelineError> {
        let title = request.title();

        transition(state);
        let spec = self
            .specifier
            .generate(GenerationContext {
                title,
                input: request.spec_prompt(),
            })
            .instrument(info_span!("specify"))
            .await?;

        transition(state);
        let design = self
            .designer
            .generate(GenerationContext {
                title,
                input: spec.as_str(),
            })
            .instrument(info_span!("design"))
            .await?;

        transition(state);
        let research = self
            .researcher
            .generate(GenerationContext {
                title,
                input: spec.as_str(),
            })
            .instrument(info_span!("research"))
            .await?;

        transition(state);
        let artifacts = Artifacts {
            spec,
            design,
            research,
        };
        let task_record_id = self
            .store
            .upsert_source_and_file(title, &artifacts, request.source())
            .instrument(info_span!("file"))
            .await?;

        transition(state);
        Ok(PipelineResult::completed(request, task_record_id))
    }
}

fn transition(state: &mut PipelineState) {
    let next = state.advance();
    debug!(from = %state, to = %next, "State transition");
    *state = next;
}

impl std::fmt::Debug for PipelineOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOrchestrator")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
