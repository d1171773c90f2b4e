//! End-to-end behaviour of a pipeline run against in-memory collaborators.

use std::error::Error as _;
use std::sync::Arc;

use nodes::PipelineOrchestrator;
use pipeline::testing::{
    BackendCall, InMemoryRecordBackend, InjectedFailure, ScriptedGenerationClient,
};
use pipeline::{
    GenerationRole, PipelineError, PipelineRequest, RecordStore, SourceUrl, Stage, StoreStage,
    TaskBody, FALLBACK_SOURCE_TITLE,
};

struct Harness {
    specifier: Arc<ScriptedGenerationClient>,
    designer: Arc<ScriptedGenerationClient>,
    researcher: Arc<ScriptedGenerationClient>,
    backend: Arc<InMemoryRecordBackend>,
    orchestrator: PipelineOrchestrator,
}

impl Harness {
    fn new() -> Self {
        Self::with(
            ScriptedGenerationClient::returning(GenerationRole::Specifier, "S"),
            ScriptedGenerationClient::returning(GenerationRole::Designer, "D"),
            ScriptedGenerationClient::returning(GenerationRole::Researcher, "R"),
            InMemoryRecordBackend::new(),
        )
    }

    fn with(
        specifier: ScriptedGenerationClient,
        designer: ScriptedGenerationClient,
        researcher: ScriptedGenerationClient,
        backend: InMemoryRecordBackend,
    ) -> Self {
        let specifier = Arc::new(specifier);
        let designer = Arc::new(designer);
        let researcher = Arc::new(researcher);
        let backend = Arc::new(backend);
        let orchestrator = PipelineOrchestrator::new(
            specifier.clone(),
            designer.clone(),
            researcher.clone(),
            RecordStore::new(backend.clone()),
        )
        .unwrap();

        Self {
            specifier,
            designer,
            researcher,
            backend,
            orchestrator,
        }
    }
}

fn request() -> PipelineRequest {
    PipelineRequest::new("Add login", "Users need email/password login").unwrap()
}

fn linked_request(url: &str, title: Option<&str>) -> PipelineRequest {
    request().with_source(SourceUrl::new(url).unwrap(), title.map(str::to_string))
}

#[tokio::test]
async fn test_add_login_scenario_creates_one_source_and_one_task() {
    let harness = Harness::new();

    let result = harness
        .orchestrator
        .run(&linked_request("https://x.com/issue/1", Some("Issue #1")))
        .await
        .unwrap();

    assert_eq!(result.title, "Add login");
    assert!(result.source_linked);
    assert!(result.success);

    let sources = harness.backend.sources();
    let tasks = harness.backend.tasks();
    assert_eq!(sources.len(), 1);
    assert_eq!(tasks.len(), 1);
    assert_eq!(sources[0].title, "Issue #1");
    assert_eq!(tasks[0].id, result.task_record_id);
    assert_eq!(tasks[0].related_source, Some(sources[0].id.clone()));
    assert_eq!(tasks[0].status.as_str(), "Review");
}

#[tokio::test]
async fn test_without_source_url_store_skips_source_handling() {
    let harness = Harness::new();

    let result = harness.orchestrator.run(&request()).await.unwrap();

    assert!(!result.source_linked);
    assert_eq!(harness.backend.calls(), vec![BackendCall::CreateTask]);
    assert_eq!(harness.backend.tasks()[0].related_source, None);
}

#[tokio::test]
async fn test_existing_source_is_related_not_recreated() {
    let harness = Harness::new();
    let existing = harness
        .backend
        .seed_source("https://x.com/issue/1", "Issue #1");

    let result = harness
        .orchestrator
        .run(&linked_request("https://x.com/issue/1", Some("Ignored")))
        .await
        .unwrap();

    assert_eq!(harness.backend.create_source_count(), 0);
    let task = harness.backend.task(&result.task_record_id).unwrap();
    assert_eq!(task.related_source, Some(existing));
}

#[tokio::test]
async fn test_new_source_without_title_gets_fallback_title() {
    let harness = Harness::new();

    harness
        .orchestrator
        .run(&linked_request("https://x.com/issue/9", None))
        .await
        .unwrap();

    assert_eq!(harness.backend.create_source_count(), 1);
    assert_eq!(harness.backend.sources()[0].title, FALLBACK_SOURCE_TITLE);
}

#[tokio::test]
async fn test_body_holds_artifacts_under_fixed_headers() {
    let harness = Harness::new();

    let result = harness.orchestrator.run(&request()).await.unwrap();

    let task = harness.backend.task(&result.task_record_id).unwrap();
    assert_eq!(
        task.body.as_str(),
        "## Spec\nS\n\n## Design\nD\n\n## Research\nR"
    );
    let sections = TaskBody::parse(task.body.as_str()).unwrap();
    assert_eq!(sections.spec.as_str(), "S");
    assert_eq!(sections.design.as_str(), "D");
    assert_eq!(sections.research.as_str(), "R");
}

#[tokio::test]
async fn test_each_stage_receives_the_previous_artifact() {
    let harness = Harness::with(
        ScriptedGenerationClient::echoing(GenerationRole::Specifier, "spec:"),
        ScriptedGenerationClient::echoing(GenerationRole::Designer, "design:"),
        ScriptedGenerationClient::echoing(GenerationRole::Researcher, "research:"),
        InMemoryRecordBackend::new(),
    );

    let result = harness.orchestrator.run(&request()).await.unwrap();

    let spec = "spec:Users need email/password login";
    assert_eq!(harness.designer.calls()[0].1, spec);
    assert_eq!(
        harness.researcher.calls(),
        vec![("Add login".to_string(), spec.to_string())]
    );

    let task = harness.backend.task(&result.task_record_id).unwrap();
    let sections = TaskBody::parse(task.body.as_str()).unwrap();
    assert_eq!(sections.design.as_str(), format!("design:{spec}"));
    assert_eq!(sections.research.as_str(), format!("research:{spec}"));
}

#[tokio::test]
async fn test_empty_artifacts_are_filed_not_rejected() {
    let harness = Harness::with(
        ScriptedGenerationClient::returning(GenerationRole::Specifier, ""),
        ScriptedGenerationClient::returning(GenerationRole::Designer, ""),
        ScriptedGenerationClient::returning(GenerationRole::Researcher, ""),
        InMemoryRecordBackend::new(),
    );

    let result = harness.orchestrator.run(&request()).await.unwrap();

    assert!(result.success);
    assert_eq!(harness.designer.calls()[0].1, "");
}

#[tokio::test]
async fn test_specifier_failure_stops_every_later_stage() {
    let harness = Harness::with(
        ScriptedGenerationClient::failing(GenerationRole::Specifier, "quota"),
        ScriptedGenerationClient::returning(GenerationRole::Designer, "D"),
        ScriptedGenerationClient::returning(GenerationRole::Researcher, "R"),
        InMemoryRecordBackend::new(),
    );

    let err = harness
        .orchestrator
        .run(&linked_request("https://x.com/issue/1", None))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Specify);
    match &err {
        PipelineError::Generation(failure) => {
            assert_eq!(failure.role, GenerationRole::Specifier);
            let cause = failure.source().unwrap();
            assert_eq!(
                cause.downcast_ref::<InjectedFailure>(),
                Some(&InjectedFailure("quota".to_string()))
            );
        }
        other => panic!("expected generation failure, got {other:?}"),
    }
    assert_eq!(harness.specifier.call_count(), 1);
    assert_eq!(harness.designer.call_count(), 0);
    assert_eq!(harness.researcher.call_count(), 0);
    assert!(harness.backend.calls().is_empty());
}

#[tokio::test]
async fn test_designer_failure_skips_research_and_filing() {
    let harness = Harness::with(
        ScriptedGenerationClient::returning(GenerationRole::Specifier, "S"),
        ScriptedGenerationClient::failing(GenerationRole::Designer, "timeout"),
        ScriptedGenerationClient::returning(GenerationRole::Researcher, "R"),
        InMemoryRecordBackend::new(),
    );

    let err = harness.orchestrator.run(&request()).await.unwrap_err();

    assert_eq!(err.stage(), Stage::Design);
    assert_eq!(harness.researcher.call_count(), 0);
    assert!(harness.backend.calls().is_empty());
}

#[tokio::test]
async fn test_store_failure_is_tagged_with_file_stage() {
    let harness = Harness::with(
        ScriptedGenerationClient::returning(GenerationRole::Specifier, "S"),
        ScriptedGenerationClient::returning(GenerationRole::Designer, "D"),
        ScriptedGenerationClient::returning(GenerationRole::Researcher, "R"),
        InMemoryRecordBackend::new().failing_on(BackendCall::CreateTask),
    );

    let err = harness
        .orchestrator
        .run(&linked_request("https://x.com/issue/1", None))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::File);
    match err {
        PipelineError::Store(failure) => assert_eq!(failure.stage, StoreStage::CreateTask),
        other => panic!("expected store failure, got {other:?}"),
    }
    // The source record created before the failure is left in place.
    assert_eq!(harness.backend.sources().len(), 1);
}

#[tokio::test]
async fn test_concurrent_runs_for_one_new_url_may_duplicate_sources() {
    let harness = Harness::with(
        ScriptedGenerationClient::returning(GenerationRole::Specifier, "S"),
        ScriptedGenerationClient::returning(GenerationRole::Designer, "D"),
        ScriptedGenerationClient::returning(GenerationRole::Researcher, "R"),
        InMemoryRecordBackend::new().with_lookup_barrier(2),
    );
    let request = linked_request("https://x.com/issue/7", Some("Issue #7"));

    let (first, second) = tokio::join!(
        harness.orchestrator.run(&request),
        harness.orchestrator.run(&request)
    );
    let first = first.unwrap();
    let second = second.unwrap();

    // Both runs succeed. Duplicate source records are tolerated, not masked.
    let sources = harness.backend.sources();
    assert!((1..=2).contains(&sources.len()));
    assert!(sources.iter().all(|s| s.url.as_str() == "https://x.com/issue/7"));

    // Whatever was created, every relation points at a real source record.
    for id in [&first.task_record_id, &second.task_record_id] {
        let related = harness.backend.task(id).unwrap().related_source.unwrap();
        assert!(sources.iter().any(|s| s.id == related));
    }
}
