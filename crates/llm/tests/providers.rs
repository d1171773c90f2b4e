//! Integration tests for the generation adapters against mock HTTP servers.
//!
//! Tests behavioural contracts:
//! - request shape sent to each provider
//! - text extraction from each provider's response
//! - empty-text responses
//! - failure wrapping (role tag, preserved cause, no retry)
//! - Researcher degradation when unconfigured

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use llm::{
    AnthropicConfig, AnthropicSpecifier, Credential, OpenAiConfig, OpenAiDesigner,
    PerplexityConfig, PerplexityResearcher, ProviderError, RESEARCH_UNAVAILABLE,
};
use nodes::PipelineOrchestrator;
use pipeline::testing::{InMemoryRecordBackend, ScriptedGenerationClient};
use pipeline::{
    GenerationClient, GenerationContext, GenerationRole, PipelineRequest, RecordStore, TaskBody,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context<'a>(title: &'a str, input: &'a str) -> GenerationContext<'a> {
    GenerationContext { title, input }
}

fn anthropic(base_url: &str) -> AnthropicSpecifier {
    AnthropicSpecifier::new(AnthropicConfig {
        api_key: "test-anthropic-key".to_string(),
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
        ..Default::default()
    })
    .unwrap()
}

fn openai(base_url: &str) -> OpenAiDesigner {
    OpenAiDesigner::new(OpenAiConfig {
        api_key: "test-openai-key".to_string(),
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
        ..Default::default()
    })
    .unwrap()
}

fn perplexity(base_url: &str) -> PerplexityResearcher {
    PerplexityResearcher::new(PerplexityConfig {
        credential: Credential::Configured("test-pplx-key".to_string()),
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
        ..Default::default()
    })
    .unwrap()
}

fn chat_response(content: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-123",
        "model": "gpt-4o-mini",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

// ---------------------------------------------------------------------------
// Specifier
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_specifier_sends_wrapped_prompt_and_extracts_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "test-anthropic-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_json(serde_json::json!({
            "model": "claude-3-5-sonnet-latest",
            "max_tokens": 1200,
            "messages": [{
                "role": "user",
                "content": "Organize the following requirements into a specification document.\n\nUsers need email/password login"
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-sonnet-latest",
            "content": [{"type": "text", "text": "## Login spec"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let artifact = anthropic(&server.uri())
        .generate(context("Add login", "Users need email/password login"))
        .await
        .unwrap();

    assert_eq!(artifact.as_str(), "## Login spec");
}

#[tokio::test]
async fn test_specifier_without_text_block_returns_empty_artifact() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"content": []})),
        )
        .mount(&server)
        .await;

    let artifact = anthropic(&server.uri())
        .generate(context("Add login", ""))
        .await
        .unwrap();

    assert!(artifact.is_empty());
}

#[tokio::test]
async fn test_specifier_api_error_is_wrapped_once_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let failure = anthropic(&server.uri())
        .generate(context("Add login", "prompt"))
        .await
        .unwrap_err();

    assert_eq!(failure.role, GenerationRole::Specifier);
    let cause = failure
        .source()
        .and_then(|e| e.downcast_ref::<ProviderError>())
        .expect("provider error must be preserved");
    assert_eq!(cause.status(), Some(529));
    assert!(pipeline::error_chain(&failure).contains("overloaded"));
}

// ---------------------------------------------------------------------------
// Designer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_designer_sends_spec_verbatim_with_bearer_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-openai-key"))
        .and(body_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "You are a design engineer. From the specification, produce an ER diagram and API definitions."},
                {"role": "user", "content": "## Login spec"}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response(serde_json::json!("erDiagram"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let artifact = openai(&server.uri())
        .generate(context("Add login", "## Login spec"))
        .await
        .unwrap();

    assert_eq!(artifact.as_str(), "erDiagram");
}

#[tokio::test]
async fn test_designer_null_content_returns_empty_artifact() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response(serde_json::Value::Null)),
        )
        .mount(&server)
        .await;

    let artifact = openai(&server.uri())
        .generate(context("Add login", "spec"))
        .await
        .unwrap();

    assert_eq!(artifact.as_str(), "");
}

#[tokio::test]
async fn test_designer_malformed_body_is_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let failure = openai(&server.uri())
        .generate(context("Add login", "spec"))
        .await
        .unwrap_err();

    assert_eq!(failure.role, GenerationRole::Designer);
    assert!(matches!(
        failure.source().and_then(|e| e.downcast_ref::<ProviderError>()),
        Some(ProviderError::Decode(_))
    ));
}

#[tokio::test]
async fn test_designer_unreachable_service_is_a_transport_failure() {
    // Nothing listens on the discard port.
    let failure = openai("http://127.0.0.1:9")
        .generate(context("Add login", "spec"))
        .await
        .unwrap_err();

    assert!(matches!(
        failure.source().and_then(|e| e.downcast_ref::<ProviderError>()),
        Some(ProviderError::Transport(_))
    ));
}

// ---------------------------------------------------------------------------
// Researcher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_researcher_sends_title_and_spec() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-pplx-key"))
        .and(body_json(serde_json::json!({
            "model": "pplx-70b-online",
            "messages": [
                {"role": "system", "content": "You are a technical research assistant."},
                {"role": "user", "content": "Feature: Add login\nSpecification:\n## Login spec\nBriefly summarize the relevant technologies and APIs."}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response(serde_json::json!("Use OAuth"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let artifact = perplexity(&server.uri())
        .generate(context("Add login", "## Login spec"))
        .await
        .unwrap();

    assert_eq!(artifact.as_str(), "Use OAuth");
}

#[tokio::test]
async fn test_researcher_service_failure_is_not_degraded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let failure = perplexity(&server.uri())
        .generate(context("Add login", "spec"))
        .await
        .unwrap_err();

    assert_eq!(failure.role, GenerationRole::Researcher);
}

#[tokio::test]
async fn test_unconfigured_researcher_never_calls_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let researcher = PerplexityResearcher::new(PerplexityConfig {
        credential: Credential::from_value(None),
        base_url: server.uri(),
        ..Default::default()
    })
    .unwrap();

    let artifact = researcher
        .generate(context("Add login", "spec"))
        .await
        .unwrap();

    assert_eq!(artifact.as_str(), RESEARCH_UNAVAILABLE);
}

#[tokio::test]
async fn test_pipeline_completes_with_unconfigured_researcher() {
    let researcher = PerplexityResearcher::new(PerplexityConfig::default()).unwrap();
    let backend = Arc::new(InMemoryRecordBackend::new());
    let orchestrator = PipelineOrchestrator::new(
        Arc::new(ScriptedGenerationClient::returning(
            GenerationRole::Specifier,
            "S",
        )),
        Arc::new(ScriptedGenerationClient::returning(
            GenerationRole::Designer,
            "D",
        )),
        Arc::new(researcher),
        RecordStore::new(backend.clone()),
    )
    .unwrap();

    let request = PipelineRequest::new("Add login", "Users need login").unwrap();
    let result = orchestrator.run(&request).await.unwrap();

    assert!(result.success);
    let task = backend.task(&result.task_record_id).unwrap();
    let sections = TaskBody::parse(task.body.as_str()).unwrap();
    assert_eq!(sections.research.as_str(), RESEARCH_UNAVAILABLE);
}
