use std::sync::Arc;
use std::time::Duration;

use locus_llm_gateway::{
    ExecuteOptions, GatewayError, LlmGateway, ResponseShape, ScriptedBackend, ScriptedReply,
};
use serde_json::json;

fn gateway(backend: &Arc<ScriptedBackend>) -> LlmGateway {
    LlmGateway::new(backend.clone())
}

#[tokio::test]
async fn fast_reply_wins_the_race() {
    let backend = Arc::new(ScriptedBackend::texts(["{\"ok\":true}"]));
    let options = ExecuteOptions::new().with_timeout(Duration::from_secs(5));
    let text = gateway(&backend).execute("prompt", &options).await.unwrap();
    assert_eq!(text, "{\"ok\":true}");
    assert_eq!(backend.completed(), 1);
}

#[tokio::test]
async fn hanging_backend_times_out() {
    let backend = Arc::new(ScriptedBackend::always(ScriptedReply::Hang));
    let options = ExecuteOptions::new().with_timeout(Duration::from_millis(30));
    let err = gateway(&backend).execute("prompt", &options).await.unwrap_err();
    assert_eq!(err, GatewayError::Timeout { after_ms: 30 });
    assert!(err.is_timeout());
    assert_eq!(backend.call_count(), 1);
    assert_eq!(backend.completed(), 0);
}

#[tokio::test]
async fn losing_call_is_not_cancelled() {
    let backend = Arc::new(ScriptedBackend::new([ScriptedReply::Delayed(
        Duration::from_millis(100),
        "late".to_string(),
    )]));
    let options = ExecuteOptions::new().with_timeout(Duration::from_millis(10));
    let err = gateway(&backend).execute("prompt", &options).await.unwrap_err();
    assert!(err.is_timeout());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(backend.completed(), 1);
}

#[tokio::test]
async fn without_timeout_the_call_is_awaited() {
    let backend = Arc::new(ScriptedBackend::new([ScriptedReply::Delayed(
        Duration::from_millis(20),
        "slow but fine".to_string(),
    )]));
    let text = gateway(&backend)
        .execute("prompt", &ExecuteOptions::new())
        .await
        .unwrap();
    assert_eq!(text, "slow but fine");
}

#[tokio::test]
async fn backend_failures_surface_as_errors() {
    let backend = Arc::new(ScriptedBackend::new([ScriptedReply::fail("boom")]));
    let err = gateway(&backend)
        .execute("prompt", &ExecuteOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err, GatewayError::Scripted("boom".to_string()));

    let err = gateway(&backend)
        .execute("prompt", &ExecuteOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Scripted(_)));
}

#[tokio::test]
async fn options_reach_the_backend() {
    let backend = Arc::new(ScriptedBackend::texts(["{}"]));
    let options = ExecuteOptions::new()
        .with_system_prompt("system")
        .with_response_shape(ResponseShape::new("structured_query", json!({})))
        .with_prefill("{")
        .with_timeout(Duration::from_secs(1));
    gateway(&backend).execute("user prompt", &options).await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, "user prompt");
    assert_eq!(calls[0].system_prompt.as_deref(), Some("system"));
    assert_eq!(calls[0].response_shape.as_deref(), Some("structured_query"));
    assert_eq!(calls[0].prefill.as_deref(), Some("{"));
    assert_eq!(calls[0].timeout, Some(Duration::from_secs(1)));
}
