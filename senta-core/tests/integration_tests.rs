//! Integration tests for senta-core

use senta_core::prelude::*;

#[test]
fn test_message_creation() {
    let user_msg = Message::user("Hello");
    assert_eq!(user_msg.role, Role::User);
    assert_eq!(user_msg.text(), "Hello");

    let assistant_msg = Message::assistant("Hi there!");
    assert_eq!(assistant_msg.role, Role::Assistant);

    let system_msg = Message::system("You are helpful");
    assert_eq!(system_msg.role, Role::System);
}

#[test]
fn test_agent_config_default() {
    let config = AgentConfig::default();
    assert_eq!(config.name, "sentiment-agent");
    assert_eq!(config.model, senta_core::agent::DEFAULT_MODEL);
    assert_eq!(
        config.system_prompt.as_deref(),
        Some(senta_core::agent::SENTIMENT_SYSTEM_PROMPT)
    );
}

#[test]
fn test_envelope_round_trip() {
    let response = ChatResponse::new(Message::assistant("positive").with_id("id-1"));
    let json = serde_json::to_string(&response).unwrap();
    let parsed: ChatResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.id(), Some("id-1"));
    assert_eq!(parsed.content(), "positive");
}

#[tokio::test]
async fn test_streaming_collect_text() {
    use senta_core::streaming::MockStreamBuilder;

    let stream = MockStreamBuilder::new()
        .delta("pos")
        .delta("itive")
        .done()
        .build();

    let text = stream.collect_text().await.unwrap();
    assert_eq!(text, "positive");
}

#[tokio::test]
async fn test_traced_wrapper_returns_inner_result() {
    let value = traced("predict", "input", async { Ok("done") }).await.unwrap();
    assert_eq!(value, "done");
}
