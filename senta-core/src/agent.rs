//! The sentiment chat agent adapter
//!
//! Wraps a chat-completion backend in a minimal agent interface:
//! [`SentimentAgent::predict`] forwards the latest user turn to the
//! backend wrapped in a fixed instruction template and returns one
//! response envelope; [`SentimentAgent::predict_stream`] does the same
//! over the backend's streaming call, emitting prefix-growing partial
//! envelopes as deltas arrive.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::warn;

use crate::error::{Error, Result};
use crate::message::{ChatContext, ChatResponse, Message, Role};
use crate::provider::Provider;
use crate::streaming::{StreamingChoice, StreamingResult};
use crate::trace::{traced, TraceGuard};

/// Lazy, single-pass sequence of response envelopes
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<ChatResponse>> + Send>>;

/// Instruction prompt bound to the agent at construction
pub const SENTIMENT_SYSTEM_PROMPT: &str = "You are a sentiment analysis expert. \
    Analyze text sentiment and respond with exactly one word: positive, neutral, or negative.";

/// Default model-serving endpoint the agent targets
pub const DEFAULT_MODEL: &str = "databricks-claude-3-7-sonnet";

/// Configuration for a [`SentimentAgent`]
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Name of the agent (for logging/identity)
    pub name: String,
    /// Serving endpoint / model to use (backend specific string)
    pub model: String,
    /// System prompt, fixed for the lifetime of the agent
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "sentiment-agent".to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: Some(SENTIMENT_SYSTEM_PROMPT.to_string()),
        }
    }
}

/// The sentiment agent adapter
///
/// Stateless apart from its immutable configuration; each predict call
/// owns its own request, response and (for streaming) accumulator, so
/// concurrent calls do not interfere as long as the backend client is
/// safe for concurrent use.
pub struct SentimentAgent<P: Provider> {
    provider: Arc<P>,
    config: AgentConfig,
}

impl<P: Provider> SentimentAgent<P> {
    /// Create an agent with the default sentiment configuration
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, AgentConfig::default())
    }

    /// Create an agent with an explicit configuration
    pub fn with_config(provider: P, config: AgentConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            config,
        }
    }

    /// Create a new agent builder
    pub fn builder(provider: P) -> AgentBuilder<P> {
        AgentBuilder::new(provider)
    }

    /// Get the agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Get a reference to the injected backend
    pub fn provider_ref(&self) -> &P {
        &self.provider
    }

    /// Build the single templated user message for one predict call
    ///
    /// The last message is treated as the user's input. A declared
    /// role other than `user` is accepted but logged, since callers
    /// occasionally hand the full transcript back.
    fn build_request(&self, messages: &[Message]) -> Result<Message> {
        let last = messages.last().ok_or(Error::EmptyConversation)?;

        if last.role != Role::User {
            warn!(
                agent = %self.config.name,
                role = last.role.as_str(),
                "last message is not a user turn; treating its content as user input"
            );
        }

        Ok(Message::user(format!("Analyze this phrase: {}", last.content)))
    }

    /// Send a conversation and get one complete response envelope
    ///
    /// Exactly one outbound backend call is made. Backend failures
    /// propagate unmodified; the adapter performs no retry or
    /// fallback. `context` and `custom_inputs` are accepted for
    /// interface compatibility and ignored.
    pub async fn predict(
        &self,
        messages: &[Message],
        _context: Option<&ChatContext>,
        _custom_inputs: Option<&serde_json::Value>,
    ) -> Result<ChatResponse> {
        let request = self.build_request(messages)?;
        let input = request.content.clone();

        let reply = traced("predict", &input, async {
            self.provider
                .complete(
                    &self.config.model,
                    self.config.system_prompt.as_deref(),
                    vec![request],
                )
                .await
        })
        .await?;

        Ok(ChatResponse::new(reply.with_id(fresh_id())))
    }

    /// Send a conversation and get a lazy stream of partial envelopes
    ///
    /// Every emitted envelope carries the same freshly generated id
    /// and an accumulated content that is a literal prefix extension
    /// of the previous one; the final envelope holds the complete
    /// message. Deltas without text content are skipped. A mid-stream
    /// backend failure is yielded once and terminates the sequence.
    pub async fn predict_stream(
        &self,
        messages: &[Message],
        _context: Option<&ChatContext>,
        _custom_inputs: Option<&serde_json::Value>,
    ) -> Result<ResponseStream> {
        let request = self.build_request(messages)?;

        // The guard lives inside the stream state so the trace record
        // covers the whole streaming lifetime, not just the setup.
        let guard = TraceGuard::new("predict_stream", &request.content);

        let response = self
            .provider
            .stream_completion(
                &self.config.model,
                self.config.system_prompt.as_deref(),
                vec![request],
            )
            .await?;

        Ok(envelope_stream(response.into_inner(), fresh_id(), guard))
    }
}

/// State carried across stream polls
struct StreamState {
    inner: StreamingResult,
    accumulated: String,
    id: String,
    finished: bool,
    _guard: TraceGuard,
}

/// Turn a backend delta stream into a sequence of prefix-growing envelopes
fn envelope_stream(inner: StreamingResult, id: String, guard: TraceGuard) -> ResponseStream {
    let state = StreamState {
        inner,
        accumulated: String::new(),
        id,
        finished: false,
        _guard: guard,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }

        loop {
            match state.inner.next().await {
                Some(Ok(StreamingChoice::Delta(text))) => {
                    // Control/metadata-only deltas carry no text
                    if text.is_empty() {
                        continue;
                    }
                    state.accumulated.push_str(&text);
                    let message = Message::assistant(state.accumulated.clone())
                        .with_id(state.id.clone());
                    return Some((Ok(ChatResponse::new(message)), state));
                }
                Some(Ok(StreamingChoice::Done)) | None => {
                    state.finished = true;
                    return None;
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
            }
        }
    }))
}

/// Generate a fresh message identifier (UUID v4 hex)
fn fresh_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Builder for [`SentimentAgent`]
pub struct AgentBuilder<P: Provider> {
    provider: P,
    config: AgentConfig,
}

impl<P: Provider> AgentBuilder<P> {
    /// Create a new builder around a backend
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: AgentConfig::default(),
        }
    }

    /// Set the agent name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the target model / serving endpoint
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Remove the system prompt entirely
    pub fn without_system_prompt(mut self) -> Self {
        self.config.system_prompt = None;
        self
    }

    /// Build the agent
    pub fn build(self) -> SentimentAgent<P> {
        SentimentAgent::with_config(self.provider, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::{MockStreamBuilder, StreamingResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Minimal scripted backend for unit tests
    struct ScriptedBackend {
        reply: String,
        chunks: Vec<String>,
        calls: Mutex<Vec<(String, Option<String>, Vec<Message>)>>,
    }

    impl ScriptedBackend {
        fn new(reply: &str, chunks: &[&str]) -> Self {
            Self {
                reply: reply.to_string(),
                chunks: chunks.iter().map(|c| c.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, model: &str, system_prompt: Option<&str>, messages: &[Message]) {
            self.calls.lock().unwrap().push((
                model.to_string(),
                system_prompt.map(str::to_string),
                messages.to_vec(),
            ));
        }
    }

    #[async_trait]
    impl Provider for ScriptedBackend {
        async fn complete(
            &self,
            model: &str,
            system_prompt: Option<&str>,
            messages: Vec<Message>,
        ) -> Result<Message> {
            self.record(model, system_prompt, &messages);
            Ok(Message::assistant(self.reply.clone()))
        }

        async fn stream_completion(
            &self,
            model: &str,
            system_prompt: Option<&str>,
            messages: Vec<Message>,
        ) -> Result<StreamingResponse> {
            self.record(model, system_prompt, &messages);
            let mut builder = MockStreamBuilder::new();
            for chunk in &self.chunks {
                builder = builder.delta(chunk.clone());
            }
            Ok(builder.done().build())
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn agent(backend: ScriptedBackend) -> SentimentAgent<ScriptedBackend> {
        SentimentAgent::builder(backend).model("test-endpoint").build()
    }

    #[tokio::test]
    async fn test_predict_builds_templated_request() {
        let agent = agent(ScriptedBackend::new("positive", &[]));
        let conversation = vec![Message::user("I love this!")];

        agent.predict(&conversation, None, None).await.unwrap();

        let calls = agent.provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (model, system_prompt, messages) = &calls[0];
        assert_eq!(model, "test-endpoint");
        assert_eq!(system_prompt.as_deref(), Some(SENTIMENT_SYSTEM_PROMPT));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Analyze this phrase: I love this!");
    }

    #[tokio::test]
    async fn test_predict_returns_reply_with_fresh_id() {
        let agent = agent(ScriptedBackend::new("positive", &[]));
        let conversation = vec![Message::user("I love this!")];

        let first = agent.predict(&conversation, None, None).await.unwrap();
        let second = agent.predict(&conversation, None, None).await.unwrap();

        assert_eq!(first.content(), "positive");
        assert_eq!(second.content(), "positive");
        assert!(!first.id().unwrap().is_empty());
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_predict_empty_conversation_fails_before_outbound_call() {
        let agent = agent(ScriptedBackend::new("positive", &[]));

        let result = agent.predict(&[], None, None).await;

        assert!(matches!(result, Err(Error::EmptyConversation)));
        assert!(agent.provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_predict_uses_last_message_content() {
        let agent = agent(ScriptedBackend::new("negative", &[]));
        let conversation = vec![
            Message::user("first turn"),
            Message::assistant("ok"),
            Message::user("terrible service"),
        ];

        agent.predict(&conversation, None, None).await.unwrap();

        let calls = agent.provider.calls.lock().unwrap();
        assert_eq!(
            calls[0].2[0].content,
            "Analyze this phrase: terrible service"
        );
    }

    #[tokio::test]
    async fn test_predict_stream_accumulates_with_single_id() {
        let agent = agent(ScriptedBackend::new("", &["neg", "ative"]));
        let conversation = vec![Message::user("terrible service")];

        let stream = agent.predict_stream(&conversation, None, None).await.unwrap();
        let envelopes: Vec<_> = stream
            .map(|r| r.unwrap())
            .collect::<Vec<_>>()
            .await;

        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].content(), "neg");
        assert_eq!(envelopes[1].content(), "negative");
        assert_eq!(envelopes[0].id(), envelopes[1].id());
        assert!(envelopes[1].content().starts_with(envelopes[0].content()));
    }

    #[tokio::test]
    async fn test_predict_stream_skips_empty_deltas() {
        let agent = agent(ScriptedBackend::new("", &["", "pos", "", "itive"]));
        let conversation = vec![Message::user("great")];

        let stream = agent.predict_stream(&conversation, None, None).await.unwrap();
        let contents: Vec<_> = stream
            .map(|r| r.unwrap().content().to_string())
            .collect::<Vec<_>>()
            .await;

        assert_eq!(contents, vec!["pos", "positive"]);
    }

    #[tokio::test]
    async fn test_predict_stream_empty_conversation() {
        let agent = agent(ScriptedBackend::new("", &["x"]));

        let result = agent.predict_stream(&[], None, None).await;

        assert!(matches!(result, Err(Error::EmptyConversation)));
        assert!(agent.provider.calls.lock().unwrap().is_empty());
    }
}
