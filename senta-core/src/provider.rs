//! Provider trait for chat-completion backends

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;
use crate::streaming::StreamingResponse;

/// Trait for chat-completion backends
///
/// Implement this trait to point the agent at a new model-serving
/// endpoint. The backend owns authentication, timeouts and any retry
/// behavior; the adapter invokes it once per predict call and
/// propagates failures unmodified.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a non-streaming completion request
    ///
    /// # Arguments
    /// * `model` - Serving endpoint / model name to use
    /// * `system_prompt` - Optional system prompt, sent first
    /// * `messages` - Conversation to complete
    ///
    /// Returns the single reply message from `choices[0]`.
    async fn complete(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        messages: Vec<Message>,
    ) -> Result<Message>;

    /// Stream a completion request
    ///
    /// Yields incremental content deltas over an open connection until
    /// the backend closes the stream.
    async fn stream_completion(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        messages: Vec<Message>,
    ) -> Result<StreamingResponse>;

    /// Get backend name (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Check if backend supports streaming
    fn supports_streaming(&self) -> bool {
        true
    }
}
