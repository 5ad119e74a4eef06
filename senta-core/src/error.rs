//! Error types for the senta adapter

use thiserror::Error;

/// Result type alias using senta's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the senta adapter
#[derive(Debug, Error)]
pub enum Error {
    // ============ Agent Errors ============
    /// Agent is not properly configured
    #[error("Agent configuration error: {0}")]
    AgentConfig(String),

    /// predict/predict_stream was called with zero messages
    #[error("Conversation is empty: at least one message is required")]
    EmptyConversation,

    // ============ Backend Errors ============
    /// Backend API error
    #[error("Backend API error: {0}")]
    BackendApi(String),

    /// Backend authentication failed
    #[error("Backend authentication error: {0}")]
    BackendAuth(String),

    // ============ Message Errors ============
    /// Message serialization failed
    #[error("Message serialization error: {0}")]
    MessageSerialize(#[from] serde_json::Error),

    // ============ Streaming Errors ============
    /// Stream interrupted
    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    // ============ Network Errors ============
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ============ Generic Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a new agent configuration error
    pub fn agent_config(msg: impl Into<String>) -> Self {
        Self::AgentConfig(msg.into())
    }

    /// Create a new backend API error
    pub fn backend_api(msg: impl Into<String>) -> Self {
        Self::BackendApi(msg.into())
    }

    /// Check if this error is retryable by the caller
    ///
    /// The adapter itself never retries; this is a hint for whoever
    /// invoked predict/predict_stream.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StreamInterrupted(_) | Self::Http(_))
    }
}
