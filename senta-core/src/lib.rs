//! # Senta Core - Sentiment Chat Agent Adapter
//!
//! Core types and traits for the Senta adapter.
//!
//! This crate provides:
//! - Agent adapter (`agent`) - predict / predict_stream entry points
//! - Message types (`message`) - conversation messages and envelopes
//! - Backend trait (`provider`) - chat-completion backend abstraction
//! - Streaming (`streaming`) - stream response handling
//! - Trace wrapper (`trace`) - per-call instrumentation
//! - Logging (`logging`) - subscriber setup with file rotation

#![warn(missing_docs)]

pub mod agent;
pub mod error;
pub mod logging;
pub mod message;
pub mod provider;
pub mod streaming;
pub mod trace;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::agent::{AgentBuilder, AgentConfig, ResponseStream, SentimentAgent};
    pub use crate::error::{Error, Result};
    pub use crate::message::{ChatContext, ChatResponse, Message, Role};
    pub use crate::provider::Provider;
    pub use crate::streaming::{StreamingChoice, StreamingResponse};
    pub use crate::trace::{traced, TraceGuard};
}
