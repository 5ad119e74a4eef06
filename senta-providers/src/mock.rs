//! Mock backend for testing
//!
//! Records every outbound request so tests can assert on request
//! construction, and can be scripted to fail mid-stream.

use std::sync::Mutex;

use async_trait::async_trait;

use senta_core::streaming::MockStreamBuilder;

use crate::{Error, Message, Provider, Result, StreamingResponse};

/// One outbound request captured by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Model the caller targeted
    pub model: String,
    /// System prompt, if any
    pub system_prompt: Option<String>,
    /// Messages sent to the backend
    pub messages: Vec<Message>,
    /// Whether the streaming entry point was used
    pub streaming: bool,
}

/// A mock backend with a predefined response
pub struct MockProvider {
    response: String,
    chunk_size: usize,
    scripted_chunks: Option<Vec<String>>,
    fail_after_chunks: Option<usize>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockProvider {
    /// Create a new mock backend with a predefined response
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            chunk_size: 10,
            scripted_chunks: None,
            fail_after_chunks: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Set how many characters each streamed delta carries
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Script the exact deltas the stream yields, overriding chunking
    pub fn with_chunks<I, S>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scripted_chunks = Some(chunks.into_iter().map(Into::into).collect());
        self
    }

    /// Make the stream fail after yielding `chunks` deltas
    pub fn fail_after_chunks(mut self, chunks: usize) -> Self {
        self.fail_after_chunks = Some(chunks);
        self
    }

    /// Requests recorded so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of requests recorded so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn record(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        messages: &[Message],
        streaming: bool,
    ) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                model: model.to_string(),
                system_prompt: system_prompt.map(str::to_string),
                messages: messages.to_vec(),
                streaming,
            });
    }

    fn chunks(&self) -> Vec<String> {
        if let Some(chunks) = &self.scripted_chunks {
            return chunks.clone();
        }
        self.response
            .chars()
            .collect::<Vec<_>>()
            .chunks(self.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        messages: Vec<Message>,
    ) -> Result<Message> {
        self.record(model, system_prompt, &messages, false);
        Ok(Message::assistant(self.response.clone()))
    }

    async fn stream_completion(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        messages: Vec<Message>,
    ) -> Result<StreamingResponse> {
        self.record(model, system_prompt, &messages, true);

        let mut builder = MockStreamBuilder::new();
        match self.fail_after_chunks {
            Some(limit) => {
                for chunk in self.chunks().into_iter().take(limit) {
                    builder = builder.delta(chunk);
                }
                builder = builder.error(Error::StreamInterrupted(
                    "mock backend failed mid-stream".to_string(),
                ));
            }
            None => {
                for chunk in self.chunks() {
                    builder = builder.delta(chunk);
                }
                builder = builder.done();
            }
        }

        Ok(builder.build())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
