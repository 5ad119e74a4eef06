//! OpenAI-compatible chat-completion backend
//!
//! Works against the OpenAI API and any compatible model-serving
//! endpoint (Databricks serving endpoints, vLLM, etc.).

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use senta_core::message::Role;

use crate::{Error, HttpConfig, Message, Provider, Result, StreamingChoice, StreamingResponse};

/// OpenAI-compatible API client
pub struct OpenAI {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAI {
    /// Create from API key, targeting the OpenAI API
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, "https://api.openai.com/v1")
    }

    /// Create from environment variables
    ///
    /// Reads `OPENAI_API_KEY` and, if set, `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::BackendAuth("OPENAI_API_KEY not set".to_string()))?;
        match std::env::var("OPENAI_BASE_URL") {
            Ok(base_url) => Self::with_base_url(api_key, base_url),
            Err(_) => Self::new(api_key),
        }
    }

    /// Create with custom base URL (for compatible serving endpoints)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let config = HttpConfig::default();
        let client = config.build_client()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Create for a Databricks workspace's model-serving endpoints
    pub fn databricks(host: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        let base_url = format!("{}/serving-endpoints", host.as_ref().trim_end_matches('/'));
        Self::with_base_url(token, base_url)
    }

    /// Get the base URL this client targets
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| Error::Internal(e.to_string()))?,
        );
        Ok(headers)
    }

    async fn post_chat(&self, request: &ChatRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .headers(self.build_headers()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return Err(Error::BackendAuth(format!(
                    "chat completions rejected with {}: {}",
                    status, text
                )));
            }
            return Err(Error::BackendApi(format!(
                "chat completions failed with {}: {}",
                status, text
            )));
        }

        Ok(response)
    }

    fn convert_messages(system_prompt: Option<&str>, messages: Vec<Message>) -> Vec<WireMessage> {
        let mut result = Vec::with_capacity(messages.len() + 1);

        if let Some(prompt) = system_prompt {
            result.push(WireMessage {
                role: "system".to_string(),
                content: prompt.to_string(),
            });
        }

        for msg in messages {
            result.push(WireMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content,
            });
        }

        result
    }
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
}

/// Role-tagged message on the wire
#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

impl WireMessage {
    fn into_message(self) -> Message {
        let role = match self.role.as_str() {
            "system" => Role::System,
            "user" => Role::User,
            _ => Role::Assistant,
        };
        Message::new(role, self.content)
    }
}

/// Non-streaming completion response
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: WireMessage,
}

/// Streaming chunk
#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        messages: Vec<Message>,
    ) -> Result<Message> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: Self::convert_messages(system_prompt, messages),
            stream: false,
        };

        let response = self.post_chat(&request).await?;
        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| Error::BackendApi(format!("malformed completion response: {}", e)))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::BackendApi("completion returned no choices".to_string()))?;

        Ok(choice.message.into_message())
    }

    async fn stream_completion(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        messages: Vec<Message>,
    ) -> Result<StreamingResponse> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: Self::convert_messages(system_prompt, messages),
            stream: true,
        };

        let response = self.post_chat(&request).await?;
        let stream = response.bytes_stream();

        Ok(StreamingResponse::from_stream(parse_sse_stream(stream)))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Parse a Server-Sent Events byte stream into content deltas
fn parse_sse_stream<S>(stream: S) -> impl Stream<Item = Result<StreamingChoice>>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, reqwest::Error>> + Send + Unpin + 'static,
{
    let sse_buffer = crate::utils::SseBuffer::new();
    let text_buffer = String::new();

    futures::stream::unfold(
        (stream, sse_buffer, text_buffer),
        move |(mut stream, mut bytes_buffer, mut text_buffer)| async move {
            loop {
                // Drain complete SSE messages already buffered before
                // reading more from the network
                if let Some(pos) = text_buffer.find("\n\n") {
                    let message = text_buffer[..pos].to_string();
                    text_buffer = text_buffer[pos + 2..].to_string();

                    if let Some(data) = message.strip_prefix("data: ") {
                        if data.trim() == "[DONE]" {
                            return Some((
                                Ok(StreamingChoice::Done),
                                (stream, bytes_buffer, text_buffer),
                            ));
                        }

                        match serde_json::from_str::<StreamChunk>(data) {
                            Ok(chunk) => {
                                if let Some(choice) = chunk.choices.first() {
                                    if let Some(content) = &choice.delta.content {
                                        if !content.is_empty() {
                                            return Some((
                                                Ok(StreamingChoice::Delta(content.clone())),
                                                (stream, bytes_buffer, text_buffer),
                                            ));
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::warn!("Failed to parse SSE chunk: {}", e);
                            }
                        }
                    }
                    continue;
                }

                // Need more data
                match stream.next().await {
                    Some(Ok(bytes)) => match bytes_buffer.push_and_get_text(&bytes) {
                        Ok(new_text) => {
                            text_buffer.push_str(&new_text);
                        }
                        Err(e) => {
                            return Some((Err(e), (stream, bytes_buffer, text_buffer)));
                        }
                    },
                    Some(Err(e)) => {
                        return Some((Err(Error::Http(e)), (stream, bytes_buffer, text_buffer)));
                    }
                    None => {
                        return None;
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_conversion() {
        let messages = vec![Message::user("Hello"), Message::assistant("Hi there!")];

        let converted = OpenAI::convert_messages(Some("Be helpful"), messages);

        assert_eq!(converted.len(), 3);
        assert_eq!(converted[0].role, "system");
        assert_eq!(converted[0].content, "Be helpful");
        assert_eq!(converted[1].role, "user");
        assert_eq!(converted[2].role, "assistant");
    }

    #[test]
    fn test_request_wire_shape() {
        let request = ChatRequest {
            model: "test-endpoint".to_string(),
            messages: OpenAI::convert_messages(None, vec![Message::user("hi")]),
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "test-endpoint");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_completion_parse() {
        let body = r#"{
            "id": "cmpl-1",
            "model": "test-endpoint",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "positive"}, "finish_reason": "stop"}
            ]
        }"#;

        let completion: ChatCompletion = serde_json::from_str(body).unwrap();
        let message = completion.choices.into_iter().next().unwrap().message.into_message();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "positive");
    }

    #[test]
    fn test_stream_chunk_parse() {
        let data = r#"{"choices":[{"index":0,"delta":{"content":"neg"}}]}"#;
        let chunk: StreamChunk = serde_json::from_str(data).unwrap();
        assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("neg"));

        // Metadata-only delta (role announcement) carries no content
        let data = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
        let chunk: StreamChunk = serde_json::from_str(data).unwrap();
        assert!(chunk.choices[0].delta.content.is_none());
    }

    #[tokio::test]
    async fn test_parse_sse_stream_deltas_and_done() {
        let body = concat!(
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"neg\"}}]}\n\n",
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"ative\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        let bytes_stream = futures::stream::iter(vec![Ok(bytes::Bytes::from_static(
            body.as_bytes(),
        ))]);

        let mut stream = Box::pin(parse_sse_stream(bytes_stream));

        let mut deltas = Vec::new();
        let mut saw_done = false;
        while let Some(item) = stream.next().await {
            match item.unwrap() {
                StreamingChoice::Delta(text) => deltas.push(text),
                StreamingChoice::Done => saw_done = true,
            }
        }

        assert_eq!(deltas, vec!["neg", "ative"]);
        assert!(saw_done);
    }

    #[tokio::test]
    async fn test_parse_sse_stream_split_across_chunks() {
        // One SSE event arriving in two network reads
        let part1 = "data: {\"choices\":[{\"index\":0,\"delta\":{\"cont";
        let part2 = "ent\":\"positive\"}}]}\n\ndata: [DONE]\n\n";
        let bytes_stream = futures::stream::iter(vec![
            Ok(bytes::Bytes::from_static(part1.as_bytes())),
            Ok(bytes::Bytes::from_static(part2.as_bytes())),
        ]);

        let mut stream = Box::pin(parse_sse_stream(bytes_stream));

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.as_delta(), Some("positive"));
        let second = stream.next().await.unwrap().unwrap();
        assert!(second.is_done());
    }
}
