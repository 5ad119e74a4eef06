//! Message and response envelope types for chat agent communication

use serde::{Deserialize, Serialize};

/// Role of the message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message (instructions)
    System,
    /// User message
    User,
    /// Assistant (AI) message
    Assistant,
}

impl Role {
    /// Wire representation of the role
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A message in the conversation
///
/// `id` is only ever set on outbound assistant messages; inbound
/// messages carry `None`. The adapter assigns a fresh id per response
/// and never reuses one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier, assigned to assistant replies only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Role of the sender
    pub role: Role,
    /// Text content of the message
    pub content: String,
}

impl Message {
    /// Create a new message without an id
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: None,
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Set the identifier on this message
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Get the text content of this message
    pub fn text(&self) -> &str {
        &self.content
    }
}

/// Optional per-request context, accepted and passed through unused
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatContext {
    /// Conversation identifier supplied by the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// User identifier supplied by the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Response envelope carrying exactly one completed or partial message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The message produced by the agent
    pub message: Message,
}

impl ChatResponse {
    /// Wrap a message in a response envelope
    pub fn new(message: Message) -> Self {
        Self { message }
    }

    /// Identifier of the enclosed message, if assigned
    pub fn id(&self) -> Option<&str> {
        self.message.id.as_deref()
    }

    /// Content of the enclosed message
    pub fn content(&self) -> &str {
        &self.message.content
    }
}
