//! Shared types used across modules
//!
//! This module contains the conversation types that the gateway, the
//! coach, and the CLI all pass around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Convert to the chat-completion API role string
    pub fn to_api_string(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    /// Parse from a chat-completion API role string
    pub fn from_api_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
            Role::System => write!(f, "System"),
        }
    }
}

/// How a message entered the conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Modality {
    Text,
    Audio,
}

/// A single message in a practice conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub modality: Modality,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            modality: Modality::Text,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            modality: Modality::Text,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            modality: Modality::Text,
        }
    }

    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }
}

/// One practice conversation, discarded when a new one starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    /// Append a message; insertion order is conversation order
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Render the conversation as `Role: content` lines, one per message
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_api_string_round_trip() {
        for role in [Role::User, Role::Assistant, Role::System] {
            assert_eq!(Role::from_api_string(role.to_api_string()), Some(role));
        }
        assert_eq!(Role::from_api_string("ASSISTANT"), Some(Role::Assistant));
        assert_eq!(Role::from_api_string("tool"), None);
    }

    #[test]
    fn test_session_preserves_order() {
        let mut session = Session::new();
        session.push(ChatMessage::user("hello"));
        session.push(ChatMessage::assistant("hi there"));
        session.push(ChatMessage::user("how are you?"));

        assert_eq!(session.len(), 3);
        assert_eq!(session.messages[0].content, "hello");
        assert_eq!(session.messages[1].role, Role::Assistant);
        assert_eq!(
            session.transcript(),
            "User: hello\nAssistant: hi there\nUser: how are you?"
        );
    }

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::user("spoken answer").with_modality(Modality::Audio);
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.modality, Modality::Audio);
        assert_eq!(ChatMessage::system("rules").modality, Modality::Text);
    }
}
