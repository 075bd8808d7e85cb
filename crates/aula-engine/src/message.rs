//! Message types for the displayed conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The student typing into the chat.
    User,
    /// The assistant (model) reply, including synthetic error messages.
    Assistant,
}

/// A single message in the displayed conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: Role,
    /// Message content.
    pub text: String,
    /// When the message was appended.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let user_msg = Message::user("Hola");
        assert_eq!(user_msg.role, Role::User);
        assert_eq!(user_msg.text, "Hola");

        let assistant_msg = Message::assistant("¡Hola! ¿En qué te ayudo?");
        assert_eq!(assistant_msg.role, Role::Assistant);
    }

    #[test]
    fn test_message_json_round_trip() {
        let msg = Message::user("¿Qué es un algoritmo?");
        let json = serde_json::to_string(&msg).expect("serialize message");
        assert!(json.contains("\"role\":\"user\""));

        let restored: Message = serde_json::from_str(&json).expect("deserialize message");
        assert_eq!(restored.role, msg.role);
        assert_eq!(restored.text, msg.text);
        assert_eq!(restored.created_at, msg.created_at);
    }
}
