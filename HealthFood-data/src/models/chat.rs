use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            other => Err(format!("invalid chat role: {}", other)),
        }
    }
}

/// Kind of payload carried by a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::File => "file",
        }
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageType::Text),
            "image" => Ok(MessageType::Image),
            "file" => Ok(MessageType::File),
            other => Err(format!("invalid message type: {}", other)),
        }
    }
}

/// Chat session listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSessionRecord {
    pub id: i64,
    pub health_profile_id: i64,
    pub session_name: Option<String>,
    pub started_at: String,
    pub last_message_at: String,
    pub message_count: i64,
}

/// A session joined with the profile and owner it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSessionContext {
    pub session_id: i64,
    pub health_profile_id: i64,
    pub user_id: i64,
    pub profile_name: String,
    pub conditions_text: Option<String>,
    pub conditions_json: Value,
    pub weight: Option<f64>,
    pub height: Option<f64>,
}

/// Stored chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    pub id: i64,
    pub session_id: i64,
    pub role: ChatRole,
    pub content: String,
    pub message_type: MessageType,
    /// `{}` when the message carries no metadata
    pub metadata: Value,
    pub created_at: String,
}

/// Input for appending a message to a session
#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub session_id: i64,
    pub role: ChatRole,
    pub content: String,
    pub message_type: MessageType,
    pub metadata: Option<Value>,
}
