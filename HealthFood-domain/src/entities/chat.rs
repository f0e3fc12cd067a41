use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub use health_food_data::models::{ChatRole, MessageType};

/// A conversation attached to a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ChatSession {
    pub id: i64,
    pub health_profile_id: i64,
    pub session_name: Option<String>,
    pub started_at: String,
    pub last_message_at: String,
    pub message_count: i64,
}

/// A stored chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ConversationMessage {
    pub id: i64,
    pub session_id: i64,
    /// `user` or `assistant`
    #[cfg_attr(feature = "with-api", schema(value_type = String))]
    pub role: ChatRole,
    pub content: String,
    /// `text`, `image` or `file`
    #[cfg_attr(feature = "with-api", schema(value_type = String))]
    pub message_type: MessageType,
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub metadata: Value,
    pub created_at: String,
}

/// A message the user sends to the assistant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub content: String,
    pub message_type: MessageType,
    /// Base64 JPEG, without the data URL prefix
    pub image_data: Option<String>,
}

/// The assistant's answer to one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ChatReply {
    pub message: String,
    pub ai_response: String,
}
