use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_food_domain::entities::{MessageType, OutgoingMessage};

/// Optional name for a new chat session
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct PublicCreateSessionRequest {
    pub session_name: Option<String>,
}

/// A message sent to the assistant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicChatMessageRequest {
    #[serde(default)]
    pub content: String,
    /// `text` (default) or `image`
    #[serde(default)]
    #[schema(value_type = String)]
    pub message_type: MessageType,
    /// Base64 JPEG without the data URL prefix
    pub image_data: Option<String>,
}

impl From<PublicChatMessageRequest> for OutgoingMessage {
    fn from(request: PublicChatMessageRequest) -> Self {
        OutgoingMessage {
            content: request.content,
            message_type: request.message_type,
            image_data: request.image_data,
        }
    }
}
