use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TextToSpeechRequest {
    pub text: String,
}

/// Multipart form of a speech-to-text request
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct SpeechToTextForm {
    /// WAV, OGG or WebM clip
    #[schema(value_type = String, format = Binary)]
    pub audio: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TextToSpeechResponse {
    pub success: bool,
    /// `data:audio/mp3;base64,...`
    pub audio_url: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SpeechToTextResponse {
    pub success: bool,
    pub text: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SpeechStatusResponse {
    pub available: bool,
    pub voice: String,
    pub voices: Vec<String>,
}
