use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{info, instrument, warn};

use crate::api::handlers::documents::read_file_field;
use crate::api::state::AppState;
use crate::entities::common::{ApiResult, ErrorResponse};
use crate::entities::speech::{
    SpeechStatusResponse, SpeechToTextForm, SpeechToTextResponse, TextToSpeechRequest, TextToSpeechResponse,
};

/// Synthesize an assistant reply into playable audio
#[utoipa::path(
    post,
    path = "/api/speech/tts",
    request_body = TextToSpeechRequest,
    responses(
        (status = 200, description = "Audio data URL, or success=false when synthesis failed", body = TextToSpeechResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "speech"
)]
#[instrument(skip(state, request), fields(chars = request.text.chars().count()))]
pub async fn text_to_speech(
    State(state): State<AppState>,
    Json(request): Json<TextToSpeechRequest>,
) -> Json<TextToSpeechResponse> {
    if request.text.trim().is_empty() {
        return Json(TextToSpeechResponse {
            success: false,
            audio_url: None,
            message: "Text is empty".to_string(),
        });
    }

    match state.speech.synthesize(&request.text).await {
        Some(audio_url) => Json(TextToSpeechResponse {
            success: true,
            audio_url: Some(audio_url),
            message: "Audio generated".to_string(),
        }),
        None => {
            warn!("Speech synthesis produced no audio");
            Json(TextToSpeechResponse {
                success: false,
                audio_url: None,
                message: "Could not generate audio".to_string(),
            })
        }
    }
}

/// Transcribe a recorded question
#[utoipa::path(
    post,
    path = "/api/speech/stt",
    request_body(content = SpeechToTextForm, content_type = "multipart/form-data", description = "WAV, OGG or WebM clip in the `audio` field"),
    responses(
        (status = 200, description = "Recognized text, or success=false when nothing was recognized", body = SpeechToTextResponse),
        (status = 400, description = "Missing or empty audio", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "speech"
)]
#[instrument(skip(state, multipart))]
pub async fn speech_to_text(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<SpeechToTextResponse>> {
    let (_, audio) = read_file_field(&mut multipart, "audio").await?;
    if audio.is_empty() {
        return Err(ErrorResponse::bad_request("Audio file is empty"));
    }
    info!("Recognizing {} bytes of audio", audio.len());

    let response = match state.speech.recognize(audio).await {
        Some(text) => SpeechToTextResponse {
            success: true,
            text: Some(text),
            message: "Speech recognized".to_string(),
        },
        None => SpeechToTextResponse {
            success: false,
            text: None,
            message: "Could not recognize speech".to_string(),
        },
    };
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/speech/status",
    responses(
        (status = 200, description = "Whether speech is configured and which voices it uses", body = SpeechStatusResponse),
    ),
    security(("bearer" = [])),
    tag = "speech"
)]
pub async fn speech_status(State(state): State<AppState>) -> Json<SpeechStatusResponse> {
    Json(SpeechStatusResponse {
        available: state.speech.is_available(),
        voice: state.speech.voice(),
        voices: state.speech.voices(),
    })
}
