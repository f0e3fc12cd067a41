use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{debug, instrument};

use health_food_domain::auth::CurrentUser;
use health_food_domain::entities::{ChatReply, ChatSession, ConversationMessage};

use crate::api::state::AppState;
use crate::entities::chat::{PublicChatMessageRequest, PublicCreateSessionRequest};
use crate::entities::common::{ApiResult, ErrorResponse};

#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/chats",
    params(("profile_id" = i64, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Recent sessions, newest first", body = [ChatSession]),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
) -> ApiResult<Json<Vec<ChatSession>>> {
    Ok(Json(state.services.chat.list_sessions(profile_id, user.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/chats",
    params(("profile_id" = i64, Path, description = "Profile ID")),
    request_body = PublicCreateSessionRequest,
    responses(
        (status = 201, description = "Session opened", body = ChatSession),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_session(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
    request: Option<Json<PublicCreateSessionRequest>>,
) -> ApiResult<impl IntoResponse> {
    let name = request.and_then(|Json(request)| request.session_name);
    let session = state
        .services
        .chat
        .create_session(profile_id, user.id, name)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    get,
    path = "/api/chats/{session_id}/messages",
    params(("session_id" = i64, Path, description = "Chat session ID")),
    responses(
        (status = 200, description = "Messages in chronological order", body = [ConversationMessage]),
        (status = 404, description = "Session not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(session_id): Path<i64>,
) -> ApiResult<Json<Vec<ConversationMessage>>> {
    Ok(Json(state.services.chat.list_messages(session_id, user.id).await?))
}

/// Send a text or image message and receive the assistant reply
///
/// Without a working AI backend the reply is rule-based advice built
/// from the profile conditions.
#[utoipa::path(
    post,
    path = "/api/chats/{session_id}/messages",
    params(("session_id" = i64, Path, description = "Chat session ID")),
    request_body = PublicChatMessageRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatReply),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(session_id): Path<i64>,
    Json(request): Json<PublicChatMessageRequest>,
) -> ApiResult<Json<ChatReply>> {
    debug!("Message of type {:?}", request.message_type);
    let reply = state
        .services
        .chat
        .send_message(session_id, user.id, request.into())
        .await?;
    Ok(Json(reply))
}
