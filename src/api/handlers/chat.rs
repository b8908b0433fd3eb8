use crate::{
    AppState,
    memory::load_profile,
    turn::TurnProcessor,
    types::{AppError, ChatRequest, ChatResponse, Result, UserProfile},
};
use axum::{
    Json,
    extract::{Path, State},
};

/// Process one conversational turn for a user
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply for this turn", body = ChatResponse),
        (status = 400, description = "Invalid input"),
        (status = 500, description = "Model or store failure")
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    if payload.user_id.is_empty() {
        return Err(AppError::InvalidInput("user_id must not be empty".into()));
    }
    if payload.message.is_empty() {
        return Err(AppError::InvalidInput("message must not be empty".into()));
    }

    let reply = state
        .processor
        .process_turn(
            &payload.user_id,
            &payload.message,
            payload.intent.as_deref(),
        )
        .await?;

    Ok(Json(ChatResponse {
        reply,
        thread_id: TurnProcessor::thread_id(&payload.user_id),
        user_id: payload.user_id,
    }))
}

/// Inspect the stored profile for a user
#[utoipa::path(
    get,
    path = "/api/memory/{user_id}",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Stored profile", body = UserProfile),
        (status = 404, description = "No profile stored for this user")
    ),
    tag = "chat"
)]
pub async fn get_user_memory(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>> {
    let profile = load_profile(state.memory.as_ref(), &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No profile stored for user '{}'", user_id)))?;

    Ok(Json(profile))
}
