use axum::{extract::State, Json};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::mentor::chat::{chat_turn, ChatRequest, ChatResponse};
use crate::state::AppState;

/// POST /api/v1/mentor/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let reply = chat_turn(state.llm.as_ref(), &request).await?;
    Ok(Json(ChatResponse {
        success: true,
        reply,
    }))
}
