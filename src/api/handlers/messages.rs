//! Inbox handlers.

use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::{Actor, Message, MessageId};
use crate::error::{ErrorResponse, MarketError};

/// `GET /messages` — The caller's inbox, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/messages",
    tag = "Messages",
    summary = "List inbox messages",
    responses(
        (status = 200, description = "Inbox", body = Vec<Message>),
        (status = 401, description = "Missing identity headers", body = ErrorResponse),
    )
)]
pub async fn inbox(State(state): State<AppState>, actor: Actor) -> Json<Vec<Message>> {
    Json(state.user_service.inbox(&actor).await)
}

/// `PATCH /messages/{id}/read` — Mark a message read.
///
/// # Errors
///
/// Returns [`MarketError`] if the message is unknown or addressed to
/// someone else.
#[utoipa::path(
    patch,
    path = "/api/v1/messages/{id}/read",
    tag = "Messages",
    summary = "Mark a message read",
    params(("id" = uuid::Uuid, Path, description = "Message UUID")),
    responses(
        (status = 200, description = "Message marked read", body = Message),
        (status = 403, description = "Not the recipient", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<Message>, MarketError> {
    let message = state
        .user_service
        .mark_read(&actor, MessageId::from_uuid(id))
        .await?;
    Ok(Json(message))
}

/// Inbox routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages", get(inbox))
        .route("/messages/{id}/read", patch(mark_read))
}
