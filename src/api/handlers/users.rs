//! Account handlers: register, profile, payment address.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{BlockchainAddressRequest, RegisterUserRequest};
use crate::app_state::AppState;
use crate::domain::{Actor, UserAccount, UserId};
use crate::error::{ErrorResponse, MarketError};
use crate::service::user_service::Registration;

/// `POST /users` — Register an account.
///
/// # Errors
///
/// Returns [`MarketError`] on invalid fields or a taken email.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    summary = "Register an account",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Account registered", body = UserAccount),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let account = state
        .user_service
        .register(Registration {
            role: req.role,
            name: req.name,
            email: req.email,
            blockchain_address: req.blockchain_address,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// `GET /users/{id}` — Public profile.
///
/// # Errors
///
/// Returns [`MarketError::NotFound`] for an unknown account.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Get an account",
    params(("id" = uuid::Uuid, Path, description = "Account UUID")),
    responses(
        (status = 200, description = "Account profile", body = UserAccount),
        (status = 404, description = "Account not found", body = ErrorResponse),
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<UserAccount>, MarketError> {
    Ok(Json(state.user_service.profile(UserId::from_uuid(id)).await?))
}

/// `PUT /users/me/blockchain-address` — Set the welfare's payment address.
///
/// # Errors
///
/// Returns [`MarketError`] for non-welfare callers or a malformed address.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/blockchain-address",
    tag = "Users",
    summary = "Set payment-receiving address",
    request_body = BlockchainAddressRequest,
    responses(
        (status = 200, description = "Address stored", body = UserAccount),
        (status = 400, description = "Malformed address", body = ErrorResponse),
        (status = 401, description = "Missing identity headers", body = ErrorResponse),
        (status = 403, description = "Caller is not a welfare", body = ErrorResponse),
    )
)]
pub async fn set_blockchain_address(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<BlockchainAddressRequest>,
) -> Result<Json<UserAccount>, MarketError> {
    let account = state
        .user_service
        .set_blockchain_address(&actor, &req.blockchain_address)
        .await?;
    Ok(Json(account))
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/me/blockchain-address", put(set_blockchain_address))
        .route("/users/{id}", get(profile))
}
