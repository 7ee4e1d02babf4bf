//! Donation handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{DonateRequest, DonationResponse, ProcessDonationRequest};
use crate::app_state::AppState;
use crate::domain::{Actor, Donation};
use crate::error::{ErrorResponse, MarketError};
use crate::service::Outcome;

fn respond(outcome: Outcome<Donation>) -> (StatusCode, Json<DonationResponse>) {
    (
        StatusCode::CREATED,
        Json(DonationResponse {
            donation: outcome.record,
            notification: outcome.notification.into(),
        }),
    )
}

/// `POST /donor/donate` — Record a donor's on-chain donation.
///
/// # Errors
///
/// Returns [`MarketError`] for non-donor callers, an unknown or completed
/// case, a bad amount or hash, or a replayed transfer.
#[utoipa::path(
    post,
    path = "/api/v1/donor/donate",
    tag = "Donations",
    summary = "Record a donation",
    description = "The USD value is computed from the server's rate; `amount_usd` in the body is only compared against it.",
    request_body = DonateRequest,
    responses(
        (status = 201, description = "Donation recorded", body = DonationResponse),
        (status = 400, description = "Invalid amount or hash", body = ErrorResponse),
        (status = 403, description = "Caller is not a donor", body = ErrorResponse),
        (status = 404, description = "Case not found", body = ErrorResponse),
        (status = 409, description = "Transfer already recorded or case completed", body = ErrorResponse),
    )
)]
pub async fn donate(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<DonateRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let outcome = state.donation_service.donate(&actor, req.into()).await?;
    Ok(respond(outcome))
}

/// `POST /welfare/process-donation` — Record a donation received by a welfare.
///
/// # Errors
///
/// Returns [`MarketError`] unless the caller owns the case, plus the same
/// validation failures as `/donor/donate`.
#[utoipa::path(
    post,
    path = "/api/v1/welfare/process-donation",
    tag = "Donations",
    summary = "Process a received donation",
    request_body = ProcessDonationRequest,
    responses(
        (status = 201, description = "Donation recorded", body = DonationResponse),
        (status = 400, description = "Invalid amount or hash", body = ErrorResponse),
        (status = 403, description = "Caller does not own the case", body = ErrorResponse),
        (status = 409, description = "Transfer already recorded or case completed", body = ErrorResponse),
    )
)]
pub async fn process_donation(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<ProcessDonationRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let outcome = state
        .donation_service
        .process(&actor, req.donor_id, req.donation.into())
        .await?;
    Ok(respond(outcome))
}

/// Donation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/donor/donate", post(donate))
        .route("/welfare/process-donation", post(process_donation))
}
