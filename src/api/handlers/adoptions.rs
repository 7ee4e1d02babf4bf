//! Adoption listing and adoption-request handlers.
//!
//! Every status change is delegated to
//! [`AdoptionService`](crate::service::AdoptionService); handlers only map
//! bodies to calls.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AdoptionListQuery, AdoptionListResponse, AdoptionRequestResponse, CreateAdoptionRequest,
    DecideRequest, Decision, FileAdoptionRequest, PaginationParams, PaymentProofRequest,
    PaymentRequest, VerifyPaymentRequest,
};
use crate::app_state::AppState;
use crate::domain::{Actor, Adoption, AdoptionId, AdoptionRequest, AdoptionRequestId};
use crate::error::{ErrorResponse, MarketError};
use crate::service::Outcome;
use crate::service::adoption_service::{NewListing, PaymentSubmission};

fn respond(outcome: Outcome<AdoptionRequest>) -> Json<AdoptionRequestResponse> {
    Json(AdoptionRequestResponse {
        request: outcome.record,
        notification: outcome.notification.into(),
    })
}

/// `POST /adoptions` — Post an adoption listing.
///
/// # Errors
///
/// Returns [`MarketError`] for non-welfare callers or missing fields.
#[utoipa::path(
    post,
    path = "/api/v1/adoptions",
    tag = "Adoptions",
    summary = "Create an adoption listing",
    request_body = CreateAdoptionRequest,
    responses(
        (status = 201, description = "Listing created", body = Adoption),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 403, description = "Caller is not a welfare", body = ErrorResponse),
    )
)]
pub async fn create_listing(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateAdoptionRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let listing = state
        .adoption_service
        .create_listing(
            &actor,
            NewListing {
                name: req.name,
                species: req.species,
                breed: req.breed,
                age: req.age,
                description: req.description,
                images: req.images,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// `GET /adoptions` — List adoption listings.
#[utoipa::path(
    get,
    path = "/api/v1/adoptions",
    tag = "Adoptions",
    summary = "List adoption listings",
    params(AdoptionListQuery),
    responses(
        (status = 200, description = "Paginated listings", body = AdoptionListResponse),
    )
)]
pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<AdoptionListQuery>,
) -> Json<AdoptionListResponse> {
    let listings = state.adoption_service.list_listings(query.status).await;
    let (data, pagination) =
        PaginationParams::from_parts(query.page, query.per_page).paginate(listings);
    Json(AdoptionListResponse { data, pagination })
}

/// `GET /adoptions/{id}` — One listing.
///
/// # Errors
///
/// Returns [`MarketError::NotFound`] for an unknown listing.
#[utoipa::path(
    get,
    path = "/api/v1/adoptions/{id}",
    tag = "Adoptions",
    summary = "Get an adoption listing",
    params(("id" = uuid::Uuid, Path, description = "Listing UUID")),
    responses(
        (status = 200, description = "Listing", body = Adoption),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<Adoption>, MarketError> {
    Ok(Json(
        state
            .adoption_service
            .listing(AdoptionId::from_uuid(id))
            .await?,
    ))
}

/// `POST /adoption-request` — File a pending request.
///
/// # Errors
///
/// Returns [`MarketError`] for non-donor callers, an adopted listing or a
/// duplicate open request.
#[utoipa::path(
    post,
    path = "/api/v1/adoption-request",
    tag = "Adoption requests",
    summary = "File an adoption request",
    request_body = FileAdoptionRequest,
    responses(
        (status = 201, description = "Request filed", body = AdoptionRequest),
        (status = 403, description = "Caller is not a donor", body = ErrorResponse),
        (status = 404, description = "Listing not found", body = ErrorResponse),
        (status = 409, description = "Listing adopted or request already open", body = ErrorResponse),
    )
)]
pub async fn file_request(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<FileAdoptionRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let request = state
        .adoption_service
        .file_request(&actor, req.adoption_id, &req.reason, req.preferred_contact)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// `GET /adoption-request` — Requests visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/adoption-request",
    tag = "Adoption requests",
    summary = "List adoption requests",
    description = "Donors see their own requests; welfare organizations see requests against their listings.",
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<AdoptionRequest>),
        (status = 401, description = "Missing identity headers", body = ErrorResponse),
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    actor: Actor,
) -> Json<Vec<AdoptionRequest>> {
    Json(state.adoption_service.requests_for(&actor).await)
}

/// `GET /adoption-request/{id}` — One request.
///
/// # Errors
///
/// Returns [`MarketError`] for an unknown request or an outsider.
#[utoipa::path(
    get,
    path = "/api/v1/adoption-request/{id}",
    tag = "Adoption requests",
    summary = "Get an adoption request",
    params(("id" = uuid::Uuid, Path, description = "Request UUID")),
    responses(
        (status = 200, description = "Request", body = AdoptionRequest),
        (status = 403, description = "Caller is neither donor nor owner", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<AdoptionRequest>, MarketError> {
    let request = state
        .adoption_service
        .request(&actor, AdoptionRequestId::from_uuid(id))
        .await?;
    Ok(Json(request))
}

/// `PATCH /adoption-request/{id}` — Approve or reject.
///
/// # Errors
///
/// Returns [`MarketError`] unless the caller owns the listing and the
/// request is pending.
#[utoipa::path(
    patch,
    path = "/api/v1/adoption-request/{id}",
    tag = "Adoption requests",
    summary = "Approve or reject a request",
    params(("id" = uuid::Uuid, Path, description = "Request UUID")),
    request_body = DecideRequest,
    responses(
        (status = 200, description = "Request decided", body = AdoptionRequestResponse),
        (status = 403, description = "Caller does not own the listing", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Request not pending or listing unavailable", body = ErrorResponse),
    )
)]
pub async fn decide(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<DecideRequest>,
) -> Result<Json<AdoptionRequestResponse>, MarketError> {
    let id = AdoptionRequestId::from_uuid(id);
    let outcome = match req.status {
        Decision::Approved => state.adoption_service.approve(&actor, id).await?,
        Decision::Rejected => state.adoption_service.reject(&actor, id).await?,
    };
    Ok(respond(outcome))
}

/// `POST /adoption-request/{id}/payment-proof` — Attach payment proof.
///
/// # Errors
///
/// Returns [`MarketError`] unless the caller filed the request and it
/// awaits payment.
#[utoipa::path(
    post,
    path = "/api/v1/adoption-request/{id}/payment-proof",
    tag = "Adoption requests",
    summary = "Submit payment proof",
    params(("id" = uuid::Uuid, Path, description = "Request UUID")),
    request_body = PaymentProofRequest,
    responses(
        (status = 200, description = "Request under review", body = AdoptionRequestResponse),
        (status = 403, description = "Caller did not file the request", body = ErrorResponse),
        (status = 409, description = "Request does not await payment", body = ErrorResponse),
    )
)]
pub async fn submit_payment_proof(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<PaymentProofRequest>,
) -> Result<Json<AdoptionRequestResponse>, MarketError> {
    let outcome = state
        .adoption_service
        .submit_payment_proof(&actor, AdoptionRequestId::from_uuid(id), &req.payment_proof)
        .await?;
    Ok(respond(outcome))
}

/// `POST /adoption-request/{id}/payment` — Pay the adoption fee directly.
///
/// # Errors
///
/// Returns [`MarketError`] for an underpayment, a malformed address, a
/// caller who did not file the request, or a request not awaiting payment.
#[utoipa::path(
    post,
    path = "/api/v1/adoption-request/{id}/payment",
    tag = "Adoption requests",
    summary = "Pay the adoption fee",
    params(("id" = uuid::Uuid, Path, description = "Request UUID")),
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Request under review", body = AdoptionRequestResponse),
        (status = 400, description = "Below the minimum fee or malformed address", body = ErrorResponse),
        (status = 403, description = "Caller did not file the request", body = ErrorResponse),
        (status = 409, description = "Request does not await payment", body = ErrorResponse),
    )
)]
pub async fn pay(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<AdoptionRequestResponse>, MarketError> {
    let outcome = state
        .adoption_service
        .pay(
            &actor,
            AdoptionRequestId::from_uuid(id),
            PaymentSubmission {
                amount: req.amount,
                from_address: req.from_address,
                tx_hash: req.tx_hash,
            },
        )
        .await?;
    Ok(respond(outcome))
}

/// `POST /adoption-request/{id}/verify-payment` — Review a payment.
///
/// # Errors
///
/// Returns [`MarketError`] unless the caller owns the listing and the
/// request is under review.
#[utoipa::path(
    post,
    path = "/api/v1/adoption-request/{id}/verify-payment",
    tag = "Adoption requests",
    summary = "Verify a payment",
    description = "`verified=true` completes the adoption; `verified=false` sends the request back to `payment pending`.",
    params(("id" = uuid::Uuid, Path, description = "Request UUID")),
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment reviewed", body = AdoptionRequestResponse),
        (status = 403, description = "Caller does not own the listing", body = ErrorResponse),
        (status = 409, description = "Request not under review or listing already adopted", body = ErrorResponse),
    )
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<AdoptionRequestResponse>, MarketError> {
    let outcome = state
        .adoption_service
        .verify_payment(&actor, AdoptionRequestId::from_uuid(id), req.verified, req.note)
        .await?;
    Ok(respond(outcome))
}

/// Adoption routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/adoptions", post(create_listing).get(list_listings))
        .route("/adoptions/{id}", get(get_listing))
        .route("/adoption-request", post(file_request).get(list_requests))
        .route("/adoption-request/{id}", get(get_request).patch(decide))
        .route(
            "/adoption-request/{id}/payment-proof",
            post(submit_payment_proof),
        )
        .route("/adoption-request/{id}/payment", post(pay))
        .route("/adoption-request/{id}/verify-payment", post(verify_payment))
}
