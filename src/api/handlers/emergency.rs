//! Emergency triage handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    AssignEmergencyRequest, ConvertEmergencyRequest, ConvertEmergencyResponse, DiagnosisRequest,
    EmergencyListQuery, EmergencyListResponse, PaginationParams, ReportEmergencyRequest,
};
use crate::app_state::AppState;
use crate::domain::{Actor, Emergency, EmergencyId};
use crate::error::{ErrorResponse, MarketError};
use crate::service::emergency_service::{Conversion, NewEmergency};

/// `POST /emergency` — Report an emergency.
///
/// # Errors
///
/// Returns [`MarketError`] for unregistered callers or missing fields.
#[utoipa::path(
    post,
    path = "/api/v1/emergency",
    tag = "Emergencies",
    summary = "Report an emergency",
    request_body = ReportEmergencyRequest,
    responses(
        (status = 201, description = "Emergency reported", body = Emergency),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 403, description = "Caller is not registered", body = ErrorResponse),
    )
)]
pub async fn report(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<ReportEmergencyRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let emergency = state
        .emergency_service
        .report(
            &actor,
            NewEmergency {
                title: req.title,
                description: req.description,
                location: req.location,
                animal_type: req.animal_type,
                images: req.images,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(emergency)))
}

/// `GET /emergency` — List emergencies.
#[utoipa::path(
    get,
    path = "/api/v1/emergency",
    tag = "Emergencies",
    summary = "List emergencies",
    params(EmergencyListQuery),
    responses(
        (status = 200, description = "Paginated emergencies", body = EmergencyListResponse),
    )
)]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<EmergencyListQuery>,
) -> Json<EmergencyListResponse> {
    let emergencies = state.emergency_service.list(query.status).await;
    let (data, pagination) =
        PaginationParams::from_parts(query.page, query.per_page).paginate(emergencies);
    Json(EmergencyListResponse { data, pagination })
}

/// `GET /emergency/{id}` — One emergency.
///
/// # Errors
///
/// Returns [`MarketError::NotFound`] for an unknown emergency.
#[utoipa::path(
    get,
    path = "/api/v1/emergency/{id}",
    tag = "Emergencies",
    summary = "Get an emergency",
    params(("id" = uuid::Uuid, Path, description = "Emergency UUID")),
    responses(
        (status = 200, description = "Emergency", body = Emergency),
        (status = 404, description = "Emergency not found", body = ErrorResponse),
    )
)]
pub async fn get_emergency(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<Emergency>, MarketError> {
    Ok(Json(
        state
            .emergency_service
            .get(EmergencyId::from_uuid(id))
            .await?,
    ))
}

/// `PATCH /emergency/{id}/assign` — Assign a doctor.
///
/// # Errors
///
/// Returns [`MarketError`] for non-welfare callers, a non-doctor assignee
/// or an emergency that is no longer pending.
#[utoipa::path(
    patch,
    path = "/api/v1/emergency/{id}/assign",
    tag = "Emergencies",
    summary = "Assign a doctor to an emergency",
    params(("id" = uuid::Uuid, Path, description = "Emergency UUID")),
    request_body = AssignEmergencyRequest,
    responses(
        (status = 200, description = "Doctor assigned", body = Emergency),
        (status = 400, description = "Assignee is not a doctor", body = ErrorResponse),
        (status = 403, description = "Caller is not a welfare", body = ErrorResponse),
        (status = 409, description = "Emergency already in progress or closed", body = ErrorResponse),
    )
)]
pub async fn assign_doctor(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AssignEmergencyRequest>,
) -> Result<Json<Emergency>, MarketError> {
    let emergency = state
        .emergency_service
        .assign_doctor(&actor, EmergencyId::from_uuid(id), req.doctor_id)
        .await?;
    Ok(Json(emergency))
}

/// `POST /emergency/{id}/diagnosis` — Record the assigned doctor's diagnosis.
///
/// # Errors
///
/// Returns [`MarketError`] unless the caller is the assigned doctor.
#[utoipa::path(
    post,
    path = "/api/v1/emergency/{id}/diagnosis",
    tag = "Emergencies",
    summary = "Record a diagnosis",
    params(("id" = uuid::Uuid, Path, description = "Emergency UUID")),
    request_body = DiagnosisRequest,
    responses(
        (status = 200, description = "Diagnosis recorded", body = Emergency),
        (status = 403, description = "Caller is not the assigned doctor", body = ErrorResponse),
        (status = 409, description = "Emergency closed", body = ErrorResponse),
    )
)]
pub async fn diagnose(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<DiagnosisRequest>,
) -> Result<Json<Emergency>, MarketError> {
    let emergency = state
        .emergency_service
        .diagnose(&actor, EmergencyId::from_uuid(id), &req.diagnosis)
        .await?;
    Ok(Json(emergency))
}

/// `POST /emergency/{id}/convert-to-case` — Open a fundraising case.
///
/// # Errors
///
/// Returns [`MarketError`] for non-welfare callers, a closed emergency, a
/// welfare without a wallet address or a bad target amount.
#[utoipa::path(
    post,
    path = "/api/v1/emergency/{id}/convert-to-case",
    tag = "Emergencies",
    summary = "Convert an emergency into a case",
    description = "Creates an active case carrying the emergency's details and the welfare's wallet, and closes the emergency.",
    params(("id" = uuid::Uuid, Path, description = "Emergency UUID")),
    request_body = ConvertEmergencyRequest,
    responses(
        (status = 201, description = "Case opened", body = ConvertEmergencyResponse),
        (status = 400, description = "Welfare has no wallet address or bad target", body = ErrorResponse),
        (status = 403, description = "Caller is not a welfare", body = ErrorResponse),
        (status = 404, description = "Emergency not found", body = ErrorResponse),
        (status = 409, description = "Emergency already converted or closed", body = ErrorResponse),
    )
)]
pub async fn convert_to_case(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    body: Option<Json<ConvertEmergencyRequest>>,
) -> Result<impl IntoResponse, MarketError> {
    let Json(req) = body.unwrap_or_default();
    let outcome = state
        .emergency_service
        .convert_to_case(
            &actor,
            EmergencyId::from_uuid(id),
            Conversion {
                title: req.title,
                target_amount: req.target_amount,
                cost_breakdown: req.cost_breakdown,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ConvertEmergencyResponse {
            case: outcome.record,
            notification: outcome.notification.into(),
        }),
    ))
}

/// Emergency routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/emergency", post(report).get(list))
        .route("/emergency/{id}", get(get_emergency))
        .route("/emergency/{id}/assign", patch(assign_doctor))
        .route("/emergency/{id}/diagnosis", post(diagnose))
        .route("/emergency/{id}/convert-to-case", post(convert_to_case))
}
