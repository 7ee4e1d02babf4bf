//! Case handlers: create, list, get, doctor assignment, donations, updates.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    AssignDoctorRequest, CaseListQuery, CaseListResponse, CreateCaseRequest,
    CreateCaseUpdateRequest, DeleteUpdateResponse, PaginationParams, PublishUpdateRequest,
};
use crate::app_state::AppState;
use crate::domain::{Actor, CaseId, CaseUpdate, CaseUpdateId, Donation};
use crate::error::{ErrorResponse, MarketError};
use crate::service::case_service::{CaseView, NewCase, NewUpdate};

/// `POST /cases` — Open a fundraising case.
///
/// # Errors
///
/// Returns [`MarketError`] for non-welfare callers, a missing payment
/// address or an invalid target.
#[utoipa::path(
    post,
    path = "/api/v1/cases",
    tag = "Cases",
    summary = "Create a case",
    description = "The target is the sum of `cost_breakdown` when it is non-empty, otherwise `target_amount`.",
    request_body = CreateCaseRequest,
    responses(
        (status = 201, description = "Case created", body = CaseView),
        (status = 400, description = "Invalid fields or no payment address", body = ErrorResponse),
        (status = 403, description = "Caller is not a welfare", body = ErrorResponse),
    )
)]
pub async fn create_case(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateCaseRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let view = state
        .case_service
        .create(
            &actor,
            NewCase {
                title: req.title,
                description: req.description,
                image: req.image,
                target_amount: req.target_amount,
                cost_breakdown: req.cost_breakdown,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /cases` — List cases.
#[utoipa::path(
    get,
    path = "/api/v1/cases",
    tag = "Cases",
    summary = "List cases",
    params(CaseListQuery),
    responses(
        (status = 200, description = "Paginated case list", body = CaseListResponse),
    )
)]
pub async fn list_cases(
    State(state): State<AppState>,
    Query(query): Query<CaseListQuery>,
) -> Json<CaseListResponse> {
    let cases = state.case_service.list(query.status).await;
    let (data, pagination) =
        PaginationParams::from_parts(query.page, query.per_page).paginate(cases);
    Json(CaseListResponse { data, pagination })
}

/// `GET /cases/{id}` — Case details with `has_updates`.
///
/// # Errors
///
/// Returns [`MarketError::NotFound`] for an unknown case.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}",
    tag = "Cases",
    summary = "Get a case",
    params(("id" = uuid::Uuid, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Case details", body = CaseView),
        (status = 404, description = "Case not found", body = ErrorResponse),
    )
)]
pub async fn get_case(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<CaseView>, MarketError> {
    Ok(Json(state.case_service.get(CaseId::from_uuid(id)).await?))
}

/// `PATCH /cases/{id}/doctor` — Assign a doctor to a case.
///
/// # Errors
///
/// Returns [`MarketError`] unless the caller owns the case and the target
/// is a registered doctor.
#[utoipa::path(
    patch,
    path = "/api/v1/cases/{id}/doctor",
    tag = "Cases",
    summary = "Assign a doctor",
    params(("id" = uuid::Uuid, Path, description = "Case UUID")),
    request_body = AssignDoctorRequest,
    responses(
        (status = 200, description = "Doctor assigned", body = CaseView),
        (status = 400, description = "Not a registered doctor", body = ErrorResponse),
        (status = 403, description = "Caller does not own the case", body = ErrorResponse),
        (status = 404, description = "Case not found", body = ErrorResponse),
    )
)]
pub async fn assign_doctor(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AssignDoctorRequest>,
) -> Result<Json<CaseView>, MarketError> {
    let view = state
        .case_service
        .assign_doctor(&actor, CaseId::from_uuid(id), req.doctor_id)
        .await?;
    Ok(Json(view))
}

/// `GET /cases/{id}/donations` — Donations recorded for a case.
///
/// # Errors
///
/// Returns [`MarketError::NotFound`] for an unknown case.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/donations",
    tag = "Cases",
    summary = "List a case's donations",
    params(("id" = uuid::Uuid, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Donations, newest first", body = Vec<Donation>),
        (status = 404, description = "Case not found", body = ErrorResponse),
    )
)]
pub async fn case_donations(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<Vec<Donation>>, MarketError> {
    let donations = state
        .donation_service
        .for_case(CaseId::from_uuid(id))
        .await?;
    Ok(Json(donations))
}

/// `POST /cases/{id}/updates` — Post an unpublished update.
///
/// # Errors
///
/// Returns [`MarketError`] if the caller may not post this kind of update.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/updates",
    tag = "Case updates",
    summary = "Post a case update",
    description = "The owning welfare posts `progress` and `success_story` updates; the assigned doctor posts `diagnosis` updates.",
    params(("id" = uuid::Uuid, Path, description = "Case UUID")),
    request_body = CreateCaseUpdateRequest,
    responses(
        (status = 201, description = "Update posted", body = CaseUpdate),
        (status = 403, description = "Caller may not post this update", body = ErrorResponse),
        (status = 404, description = "Case not found", body = ErrorResponse),
    )
)]
pub async fn post_update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<CreateCaseUpdateRequest>,
) -> Result<impl IntoResponse, MarketError> {
    let update = state
        .case_service
        .post_update(
            &actor,
            CaseId::from_uuid(id),
            NewUpdate {
                kind: req.kind,
                title: req.title,
                content: req.content,
                images: req.images,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(update)))
}

/// `GET /cases/{id}/updates` — Published updates.
///
/// # Errors
///
/// Returns [`MarketError::NotFound`] for an unknown case.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/updates",
    tag = "Case updates",
    summary = "List published updates",
    params(("id" = uuid::Uuid, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "Published updates", body = Vec<CaseUpdate>),
        (status = 404, description = "Case not found", body = ErrorResponse),
    )
)]
pub async fn published_updates(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<Vec<CaseUpdate>>, MarketError> {
    let updates = state
        .case_service
        .published_updates(CaseId::from_uuid(id))
        .await?;
    Ok(Json(updates))
}

/// `GET /cases/{id}/updates/all` — Every update, for owner or doctor.
///
/// # Errors
///
/// Returns [`MarketError`] for an unknown case or an outsider.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/updates/all",
    tag = "Case updates",
    summary = "List all updates",
    params(("id" = uuid::Uuid, Path, description = "Case UUID")),
    responses(
        (status = 200, description = "All updates", body = Vec<CaseUpdate>),
        (status = 403, description = "Caller is neither owner nor doctor", body = ErrorResponse),
        (status = 404, description = "Case not found", body = ErrorResponse),
    )
)]
pub async fn all_updates(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<Vec<CaseUpdate>>, MarketError> {
    let updates = state
        .case_service
        .all_updates(&actor, CaseId::from_uuid(id))
        .await?;
    Ok(Json(updates))
}

/// `PATCH /case-updates/{id}` — Publish or hide an update.
///
/// # Errors
///
/// Returns [`MarketError`] unless the caller owns the case.
#[utoipa::path(
    patch,
    path = "/api/v1/case-updates/{id}",
    tag = "Case updates",
    summary = "Publish or hide an update",
    params(("id" = uuid::Uuid, Path, description = "Case update UUID")),
    request_body = PublishUpdateRequest,
    responses(
        (status = 200, description = "Visibility changed", body = CaseUpdate),
        (status = 403, description = "Caller does not own the case", body = ErrorResponse),
        (status = 404, description = "Update not found", body = ErrorResponse),
    )
)]
pub async fn set_published(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<PublishUpdateRequest>,
) -> Result<Json<CaseUpdate>, MarketError> {
    let update = state
        .case_service
        .set_published(&actor, CaseUpdateId::from_uuid(id), req.is_published)
        .await?;
    Ok(Json(update))
}

/// `DELETE /case-updates/{id}` — Remove an update.
///
/// # Errors
///
/// Returns [`MarketError`] unless the caller owns the case or wrote the
/// update.
#[utoipa::path(
    delete,
    path = "/api/v1/case-updates/{id}",
    tag = "Case updates",
    summary = "Delete an update",
    params(("id" = uuid::Uuid, Path, description = "Case update UUID")),
    responses(
        (status = 200, description = "Update deleted", body = DeleteUpdateResponse),
        (status = 403, description = "Caller may not delete it", body = ErrorResponse),
        (status = 404, description = "Update not found", body = ErrorResponse),
    )
)]
pub async fn delete_update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<DeleteUpdateResponse>, MarketError> {
    let update_id = CaseUpdateId::from_uuid(id);
    let has_updates = state.case_service.delete_update(&actor, update_id).await?;
    Ok(Json(DeleteUpdateResponse {
        deleted: update_id,
        has_updates,
    }))
}

/// Case and case-update routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cases", post(create_case).get(list_cases))
        .route("/cases/{id}", get(get_case))
        .route("/cases/{id}/doctor", patch(assign_doctor))
        .route("/cases/{id}/donations", get(case_donations))
        .route("/cases/{id}/updates", post(post_update).get(published_updates))
        .route("/cases/{id}/updates/all", get(all_updates))
        .route(
            "/case-updates/{id}",
            patch(set_published).delete(delete_update),
        )
}
