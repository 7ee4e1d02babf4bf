//! Case and case-update DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::{CaseStatus, CaseUpdateId, CostItem, UpdateKind, UserId};
use crate::service::case_service::CaseView;

/// Request body for `POST /cases`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCaseRequest {
    /// Headline.
    pub title: String,
    /// What the money is for.
    #[serde(default)]
    pub description: String,
    /// Cover image path.
    #[serde(default)]
    pub image: Option<String>,
    /// Explicit USD target; ignored when `cost_breakdown` is non-empty.
    #[serde(default)]
    pub target_amount: Option<f64>,
    /// Itemized costs.
    #[serde(default)]
    pub cost_breakdown: Vec<CostItem>,
}

/// Query for `GET /cases`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CaseListQuery {
    /// Only cases in this status.
    #[serde(default)]
    pub status: Option<CaseStatus>,
    /// Page number (1-indexed).
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Response body for `GET /cases`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CaseListResponse {
    /// Cases on this page.
    pub data: Vec<CaseView>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Request body for assigning a doctor.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignDoctorRequest {
    /// Registered doctor account.
    pub doctor_id: UserId,
}

/// Request body for `POST /cases/{id}/updates`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCaseUpdateRequest {
    /// Diagnosis, progress or success story.
    pub kind: UpdateKind,
    /// Headline.
    pub title: String,
    /// Body.
    pub content: String,
    /// Attached image paths.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Request body for `PATCH /case-updates/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishUpdateRequest {
    /// Whether the update is publicly visible.
    pub is_published: bool,
}

/// Response body for `DELETE /case-updates/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteUpdateResponse {
    /// Removed update.
    pub deleted: CaseUpdateId,
    /// Whether the case still has updates.
    pub has_updates: bool,
}
