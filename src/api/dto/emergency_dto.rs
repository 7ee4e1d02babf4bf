//! Emergency DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{NotificationFields, PaginationMeta};
use crate::domain::{Case, CostItem, Emergency, EmergencyStatus, UserId};

/// Request body for `POST /emergency`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportEmergencyRequest {
    /// Short summary.
    pub title: String,
    /// What was observed.
    #[serde(default)]
    pub description: String,
    /// Where the animal is.
    pub location: String,
    /// Kind of animal.
    #[serde(default)]
    pub animal_type: Option<String>,
    /// Photo paths.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Query for `GET /emergency`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmergencyListQuery {
    /// Only emergencies in this status.
    #[serde(default)]
    pub status: Option<EmergencyStatus>,
    /// Page number (1-indexed).
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Response body for `GET /emergency`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmergencyListResponse {
    /// Emergencies on this page.
    pub data: Vec<Emergency>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Request body for `PATCH /emergency/{id}/assign`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignEmergencyRequest {
    /// Registered doctor account.
    pub doctor_id: UserId,
}

/// Request body for `POST /emergency/{id}/diagnosis`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DiagnosisRequest {
    /// Doctor's findings.
    pub diagnosis: String,
}

/// Request body for `POST /emergency/{id}/convert-to-case`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ConvertEmergencyRequest {
    /// Case title; defaults to the emergency's title.
    #[serde(default)]
    pub title: Option<String>,
    /// Explicit USD target; ignored when `cost_breakdown` is non-empty.
    #[serde(default)]
    pub target_amount: Option<f64>,
    /// Itemized costs.
    #[serde(default)]
    pub cost_breakdown: Vec<CostItem>,
}

/// Response body for `POST /emergency/{id}/convert-to-case`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConvertEmergencyResponse {
    /// The new case.
    pub case: Case,
    /// What happened to the reporter's notice.
    #[serde(flatten)]
    pub notification: NotificationFields,
}
