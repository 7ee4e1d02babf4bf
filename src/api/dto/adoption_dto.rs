//! Adoption listing and adoption-request DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{NotificationFields, PaginationMeta};
use crate::domain::{Adoption, AdoptionId, AdoptionRequest, AdoptionStatus};

/// Request body for `POST /adoptions`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAdoptionRequest {
    /// Animal's name.
    pub name: String,
    /// Species.
    pub species: String,
    /// Breed, if known.
    #[serde(default)]
    pub breed: Option<String>,
    /// Age description.
    #[serde(default)]
    pub age: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Listing image paths.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Query for `GET /adoptions`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdoptionListQuery {
    /// Only listings in this status.
    #[serde(default)]
    pub status: Option<AdoptionStatus>,
    /// Page number (1-indexed).
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Response body for `GET /adoptions`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdoptionListResponse {
    /// Listings on this page.
    pub data: Vec<Adoption>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Request body for `POST /adoption-request`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FileAdoptionRequest {
    /// Listing applied for.
    pub adoption_id: AdoptionId,
    /// Why the donor wants to adopt.
    pub reason: String,
    /// How the welfare should reach the donor.
    #[serde(default)]
    pub preferred_contact: Option<String>,
}

/// Decision a welfare can take on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Accept the request.
    Approved,
    /// Decline the request.
    Rejected,
}

/// Request body for `PATCH /adoption-request/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DecideRequest {
    /// New status.
    pub status: Decision,
}

/// Request body for `POST /adoption-request/{id}/payment-proof`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentProofRequest {
    /// Uploaded receipt path or paying wallet.
    pub payment_proof: String,
}

/// Request body for `POST /adoption-request/{id}/payment`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    /// Amount paid, in USD.
    pub amount: f64,
    /// Paying wallet (`0x` + 40 hex chars).
    pub from_address: String,
    /// Transfer hash, if known.
    #[serde(default)]
    pub tx_hash: Option<String>,
}

/// Request body for `POST /adoption-request/{id}/verify-payment`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    /// Whether the payment checked out.
    pub verified: bool,
    /// Reason shown to the donor when it did not.
    #[serde(default)]
    pub note: Option<String>,
}

/// An adoption request after a workflow step.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdoptionRequestResponse {
    /// The request.
    #[serde(flatten)]
    pub request: AdoptionRequest,
    /// What happened to the accompanying message.
    #[serde(flatten)]
    pub notification: NotificationFields,
}
