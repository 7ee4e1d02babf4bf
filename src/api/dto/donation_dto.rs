//! Donation DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::NotificationFields;
use crate::domain::{CaseId, Donation, UserId};
use crate::service::donation_service::Contribution;

/// Request body for `POST /donor/donate`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DonateRequest {
    /// Case being funded.
    pub case_id: CaseId,
    /// Amount in the native token.
    pub amount: f64,
    /// On-chain transfer hash (`0x` + 64 hex chars).
    pub tx_hash: String,
    /// Client-side USD estimate. Compared, never stored.
    #[serde(default)]
    pub amount_usd: Option<f64>,
}

impl From<DonateRequest> for Contribution {
    fn from(req: DonateRequest) -> Self {
        Self {
            case_id: req.case_id,
            amount: req.amount,
            tx_hash: req.tx_hash,
            claimed_usd: req.amount_usd,
        }
    }
}

/// Request body for `POST /welfare/process-donation`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessDonationRequest {
    /// Donating account.
    pub donor_id: UserId,
    /// The transfer.
    #[serde(flatten)]
    pub donation: DonateRequest,
}

/// A recorded donation.
#[derive(Debug, Serialize, ToSchema)]
pub struct DonationResponse {
    /// The donation.
    #[serde(flatten)]
    pub donation: Donation,
    /// What happened to the accompanying message.
    #[serde(flatten)]
    pub notification: NotificationFields,
}
