//! Confirmed donations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CaseId, DonationId, TxHash, UserId};

/// Donation lifecycle. Donations are only recorded after the on-chain
/// transfer went through, so there is no pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DonationStatus {
    /// Transfer confirmed and credited to the case.
    Confirmed,
}

/// One on-chain transfer to a case, mirrored in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Donation {
    /// Donation identifier.
    pub id: DonationId,
    /// Donating account.
    pub donor: UserId,
    /// Case credited.
    pub case_id: CaseId,
    /// Welfare organization that owns the case.
    pub welfare: UserId,
    /// Amount in the native token.
    pub amount: f64,
    /// USD equivalent, computed server-side at record time.
    pub amount_usd: f64,
    /// Hash of the on-chain transfer. Unique across donations.
    pub tx_hash: TxHash,
    /// Always [`DonationStatus::Confirmed`].
    pub status: DonationStatus,
    /// Record timestamp.
    pub created_at: DateTime<Utc>,
}
