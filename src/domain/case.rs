//! Fundraising cases for an animal's medical treatment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CaseId, EmergencyId, UserId, WalletAddress};
use crate::error::MarketError;

/// Fundraising state of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Accepting donations.
    Active,
    /// Target reached; no further donations.
    Completed,
}

/// One line of a treatment cost estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CostItem {
    /// What the money is for (e.g. `"surgery"`).
    pub item: String,
    /// Estimated cost in USD.
    pub cost: f64,
}

/// Derives the fundraising target from an explicit amount or a cost
/// breakdown. A non-empty breakdown wins and its sum becomes the target.
///
/// # Errors
///
/// Returns [`MarketError::Validation`] when neither is given, a line item
/// is negative or non-finite, or the resulting target is not positive.
pub fn resolve_target(
    target_amount: Option<f64>,
    cost_breakdown: &[CostItem],
) -> Result<f64, MarketError> {
    let target = if cost_breakdown.is_empty() {
        target_amount.ok_or_else(|| {
            MarketError::Validation("target_amount or cost_breakdown is required".to_string())
        })?
    } else {
        let mut sum = 0.0;
        for line in cost_breakdown {
            if !line.cost.is_finite() || line.cost < 0.0 {
                return Err(MarketError::Validation(format!(
                    "invalid cost for {}: {}",
                    line.item, line.cost
                )));
            }
            sum += line.cost;
        }
        sum
    };
    if !target.is_finite() || target <= 0.0 {
        return Err(MarketError::Validation(format!(
            "target amount must be positive, got {target}"
        )));
    }
    Ok(target)
}

/// A fundraising request posted by a welfare organization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Case {
    /// Case identifier.
    pub id: CaseId,
    /// Short title.
    pub title: String,
    /// Free-form description of the animal and its condition.
    pub description: String,
    /// Lead image (path or URL).
    pub image: Option<String>,
    /// Treatment cost estimate; empty when the target was given directly.
    pub cost_breakdown: Vec<CostItem>,
    /// Fundraising target in USD.
    pub target_amount: f64,
    /// USD raised so far. Only ever increases, only through donations.
    pub amount_raised: f64,
    /// Fundraising state.
    pub status: CaseStatus,
    /// Owning welfare organization.
    pub created_by: UserId,
    /// Address donations are sent to.
    pub wallet_address: WalletAddress,
    /// Doctor in charge of treatment.
    pub assigned_doctor: Option<UserId>,
    /// Emergency this case was converted from.
    pub emergency_id: Option<EmergencyId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Case {
    /// Credits a confirmed donation to the case.
    ///
    /// Returns `true` if this donation completed the fundraising target.
    pub fn credit(&mut self, amount_usd: f64) -> bool {
        self.amount_raised += amount_usd;
        if self.status == CaseStatus::Active && self.amount_raised >= self.target_amount {
            self.status = CaseStatus::Completed;
            return true;
        }
        false
    }

    /// Returns `true` if `user` owns this case.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.created_by == user
    }
}
