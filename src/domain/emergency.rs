//! Emergency reports and their triage lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CaseId, EmergencyId, UserId};
use crate::error::MarketError;

/// Triage status of an emergency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EmergencyStatus {
    /// Reported, nobody on it yet.
    New,
    /// A doctor has been assigned.
    Assigned,
    /// The doctor is working on it.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Closed. Terminal.
    Resolved,
}

/// An unvetted report of an animal in distress.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Emergency {
    /// Emergency identifier.
    pub id: EmergencyId,
    /// Short title.
    pub title: String,
    /// What the reporter saw.
    pub description: String,
    /// Where the animal is.
    pub location: String,
    /// Species, if known.
    pub animal_type: Option<String>,
    /// Photos; the first one becomes the case image on conversion.
    pub images: Vec<String>,
    /// Triage status.
    pub status: EmergencyStatus,
    /// Account that filed the report.
    pub reported_by: UserId,
    /// Doctor handling it.
    pub assigned_doctor: Option<UserId>,
    /// Doctor's findings.
    pub diagnosis: Option<String>,
    /// Welfare that took it over on conversion.
    pub assigned_to: Option<UserId>,
    /// One-way latch set on conversion.
    pub converted_to_case: bool,
    /// Case produced by the conversion.
    pub case_id: Option<CaseId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Emergency {
    /// Fails with [`MarketError::Conflict`] if the emergency was already
    /// converted or resolved; no further triage is possible then.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn ensure_open(&self) -> Result<(), MarketError> {
        if self.converted_to_case {
            return Err(MarketError::Conflict(format!(
                "emergency {} was already converted to a case",
                self.id
            )));
        }
        if self.status == EmergencyStatus::Resolved {
            return Err(MarketError::Conflict(format!(
                "emergency {} is resolved",
                self.id
            )));
        }
        Ok(())
    }
}
