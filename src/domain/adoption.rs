//! Adoption listings and the adoption-request state machine.
//!
//! ```text
//! pending ──approve──▶ approved ──submit payment──▶ under review
//!    │                                                 │      ▲
//!    └──reject──▶ rejected           verify(true) ◀────┤      │
//!                                        │             │      │ resubmit
//!                                        ▼       verify(false)│
//!                                    completed         ▼      │
//!                                                 payment pending
//! ```
//!
//! `rejected` and `completed` are terminal. The table lives in
//! [`AdoptionRequestStatus::next`]; everything that mutates a request's
//! status goes through [`AdoptionRequest::apply`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AdoptionId, AdoptionRequestId, UserId, WalletAddress};
use crate::error::MarketError;

/// Availability of an adoption listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdoptionStatus {
    /// Open for requests.
    Available,
    /// A request has been approved and awaits payment.
    Reserved,
    /// Adoption completed. Terminal.
    Adopted,
}

/// An animal listed for adoption by a welfare organization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Adoption {
    /// Listing identifier.
    pub id: AdoptionId,
    /// Animal's name.
    pub name: String,
    /// Species (e.g. `"dog"`).
    pub species: String,
    /// Breed, if known.
    pub breed: Option<String>,
    /// Age description (e.g. `"2 years"`).
    pub age: Option<String>,
    /// Free-form description.
    pub description: String,
    /// Listing images.
    pub images: Vec<String>,
    /// Availability.
    pub status: AdoptionStatus,
    /// Owning welfare organization.
    pub posted_by: UserId,
    /// Donor who completed the adoption.
    pub adopted_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Status of a donor's adoption request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AdoptionRequestStatus {
    /// Filed, waiting for the welfare's decision.
    #[serde(rename = "pending")]
    Pending,
    /// Welfare agreed; donor may pay.
    #[serde(rename = "approved")]
    Approved,
    /// Welfare declined. Terminal.
    #[serde(rename = "rejected")]
    Rejected,
    /// Payment was refused on review; donor must resubmit.
    #[serde(rename = "payment pending")]
    PaymentPending,
    /// Payment submitted, waiting for the welfare to verify it.
    #[serde(rename = "under review")]
    UnderReview,
    /// Payment verified, adoption done. Terminal.
    #[serde(rename = "completed")]
    Completed,
}

impl AdoptionRequestStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::PaymentPending => "payment pending",
            Self::UnderReview => "under review",
            Self::Completed => "completed",
        }
    }

    /// Returns `true` for states with no outgoing transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// Transition table. `None` means the action is not allowed here.
    #[must_use]
    pub const fn next(self, action: RequestAction) -> Option<Self> {
        match (self, action) {
            (Self::Pending, RequestAction::Approve) => Some(Self::Approved),
            (Self::Pending, RequestAction::Reject) => Some(Self::Rejected),
            (Self::Approved | Self::PaymentPending, RequestAction::SubmitPayment) => {
                Some(Self::UnderReview)
            }
            (Self::UnderReview, RequestAction::VerifyPayment { verified: true }) => {
                Some(Self::Completed)
            }
            (Self::UnderReview, RequestAction::VerifyPayment { verified: false }) => {
                Some(Self::PaymentPending)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for AdoptionRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a donor or welfare does to an adoption request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    /// Welfare accepts the request.
    Approve,
    /// Welfare declines the request.
    Reject,
    /// Donor submits payment proof or pays directly.
    SubmitPayment,
    /// Welfare reviews the submitted payment.
    VerifyPayment {
        /// Whether the payment checked out.
        verified: bool,
    },
}

impl RequestAction {
    /// Human-readable name for error messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::SubmitPayment => "submit payment",
            Self::VerifyPayment { .. } => "verify payment",
        }
    }
}

/// Payment details recorded when a donor pays directly.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentRecord {
    /// Amount paid, in USD.
    pub amount: f64,
    /// Paying wallet.
    pub from_address: WalletAddress,
    /// Transfer hash, if the client reported one.
    pub tx_hash: Option<String>,
    /// Submission timestamp.
    pub paid_at: DateTime<Utc>,
}

/// A donor's application to adopt a listing. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdoptionRequest {
    /// Request identifier.
    pub id: AdoptionRequestId,
    /// Listing applied for.
    pub adoption_id: AdoptionId,
    /// Requesting donor.
    pub donor_id: UserId,
    /// Why the donor wants to adopt.
    pub reason: String,
    /// How the welfare should reach the donor.
    pub preferred_contact: Option<String>,
    /// Uploaded proof path or paying wallet address.
    pub payment_proof: Option<String>,
    /// Direct payment details, when paid in-app.
    pub payment: Option<PaymentRecord>,
    /// Current state.
    pub status: AdoptionRequestStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last transition.
    pub updated_at: DateTime<Utc>,
}

impl AdoptionRequest {
    /// Creates a new `pending` request.
    #[must_use]
    pub fn new(
        adoption_id: AdoptionId,
        donor_id: UserId,
        reason: String,
        preferred_contact: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AdoptionRequestId::new(),
            adoption_id,
            donor_id,
            reason,
            preferred_contact,
            payment_proof: None,
            payment: None,
            status: AdoptionRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks that `action` is allowed from the current state and returns
    /// the state it would lead to, without changing anything.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Conflict`] if the transition is not allowed.
    pub fn check(&self, action: RequestAction) -> Result<AdoptionRequestStatus, MarketError> {
        self.status.next(action).ok_or_else(|| {
            MarketError::Conflict(format!(
                "cannot {} adoption request {} in status '{}'",
                action.as_str(),
                self.id,
                self.status
            ))
        })
    }

    /// Applies `action`, returning the `(from, to)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Conflict`] if the transition is not allowed;
    /// the request is left untouched.
    pub fn apply(
        &mut self,
        action: RequestAction,
    ) -> Result<(AdoptionRequestStatus, AdoptionRequestStatus), MarketError> {
        let to = self.check(action)?;
        let from = self.status;
        self.status = to;
        self.updated_at = Utc::now();
        Ok((from, to))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use AdoptionRequestStatus::*;

    const ALL: [AdoptionRequestStatus; 6] = [
        Pending,
        Approved,
        Rejected,
        PaymentPending,
        UnderReview,
        Completed,
    ];
    const ACTIONS: [RequestAction; 5] = [
        RequestAction::Approve,
        RequestAction::Reject,
        RequestAction::SubmitPayment,
        RequestAction::VerifyPayment { verified: true },
        RequestAction::VerifyPayment { verified: false },
    ];

    fn request() -> AdoptionRequest {
        AdoptionRequest::new(AdoptionId::new(), UserId::new(), "yard".to_string(), None)
    }

    #[test]
    fn documented_edges_are_the_only_edges() {
        let mut edges = Vec::new();
        for from in ALL {
            for action in ACTIONS {
                if let Some(to) = from.next(action) {
                    edges.push((from, to));
                }
            }
        }
        edges.sort_by_key(|(a, b)| (a.as_str(), b.as_str()));
        let mut expected = vec![
            (Pending, Approved),
            (Pending, Rejected),
            (Approved, UnderReview),
            (UnderReview, Completed),
            (UnderReview, PaymentPending),
            (PaymentPending, UnderReview),
        ];
        expected.sort_by_key(|(a, b)| (a.as_str(), b.as_str()));
        assert_eq!(edges, expected);
    }

    #[test]
    fn terminal_states_have_no_exit() {
        for state in [Rejected, Completed] {
            assert!(state.is_terminal());
            for action in ACTIONS {
                assert_eq!(state.next(action), None);
            }
        }
    }

    #[test]
    fn full_happy_path() {
        let mut req = request();
        assert_eq!(req.apply(RequestAction::Approve).ok(), Some((Pending, Approved)));
        assert!(req.apply(RequestAction::SubmitPayment).is_ok());
        assert!(req.apply(RequestAction::VerifyPayment { verified: false }).is_ok());
        assert_eq!(req.status, PaymentPending);
        assert!(req.apply(RequestAction::SubmitPayment).is_ok());
        assert!(req.apply(RequestAction::VerifyPayment { verified: true }).is_ok());
        assert_eq!(req.status, Completed);
    }

    #[test]
    fn verifying_outside_review_is_a_conflict() {
        let mut req = request();
        let Err(MarketError::Conflict(msg)) =
            req.apply(RequestAction::VerifyPayment { verified: true })
        else {
            panic!("expected conflict");
        };
        assert!(msg.contains("pending"));
        assert_eq!(req.status, Pending);
    }

    #[test]
    fn status_uses_spaced_wire_names() {
        let Ok(json) = serde_json::to_string(&UnderReview) else {
            panic!("serialize failed");
        };
        assert_eq!(json, "\"under review\"");
        let Ok(back) = serde_json::from_str::<AdoptionRequestStatus>("\"payment pending\"") else {
            panic!("deserialize failed");
        };
        assert_eq!(back, PaymentPending);
    }
}
