//! Domain events reflecting ledger mutations.
//!
//! Every successful workflow operation emits one or more [`MarketEvent`]s
//! through the [`super::EventBus`]. Events are pushed to WebSocket
//! subscribers and optionally appended to the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    AdoptionId, AdoptionRequestId, AdoptionRequestStatus, CaseId, CaseUpdateId, DonationId,
    EmergencyId, EmergencyStatus, MessageId, UserId,
};

/// What happened to a case update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateChange {
    /// A new update was posted.
    Posted,
    /// The update became public.
    Published,
    /// The update was hidden again.
    Unpublished,
    /// The update was removed.
    Deleted,
}

/// Domain event emitted after every ledger mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A donor filed an adoption request.
    AdoptionRequestFiled {
        /// Request identifier.
        request_id: AdoptionRequestId,
        /// Listing applied for.
        adoption_id: AdoptionId,
        /// Requesting donor.
        donor_id: UserId,
        /// Welfare owning the listing.
        welfare_id: UserId,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An adoption request moved along the state machine.
    AdoptionRequestTransitioned {
        /// Request identifier.
        request_id: AdoptionRequestId,
        /// Listing applied for.
        adoption_id: AdoptionId,
        /// Requesting donor.
        donor_id: UserId,
        /// Welfare owning the listing.
        welfare_id: UserId,
        /// State before.
        from: AdoptionRequestStatus,
        /// State after.
        to: AdoptionRequestStatus,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A listing was adopted.
    AdoptionCompleted {
        /// Listing identifier.
        adoption_id: AdoptionId,
        /// Request that completed it.
        request_id: AdoptionRequestId,
        /// New owner.
        donor_id: UserId,
        /// Welfare that posted the listing.
        welfare_id: UserId,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A donation was recorded and credited.
    DonationRecorded {
        /// Donation identifier.
        donation_id: DonationId,
        /// Case credited.
        case_id: CaseId,
        /// Donating account.
        donor_id: UserId,
        /// Welfare owning the case.
        welfare_id: UserId,
        /// USD credited.
        amount_usd: f64,
        /// Case total after crediting.
        amount_raised: f64,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A case was opened, directly or from an emergency.
    CaseCreated {
        /// Case identifier.
        case_id: CaseId,
        /// Owning welfare.
        welfare_id: UserId,
        /// Source emergency, for converted cases.
        emergency_id: Option<EmergencyId>,
        /// Fundraising target in USD.
        target_amount: f64,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A case reached its fundraising target.
    CaseFunded {
        /// Case identifier.
        case_id: CaseId,
        /// Owning welfare.
        welfare_id: UserId,
        /// Final total.
        amount_raised: f64,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A case update was posted, (un)published or deleted.
    CaseUpdateChanged {
        /// Case identifier.
        case_id: CaseId,
        /// Update identifier.
        update_id: CaseUpdateId,
        /// Owning welfare.
        welfare_id: UserId,
        /// What happened.
        change: UpdateChange,
        /// Whether the case still has any update afterwards.
        has_updates: bool,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Someone reported an emergency.
    EmergencyReported {
        /// Emergency identifier.
        emergency_id: EmergencyId,
        /// Reporter.
        reported_by: UserId,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An emergency moved through triage.
    EmergencyUpdated {
        /// Emergency identifier.
        emergency_id: EmergencyId,
        /// New status.
        status: EmergencyStatus,
        /// Reporter.
        reported_by: UserId,
        /// Doctor on the emergency.
        doctor_id: Option<UserId>,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An emergency became a fundraising case.
    EmergencyConverted {
        /// Emergency identifier.
        emergency_id: EmergencyId,
        /// Case produced.
        case_id: CaseId,
        /// Converting welfare.
        welfare_id: UserId,
        /// Reporter.
        reported_by: UserId,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A message landed in someone's inbox.
    MessageCreated {
        /// Message identifier.
        message_id: MessageId,
        /// Recipient.
        recipient: UserId,
        /// Subject line.
        title: String,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl MarketEvent {
    /// Returns the accounts entitled to see this event.
    #[must_use]
    pub fn audience(&self) -> Vec<UserId> {
        match self {
            Self::AdoptionRequestFiled {
                donor_id,
                welfare_id,
                ..
            }
            | Self::AdoptionRequestTransitioned {
                donor_id,
                welfare_id,
                ..
            }
            | Self::AdoptionCompleted {
                donor_id,
                welfare_id,
                ..
            }
            | Self::DonationRecorded {
                donor_id,
                welfare_id,
                ..
            } => vec![*donor_id, *welfare_id],
            Self::CaseCreated { welfare_id, .. }
            | Self::CaseFunded { welfare_id, .. }
            | Self::CaseUpdateChanged { welfare_id, .. } => vec![*welfare_id],
            Self::EmergencyReported { reported_by, .. } => vec![*reported_by],
            Self::EmergencyUpdated {
                reported_by,
                doctor_id,
                ..
            } => {
                let mut audience = vec![*reported_by];
                audience.extend(doctor_id);
                audience
            }
            Self::EmergencyConverted {
                welfare_id,
                reported_by,
                ..
            } => vec![*welfare_id, *reported_by],
            Self::MessageCreated { recipient, .. } => vec![*recipient],
        }
    }

    /// Returns the id of the record the event is primarily about.
    #[must_use]
    pub fn subject_id(&self) -> uuid::Uuid {
        match self {
            Self::AdoptionRequestFiled { request_id, .. }
            | Self::AdoptionRequestTransitioned { request_id, .. } => (*request_id).into(),
            Self::AdoptionCompleted { adoption_id, .. } => (*adoption_id).into(),
            Self::DonationRecorded { donation_id, .. } => (*donation_id).into(),
            Self::CaseCreated { case_id, .. }
            | Self::CaseFunded { case_id, .. }
            | Self::CaseUpdateChanged { case_id, .. } => (*case_id).into(),
            Self::EmergencyReported { emergency_id, .. }
            | Self::EmergencyUpdated { emergency_id, .. }
            | Self::EmergencyConverted { emergency_id, .. } => (*emergency_id).into(),
            Self::MessageCreated { message_id, .. } => (*message_id).into(),
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::AdoptionRequestFiled { .. } => "adoption_request_filed",
            Self::AdoptionRequestTransitioned { .. } => "adoption_request_transitioned",
            Self::AdoptionCompleted { .. } => "adoption_completed",
            Self::DonationRecorded { .. } => "donation_recorded",
            Self::CaseCreated { .. } => "case_created",
            Self::CaseFunded { .. } => "case_funded",
            Self::CaseUpdateChanged { .. } => "case_update_changed",
            Self::EmergencyReported { .. } => "emergency_reported",
            Self::EmergencyUpdated { .. } => "emergency_updated",
            Self::EmergencyConverted { .. } => "emergency_converted",
            Self::MessageCreated { .. } => "message_created",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn transition_serializes_with_wire_statuses() {
        let event = MarketEvent::AdoptionRequestTransitioned {
            request_id: AdoptionRequestId::new(),
            adoption_id: AdoptionId::new(),
            donor_id: UserId::new(),
            welfare_id: UserId::new(),
            from: AdoptionRequestStatus::UnderReview,
            to: AdoptionRequestStatus::PaymentPending,
            timestamp: Utc::now(),
        };
        let Ok(json) = serde_json::to_string(&event) else {
            panic!("serialize failed");
        };
        assert!(json.contains("\"event_type\":\"adoption_request_transitioned\""));
        assert!(json.contains("\"payment pending\""));
    }

    #[test]
    fn donation_audience_is_donor_and_welfare() {
        let donor = UserId::new();
        let welfare = UserId::new();
        let event = MarketEvent::DonationRecorded {
            donation_id: DonationId::new(),
            case_id: CaseId::new(),
            donor_id: donor,
            welfare_id: welfare,
            amount_usd: 10.0,
            amount_raised: 10.0,
            timestamp: Utc::now(),
        };
        assert_eq!(event.audience(), vec![donor, welfare]);
    }

    #[test]
    fn emergency_update_includes_doctor_when_assigned() {
        let reporter = UserId::new();
        let doctor = UserId::new();
        let event = MarketEvent::EmergencyUpdated {
            emergency_id: EmergencyId::new(),
            status: EmergencyStatus::Assigned,
            reported_by: reporter,
            doctor_id: Some(doctor),
            timestamp: Utc::now(),
        };
        assert_eq!(event.audience(), vec![reporter, doctor]);
        assert_eq!(event.event_type_str(), "emergency_updated");
    }

    #[test]
    fn subject_is_primary_record() {
        let message_id = MessageId::new();
        let event = MarketEvent::MessageCreated {
            message_id,
            recipient: UserId::new(),
            title: "hi".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.subject_id(), uuid::Uuid::from(message_id));
    }
}
