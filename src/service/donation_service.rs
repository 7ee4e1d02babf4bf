//! Donation recording and case crediting.
//!
//! Both donation paths (a donor donating, a welfare processing a donation
//! it received) go through one unit: insert the confirmed [`Donation`],
//! credit the case by its server-side USD value, write the notice.

use std::sync::Arc;

use chrono::Utc;

use super::{Outcome, UsdRate, acting_as, notify};
use crate::domain::{
    Actor, Case, CaseId, CaseStatus, Donation, DonationId, DonationStatus, EventBus, Ledger,
    MarketEvent, Notice, Role, Tables, TxHash, UserId,
};
use crate::error::MarketError;

/// An on-chain transfer to be recorded.
#[derive(Debug, Clone)]
pub struct Contribution {
    /// Case being funded.
    pub case_id: CaseId,
    /// Amount in the native token.
    pub amount: f64,
    /// Transfer hash.
    pub tx_hash: String,
    /// USD figure computed by the client. Only compared, never stored.
    pub claimed_usd: Option<f64>,
}

/// Records donations and credits cases.
#[derive(Debug, Clone)]
pub struct DonationService {
    ledger: Arc<Ledger>,
    event_bus: EventBus,
    rate: UsdRate,
}

impl DonationService {
    /// Creates a new `DonationService`.
    #[must_use]
    pub fn new(ledger: Arc<Ledger>, event_bus: EventBus, rate: UsdRate) -> Self {
        Self {
            ledger,
            event_bus,
            rate,
        }
    }

    /// Trusted rate in use.
    #[must_use]
    pub const fn rate(&self) -> UsdRate {
        self.rate
    }

    /// A donor records a donation; the welfare owning the case is told.
    ///
    /// # Errors
    ///
    /// - [`MarketError::Forbidden`] unless the actor is a registered donor.
    /// - [`MarketError::NotFound`] if the case does not exist.
    /// - [`MarketError::Validation`] for a bad amount or hash.
    /// - [`MarketError::Conflict`] for a replayed hash or a completed case.
    pub async fn donate(
        &self,
        actor: &Actor,
        contribution: Contribution,
    ) -> Result<Outcome<Donation>, MarketError> {
        let mut t = self.ledger.write().await;
        let donor_name = acting_as(&t, actor, Role::Donor)?.name.clone();
        let (donation, mut events) = self.record(&mut t, actor.id, &contribution)?;
        let notification = notify(
            &mut t,
            Notice::new(
                actor.id,
                donation.welfare,
                "New Donation Received",
                format!(
                    "{donor_name} donated {} (${:.2}) to your case.",
                    donation.amount, donation.amount_usd
                ),
            )
            .about(donation.case_id),
            &mut events,
        );
        drop(t);

        self.event_bus.publish_all(events);
        Ok(Outcome {
            record: donation,
            notification,
        })
    }

    /// A welfare records a donation it received for one of its cases; the
    /// donor gets a thank-you.
    ///
    /// # Errors
    ///
    /// - [`MarketError::Forbidden`] unless the actor is the registered
    ///   welfare owning the case.
    /// - [`MarketError::NotFound`] if the case does not exist.
    /// - [`MarketError::Validation`] for a bad amount or hash.
    /// - [`MarketError::Conflict`] for a replayed hash or a completed case.
    pub async fn process(
        &self,
        actor: &Actor,
        donor_id: UserId,
        contribution: Contribution,
    ) -> Result<Outcome<Donation>, MarketError> {
        let mut t = self.ledger.write().await;
        acting_as(&t, actor, Role::Welfare)?;
        let case = t.case(contribution.case_id)?;
        if !case.is_owned_by(actor.id) {
            return Err(MarketError::Forbidden(format!(
                "case {} is owned by another welfare",
                case.id
            )));
        }
        let title = case.title.clone();
        let (donation, mut events) = self.record(&mut t, donor_id, &contribution)?;
        let notification = notify(
            &mut t,
            Notice::new(
                actor.id,
                donor_id,
                "Thank You for Your Donation",
                format!(
                    "Your donation of ${:.2} to \"{title}\" was received.",
                    donation.amount_usd
                ),
            )
            .about(donation.case_id),
            &mut events,
        );
        drop(t);

        self.event_bus.publish_all(events);
        Ok(Outcome {
            record: donation,
            notification,
        })
    }

    /// Donations recorded against a case, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if the case does not exist.
    pub async fn for_case(&self, case_id: CaseId) -> Result<Vec<Donation>, MarketError> {
        let t = self.ledger.read().await;
        t.case(case_id)?;
        let mut donations: Vec<Donation> = t
            .donations
            .values()
            .filter(|d| d.case_id == case_id)
            .cloned()
            .collect();
        donations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(donations)
    }

    /// Validates a contribution, then inserts the donation and credits the
    /// case. Nothing is written unless every check passes.
    fn record(
        &self,
        t: &mut Tables,
        donor_id: UserId,
        contribution: &Contribution,
    ) -> Result<(Donation, Vec<MarketEvent>), MarketError> {
        let case = t.case(contribution.case_id)?;
        if case.status == CaseStatus::Completed {
            return Err(MarketError::Conflict(format!(
                "case {} has already reached its target",
                case.id
            )));
        }
        let welfare = case.created_by;
        let amount_usd = self.rate.to_usd(contribution.amount)?;
        if !(case.amount_raised + amount_usd).is_finite() {
            return Err(MarketError::Validation(format!(
                "donation of {amount_usd} USD overflows the total raised for case {}",
                case.id
            )));
        }
        if let Some(claimed) = contribution.claimed_usd {
            if UsdRate::drifts(claimed, amount_usd) {
                tracing::warn!(
                    case_id = %contribution.case_id,
                    claimed,
                    amount_usd,
                    "client USD figure differs from server rate, using server value"
                );
            }
        }
        let tx_hash = TxHash::parse(&contribution.tx_hash)?;
        if t.has_donation_for(&tx_hash) {
            return Err(MarketError::Conflict(format!(
                "transaction {tx_hash} was already recorded"
            )));
        }

        let donation = Donation {
            id: DonationId::new(),
            donor: donor_id,
            case_id: contribution.case_id,
            welfare,
            amount: contribution.amount,
            amount_usd,
            tx_hash,
            status: DonationStatus::Confirmed,
            created_at: Utc::now(),
        };
        let case = t.case_mut(contribution.case_id)?;
        let funded = case.credit(amount_usd);
        let mut events = vec![MarketEvent::DonationRecorded {
            donation_id: donation.id,
            case_id: case.id,
            donor_id,
            welfare_id: welfare,
            amount_usd,
            amount_raised: case.amount_raised,
            timestamp: donation.created_at,
        }];
        if funded {
            events.push(funded_event(case));
            tracing::info!(case_id = %case.id, amount_raised = case.amount_raised, "case reached its target");
        }
        tracing::info!(
            donation_id = %donation.id,
            case_id = %donation.case_id,
            amount_usd,
            "donation recorded"
        );
        t.donations.insert(donation.id, donation.clone());
        Ok((donation, events))
    }
}

fn funded_event(case: &Case) -> MarketEvent {
    MarketEvent::CaseFunded {
        case_id: case.id,
        welfare_id: case.created_by,
        amount_raised: case.amount_raised,
        timestamp: Utc::now(),
    }
}
