//! Adoption service: listings and the adoption-request workflow.
//!
//! This is the single place the request state machine is driven from.
//! Handlers call [`AdoptionService::approve`], [`AdoptionService::reject`],
//! [`AdoptionService::submit_payment_proof`], [`AdoptionService::pay`] and
//! [`AdoptionService::verify_payment`]; nothing else writes a request's
//! status.

use std::sync::Arc;

use chrono::Utc;

use super::{Outcome, acting_as, notify, required};
use crate::domain::{
    Actor, Adoption, AdoptionId, AdoptionRequest, AdoptionRequestId, AdoptionStatus, EventBus,
    Ledger, MarketEvent, Notice, PaymentRecord, RequestAction, Role, Tables, TxHash, UserId,
    WalletAddress,
};
use crate::error::MarketError;

/// Fields of a new adoption listing.
#[derive(Debug, Clone)]
pub struct NewListing {
    /// Animal's name.
    pub name: String,
    /// Species.
    pub species: String,
    /// Breed, if known.
    pub breed: Option<String>,
    /// Age description.
    pub age: Option<String>,
    /// Free-form description.
    pub description: String,
    /// Listing images.
    pub images: Vec<String>,
}

/// A direct in-app payment for an approved request.
#[derive(Debug, Clone)]
pub struct PaymentSubmission {
    /// Amount in USD.
    pub amount: f64,
    /// Paying wallet.
    pub from_address: String,
    /// Transfer hash, if known.
    pub tx_hash: Option<String>,
}

/// Orchestrates adoption listings and requests.
#[derive(Debug, Clone)]
pub struct AdoptionService {
    ledger: Arc<Ledger>,
    event_bus: EventBus,
    min_payment_usd: f64,
}

impl AdoptionService {
    /// Creates a new `AdoptionService`.
    #[must_use]
    pub fn new(ledger: Arc<Ledger>, event_bus: EventBus, min_payment_usd: f64) -> Self {
        Self {
            ledger,
            event_bus,
            min_payment_usd,
        }
    }

    /// Minimum accepted payment in USD.
    #[must_use]
    pub const fn min_payment_usd(&self) -> f64 {
        self.min_payment_usd
    }

    /// Posts a new `available` listing.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Forbidden`] unless the actor is a registered
    /// welfare, or [`MarketError::Validation`] on missing fields.
    pub async fn create_listing(
        &self,
        actor: &Actor,
        listing: NewListing,
    ) -> Result<Adoption, MarketError> {
        let mut t = self.ledger.write().await;
        acting_as(&t, actor, Role::Welfare)?;
        let adoption = Adoption {
            id: AdoptionId::new(),
            name: required("name", &listing.name)?,
            species: required("species", &listing.species)?,
            breed: listing.breed,
            age: listing.age,
            description: listing.description,
            images: listing.images,
            status: AdoptionStatus::Available,
            posted_by: actor.id,
            adopted_by: None,
            created_at: Utc::now(),
        };
        t.adoptions.insert(adoption.id, adoption.clone());
        tracing::info!(adoption_id = %adoption.id, welfare = %actor.id, "adoption listing created");
        Ok(adoption)
    }

    /// Returns listings, newest first, optionally filtered by status.
    pub async fn list_listings(&self, status: Option<AdoptionStatus>) -> Vec<Adoption> {
        let t = self.ledger.read().await;
        let mut listings: Vec<Adoption> = t
            .adoptions
            .values()
            .filter(|a| status.is_none_or(|s| a.status == s))
            .cloned()
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        listings
    }

    /// Returns one listing.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if it does not exist.
    pub async fn listing(&self, id: AdoptionId) -> Result<Adoption, MarketError> {
        self.ledger.read().await.adoption(id).cloned()
    }

    /// Files a `pending` request for a listing.
    ///
    /// # Errors
    ///
    /// - [`MarketError::Forbidden`] unless the actor is a registered donor.
    /// - [`MarketError::NotFound`] if the listing does not exist.
    /// - [`MarketError::Validation`] if no reason is given.
    /// - [`MarketError::Conflict`] if the listing is adopted or the donor
    ///   already has an open request for it.
    pub async fn file_request(
        &self,
        actor: &Actor,
        adoption_id: AdoptionId,
        reason: &str,
        preferred_contact: Option<String>,
    ) -> Result<AdoptionRequest, MarketError> {
        let mut t = self.ledger.write().await;
        acting_as(&t, actor, Role::Donor)?;
        let adoption = t.adoption(adoption_id)?;
        let welfare_id = adoption.posted_by;
        if adoption.status == AdoptionStatus::Adopted {
            return Err(MarketError::Conflict(format!(
                "adoption {adoption_id} has already been adopted"
            )));
        }
        let reason = required("reason", reason)?;
        let duplicate = t.adoption_requests.values().any(|r| {
            r.adoption_id == adoption_id && r.donor_id == actor.id && !r.status.is_terminal()
        });
        if duplicate {
            return Err(MarketError::Conflict(format!(
                "an open request for adoption {adoption_id} already exists"
            )));
        }

        let request = AdoptionRequest::new(adoption_id, actor.id, reason, preferred_contact);
        t.adoption_requests.insert(request.id, request.clone());
        drop(t);

        self.event_bus.publish(MarketEvent::AdoptionRequestFiled {
            request_id: request.id,
            adoption_id,
            donor_id: actor.id,
            welfare_id,
            timestamp: request.created_at,
        });
        tracing::info!(request_id = %request.id, %adoption_id, donor = %actor.id, "adoption request filed");
        Ok(request)
    }

    /// Requests visible to the actor: a donor's own requests, or the
    /// requests against a welfare's listings. Newest first.
    pub async fn requests_for(&self, actor: &Actor) -> Vec<AdoptionRequest> {
        let t = self.ledger.read().await;
        let mut requests: Vec<AdoptionRequest> = t
            .adoption_requests
            .values()
            .filter(|r| match actor.role {
                Role::Donor => r.donor_id == actor.id,
                Role::Welfare => t
                    .adoptions
                    .get(&r.adoption_id)
                    .is_some_and(|a| a.posted_by == actor.id),
                Role::Doctor => false,
            })
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    /// Returns one request to its donor or to the listing's welfare.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] or [`MarketError::Forbidden`].
    pub async fn request(
        &self,
        actor: &Actor,
        id: AdoptionRequestId,
    ) -> Result<AdoptionRequest, MarketError> {
        let t = self.ledger.read().await;
        let request = t.adoption_request(id)?;
        let owner = t.adoption(request.adoption_id)?.posted_by;
        if request.donor_id != actor.id && owner != actor.id {
            return Err(MarketError::Forbidden(format!(
                "adoption request {id} belongs to another account"
            )));
        }
        Ok(request.clone())
    }

    /// Welfare approves a `pending` request; the listing becomes reserved.
    ///
    /// # Errors
    ///
    /// - [`MarketError::NotFound`] if the request does not exist.
    /// - [`MarketError::Forbidden`] unless the actor owns the listing.
    /// - [`MarketError::Conflict`] if the request is not pending or the
    ///   listing is not available.
    pub async fn approve(
        &self,
        actor: &Actor,
        id: AdoptionRequestId,
    ) -> Result<Outcome<AdoptionRequest>, MarketError> {
        let mut t = self.ledger.write().await;
        let (donor_id, adoption_id) = owned_by_welfare(&t, actor, id)?;
        let request = t.adoption_request(id)?;
        request.check(RequestAction::Approve)?;
        let adoption = t.adoption(adoption_id)?;
        if adoption.status != AdoptionStatus::Available {
            return Err(MarketError::Conflict(format!(
                "adoption {adoption_id} is not available"
            )));
        }
        let name = adoption.name.clone();

        let mut events = Vec::new();
        let record = transition(&mut t, id, RequestAction::Approve, actor.id, &mut events)?;
        if let Some(adoption) = t.adoptions.get_mut(&adoption_id) {
            adoption.status = AdoptionStatus::Reserved;
        }
        let notification = notify(
            &mut t,
            Notice::new(
                actor.id,
                donor_id,
                "Adoption Request Approved",
                format!("Your request to adopt {name} was approved. Please complete the adoption payment."),
            ),
            &mut events,
        );
        drop(t);

        self.event_bus.publish_all(events);
        Ok(Outcome {
            record,
            notification,
        })
    }

    /// Welfare rejects a `pending` request. Terminal.
    ///
    /// # Errors
    ///
    /// - [`MarketError::NotFound`] if the request does not exist.
    /// - [`MarketError::Forbidden`] unless the actor owns the listing.
    /// - [`MarketError::Conflict`] if the request is not pending.
    pub async fn reject(
        &self,
        actor: &Actor,
        id: AdoptionRequestId,
    ) -> Result<Outcome<AdoptionRequest>, MarketError> {
        let mut t = self.ledger.write().await;
        let (donor_id, adoption_id) = owned_by_welfare(&t, actor, id)?;
        let name = t.adoption(adoption_id)?.name.clone();

        let mut events = Vec::new();
        let record = transition(&mut t, id, RequestAction::Reject, actor.id, &mut events)?;
        let notification = notify(
            &mut t,
            Notice::new(
                actor.id,
                donor_id,
                "Adoption Request Rejected",
                format!("Your request to adopt {name} was not accepted."),
            ),
            &mut events,
        );
        drop(t);

        self.event_bus.publish_all(events);
        Ok(Outcome {
            record,
            notification,
        })
    }

    /// Donor attaches payment proof; the request goes under review and the
    /// welfare is told.
    ///
    /// # Errors
    ///
    /// - [`MarketError::NotFound`] if the request does not exist.
    /// - [`MarketError::Forbidden`] unless the actor filed the request.
    /// - [`MarketError::Validation`] if the proof is empty.
    /// - [`MarketError::Conflict`] unless the request is approved or
    ///   payment pending.
    pub async fn submit_payment_proof(
        &self,
        actor: &Actor,
        id: AdoptionRequestId,
        proof: &str,
    ) -> Result<Outcome<AdoptionRequest>, MarketError> {
        let mut t = self.ledger.write().await;
        let adoption_id = owned_by_donor(&t, actor, id)?;
        let proof = required("payment proof", proof)?;
        t.adoption_request(id)?.check(RequestAction::SubmitPayment)?;
        let welfare_id = t.adoption(adoption_id)?.posted_by;

        if let Some(request) = t.adoption_requests.get_mut(&id) {
            request.payment_proof = Some(proof);
        }
        let mut events = Vec::new();
        let record = transition(&mut t, id, RequestAction::SubmitPayment, welfare_id, &mut events)?;
        let notification = notify(
            &mut t,
            Notice::new(
                actor.id,
                welfare_id,
                "Payment Proof Submitted",
                format!("Payment proof for adoption request {id} is waiting for review."),
            ),
            &mut events,
        );
        drop(t);

        self.event_bus.publish_all(events);
        Ok(Outcome {
            record,
            notification,
        })
    }

    /// Donor pays directly. The amount is checked against the minimum fee
    /// before anything changes.
    ///
    /// # Errors
    ///
    /// - [`MarketError::NotFound`] if the request does not exist.
    /// - [`MarketError::Forbidden`] unless the actor filed the request.
    /// - [`MarketError::Validation`] if the amount is below the minimum or
    ///   the address / hash is malformed.
    /// - [`MarketError::Conflict`] unless the request is approved or
    ///   payment pending.
    pub async fn pay(
        &self,
        actor: &Actor,
        id: AdoptionRequestId,
        payment: PaymentSubmission,
    ) -> Result<Outcome<AdoptionRequest>, MarketError> {
        let mut t = self.ledger.write().await;
        let adoption_id = owned_by_donor(&t, actor, id)?;
        if !payment.amount.is_finite() || payment.amount < self.min_payment_usd {
            return Err(MarketError::Validation(format!(
                "payment of {} is below the {} minimum",
                payment.amount, self.min_payment_usd
            )));
        }
        let from_address = WalletAddress::parse(&payment.from_address)?;
        let tx_hash = payment
            .tx_hash
            .as_deref()
            .map(TxHash::parse)
            .transpose()?
            .map(|h| h.as_str().to_string());
        t.adoption_request(id)?.check(RequestAction::SubmitPayment)?;
        let welfare_id = t.adoption(adoption_id)?.posted_by;

        if let Some(request) = t.adoption_requests.get_mut(&id) {
            request.payment_proof = Some(from_address.as_str().to_string());
            request.payment = Some(PaymentRecord {
                amount: payment.amount,
                from_address,
                tx_hash,
                paid_at: Utc::now(),
            });
        }
        let mut events = Vec::new();
        let record = transition(&mut t, id, RequestAction::SubmitPayment, welfare_id, &mut events)?;
        let notification = notify(
            &mut t,
            Notice::new(
                welfare_id,
                actor.id,
                "Adoption Payment Submitted",
                format!(
                    "We received your payment of ${:.2}. The welfare will verify it shortly.",
                    payment.amount
                ),
            ),
            &mut events,
        );
        drop(t);

        self.event_bus.publish_all(events);
        Ok(Outcome {
            record,
            notification,
        })
    }

    /// Welfare reviews a payment under review.
    ///
    /// `verified == true` completes the request, marks the listing adopted
    /// by the donor and tells the donor. `verified == false` sends the
    /// request back to `payment pending` and tells the donor why.
    ///
    /// # Errors
    ///
    /// - [`MarketError::NotFound`] if the request does not exist.
    /// - [`MarketError::Forbidden`] unless the actor owns the listing.
    /// - [`MarketError::Conflict`] if the request is not under review, or
    ///   the listing was already adopted.
    pub async fn verify_payment(
        &self,
        actor: &Actor,
        id: AdoptionRequestId,
        verified: bool,
        note: Option<String>,
    ) -> Result<Outcome<AdoptionRequest>, MarketError> {
        let action = RequestAction::VerifyPayment { verified };
        let mut t = self.ledger.write().await;
        let (donor_id, adoption_id) = owned_by_welfare(&t, actor, id)?;
        t.adoption_request(id)?.check(action)?;
        let adoption = t.adoption(adoption_id)?;
        if verified && adoption.status == AdoptionStatus::Adopted {
            return Err(MarketError::Conflict(format!(
                "adoption {adoption_id} has already been adopted"
            )));
        }
        let name = adoption.name.clone();

        let mut events = Vec::new();
        let record = transition(&mut t, id, action, actor.id, &mut events)?;
        let notice = if verified {
            if let Some(adoption) = t.adoptions.get_mut(&adoption_id) {
                adoption.status = AdoptionStatus::Adopted;
                adoption.adopted_by = Some(donor_id);
            }
            events.push(MarketEvent::AdoptionCompleted {
                adoption_id,
                request_id: id,
                donor_id,
                welfare_id: actor.id,
                timestamp: Utc::now(),
            });
            tracing::info!(%adoption_id, donor = %donor_id, "adoption completed");
            Notice::new(
                actor.id,
                donor_id,
                "Adoption Payment Verified",
                format!("Your payment was verified. Congratulations, {name} is now yours!"),
            )
        } else {
            let reason = note.unwrap_or_else(|| "the payment could not be confirmed".to_string());
            Notice::new(
                actor.id,
                donor_id,
                "Adoption Payment Rejected",
                format!("Your payment for {name} was rejected: {reason}. Please resubmit."),
            )
        };
        let notification = notify(&mut t, notice, &mut events);
        drop(t);

        self.event_bus.publish_all(events);
        Ok(Outcome {
            record,
            notification,
        })
    }
}

/// Checks that `actor` is a registered welfare owning the request's
/// listing. Returns `(donor_id, adoption_id)`.
fn owned_by_welfare(
    t: &Tables,
    actor: &Actor,
    id: AdoptionRequestId,
) -> Result<(UserId, AdoptionId), MarketError> {
    let request = t.adoption_request(id)?;
    acting_as(t, actor, Role::Welfare)?;
    let adoption = t.adoption(request.adoption_id)?;
    if adoption.posted_by != actor.id {
        return Err(MarketError::Forbidden(format!(
            "adoption {} is owned by another welfare",
            adoption.id
        )));
    }
    Ok((request.donor_id, request.adoption_id))
}

/// Checks that `actor` filed the request. Returns its adoption id.
fn owned_by_donor(
    t: &Tables,
    actor: &Actor,
    id: AdoptionRequestId,
) -> Result<AdoptionId, MarketError> {
    let request = t.adoption_request(id)?;
    if request.donor_id != actor.id {
        return Err(MarketError::Forbidden(format!(
            "adoption request {id} was filed by another donor"
        )));
    }
    Ok(request.adoption_id)
}

/// Applies `action` to the stored request and records the transition event.
fn transition(
    t: &mut Tables,
    id: AdoptionRequestId,
    action: RequestAction,
    welfare_id: UserId,
    events: &mut Vec<MarketEvent>,
) -> Result<AdoptionRequest, MarketError> {
    let request = t
        .adoption_requests
        .get_mut(&id)
        .ok_or_else(|| MarketError::not_found("adoption request", id))?;
    let (from, to) = request.apply(action)?;
    tracing::info!(request_id = %id, %from, %to, "adoption request transitioned");
    events.push(MarketEvent::AdoptionRequestTransitioned {
        request_id: id,
        adoption_id: request.adoption_id,
        donor_id: request.donor_id,
        welfare_id,
        from,
        to,
        timestamp: request.updated_at,
    });
    Ok(request.clone())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::domain::AdoptionRequestStatus;
    use crate::service::fixtures::{ADDRESS, ledger_and_bus, register};

    struct World {
        service: AdoptionService,
        ledger: Arc<Ledger>,
        welfare: Actor,
        donor: Actor,
        adoption_id: AdoptionId,
    }

    async fn world() -> World {
        let (ledger, bus) = ledger_and_bus();
        let service = AdoptionService::new(Arc::clone(&ledger), bus, 30.0);
        let welfare = register(&ledger, Role::Welfare, true).await;
        let donor = register(&ledger, Role::Donor, false).await;
        let Ok(listing) = service
            .create_listing(
                &welfare,
                NewListing {
                    name: "Biscuit".into(),
                    species: "dog".into(),
                    breed: None,
                    age: Some("2 years".into()),
                    description: "friendly".into(),
                    images: vec![],
                },
            )
            .await
        else {
            panic!("listing creation failed");
        };
        World {
            service,
            ledger,
            welfare,
            donor,
            adoption_id: listing.id,
        }
    }

    async fn approved_request(w: &World) -> AdoptionRequestId {
        let Ok(request) = w
            .service
            .file_request(&w.donor, w.adoption_id, "big garden", None)
            .await
        else {
            panic!("filing failed");
        };
        assert_ok!(w.service.approve(&w.welfare, request.id).await);
        request.id
    }

    fn payment(amount: f64) -> PaymentSubmission {
        PaymentSubmission {
            amount,
            from_address: ADDRESS.to_string(),
            tx_hash: None,
        }
    }

    async fn status_of(w: &World, id: AdoptionRequestId) -> AdoptionRequestStatus {
        let t = w.ledger.read().await;
        let Ok(request) = t.adoption_request(id) else {
            panic!("request vanished");
        };
        request.status
    }

    #[tokio::test]
    async fn underpayment_is_rejected_without_state_change() {
        let w = world().await;
        let id = approved_request(&w).await;

        let result = w.service.pay(&w.donor, id, payment(25.0)).await;
        assert!(matches!(result, Err(MarketError::Validation(_))));
        assert_eq!(status_of(&w, id).await, AdoptionRequestStatus::Approved);
    }

    #[tokio::test]
    async fn payment_at_threshold_goes_under_review() {
        let w = world().await;
        let id = approved_request(&w).await;

        let Ok(outcome) = w.service.pay(&w.donor, id, payment(30.0)).await else {
            panic!("payment refused");
        };
        assert_eq!(outcome.record.status, AdoptionRequestStatus::UnderReview);
        assert!(outcome.notification.delivered);
        assert_eq!(outcome.record.payment_proof.as_deref(), Some(ADDRESS));
    }

    #[tokio::test]
    async fn only_the_filing_donor_may_pay() {
        let w = world().await;
        let id = approved_request(&w).await;
        let stranger = register(&w.ledger, Role::Donor, false).await;

        let result = w.service.pay(&stranger, id, payment(50.0)).await;
        assert!(matches!(result, Err(MarketError::Forbidden(_))));
    }

    #[tokio::test]
    async fn only_the_listing_owner_may_decide() {
        let w = world().await;
        let Ok(request) = w
            .service
            .file_request(&w.donor, w.adoption_id, "big garden", None)
            .await
        else {
            panic!("filing failed");
        };
        let other_welfare = register(&w.ledger, Role::Welfare, true).await;

        let result = w.service.approve(&other_welfare, request.id).await;
        assert!(matches!(result, Err(MarketError::Forbidden(_))));
        assert_eq!(status_of(&w, request.id).await, AdoptionRequestStatus::Pending);
    }

    #[tokio::test]
    async fn rejected_verification_returns_to_payment_pending_and_notifies() {
        let w = world().await;
        let id = approved_request(&w).await;
        assert_ok!(w.service.pay(&w.donor, id, payment(40.0)).await);

        let Ok(outcome) = w
            .service
            .verify_payment(&w.welfare, id, false, Some("amount not received".into()))
            .await
        else {
            panic!("verification failed");
        };
        assert_eq!(outcome.record.status, AdoptionRequestStatus::PaymentPending);

        let t = w.ledger.read().await;
        assert!(
            t.messages
                .values()
                .any(|m| m.to == w.donor.id && m.title.contains("Rejected"))
        );
        let Ok(adoption) = t.adoption(w.adoption_id) else {
            panic!("listing vanished");
        };
        assert_ne!(adoption.status, AdoptionStatus::Adopted);
    }

    #[tokio::test]
    async fn verified_payment_adopts_listing() {
        let w = world().await;
        let id = approved_request(&w).await;
        assert_ok!(
            w.service
                .submit_payment_proof(&w.donor, id, "uploads/receipt.png")
                .await
        );

        let Ok(outcome) = w.service.verify_payment(&w.welfare, id, true, None).await else {
            panic!("verification failed");
        };
        assert_eq!(outcome.record.status, AdoptionRequestStatus::Completed);

        let t = w.ledger.read().await;
        let Ok(adoption) = t.adoption(w.adoption_id) else {
            panic!("listing vanished");
        };
        assert_eq!(adoption.status, AdoptionStatus::Adopted);
        assert_eq!(adoption.adopted_by, Some(w.donor.id));
        let completed = t
            .adoption_requests
            .values()
            .filter(|r| {
                r.adoption_id == w.adoption_id && r.status == AdoptionRequestStatus::Completed
            })
            .count();
        assert_eq!(completed, 1);
    }

    #[tokio::test]
    async fn verifying_a_request_not_under_review_conflicts() {
        let w = world().await;
        let id = approved_request(&w).await;

        let result = w.service.verify_payment(&w.welfare, id, true, None).await;
        assert!(matches!(result, Err(MarketError::Conflict(_))));
    }

    #[tokio::test]
    async fn terminal_requests_accept_nothing() {
        let w = world().await;
        let Ok(request) = w
            .service
            .file_request(&w.donor, w.adoption_id, "big garden", None)
            .await
        else {
            panic!("filing failed");
        };
        assert_ok!(w.service.reject(&w.welfare, request.id).await);

        assert_err!(w.service.approve(&w.welfare, request.id).await);
        assert_err!(
            w.service
                .submit_payment_proof(&w.donor, request.id, "proof")
                .await
        );
        assert_eq!(status_of(&w, request.id).await, AdoptionRequestStatus::Rejected);
    }

    #[tokio::test]
    async fn duplicate_open_request_conflicts() {
        let w = world().await;
        assert_ok!(
            w.service
                .file_request(&w.donor, w.adoption_id, "garden", None)
                .await
        );
        let again = w
            .service
            .file_request(&w.donor, w.adoption_id, "garden", None)
            .await;
        assert!(matches!(again, Err(MarketError::Conflict(_))));
    }

    #[tokio::test]
    async fn approval_reserves_the_listing_for_one_request() {
        let w = world().await;
        let first = approved_request(&w).await;
        let other_donor = register(&w.ledger, Role::Donor, false).await;
        let Ok(second) = w
            .service
            .file_request(&other_donor, w.adoption_id, "balcony", None)
            .await
        else {
            panic!("filing failed");
        };

        let result = w.service.approve(&w.welfare, second.id).await;
        assert!(matches!(result, Err(MarketError::Conflict(_))));
        assert_eq!(status_of(&w, first).await, AdoptionRequestStatus::Approved);
    }

    #[tokio::test]
    async fn listing_stays_reserved_through_refused_payment() {
        let w = world().await;
        let id = approved_request(&w).await;
        assert_ok!(w.service.pay(&w.donor, id, payment(35.0)).await);
        assert_ok!(
            w.service
                .verify_payment(&w.welfare, id, false, Some("no funds arrived".into()))
                .await
        );
        assert_eq!(status_of(&w, id).await, AdoptionRequestStatus::PaymentPending);

        let Ok(listing) = w.service.listing(w.adoption_id).await else {
            panic!("listing vanished");
        };
        assert_eq!(listing.status, AdoptionStatus::Reserved);
        assert_eq!(listing.adopted_by, None);
    }

    #[tokio::test]
    async fn missing_recipient_does_not_undo_transition() {
        let w = world().await;
        let id = approved_request(&w).await;
        assert_ok!(w.service.pay(&w.donor, id, payment(35.0)).await);
        w.ledger.write().await.users.remove(&w.donor.id);

        let Ok(outcome) = w.service.verify_payment(&w.welfare, id, true, None).await else {
            panic!("verification failed");
        };
        assert!(!outcome.notification.delivered);
        assert_eq!(outcome.record.status, AdoptionRequestStatus::Completed);
    }
}
