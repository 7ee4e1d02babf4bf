//! Fundraising cases and their updates.
//!
//! `has_updates` is never stored: [`CaseView`] computes it from the update
//! table each time a case is read, and every update change reports the
//! value it leaves behind.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use super::{acting_as, required};
use crate::domain::case::resolve_target;
use crate::domain::{
    Actor, Case, CaseId, CaseStatus, CaseUpdate, CaseUpdateId, CostItem, EventBus, Ledger,
    MarketEvent, Role, Tables, UpdateChange, UpdateKind, UserId,
};
use crate::error::MarketError;

/// Fields of a new case.
#[derive(Debug, Clone)]
pub struct NewCase {
    /// Headline.
    pub title: String,
    /// What the money is for.
    pub description: String,
    /// Cover image.
    pub image: Option<String>,
    /// Explicit target, used when no breakdown is given.
    pub target_amount: Option<f64>,
    /// Itemized costs; their sum becomes the target.
    pub cost_breakdown: Vec<CostItem>,
}

/// Fields of a new case update.
#[derive(Debug, Clone)]
pub struct NewUpdate {
    /// Diagnosis, progress or success story.
    pub kind: UpdateKind,
    /// Headline.
    pub title: String,
    /// Body.
    pub content: String,
    /// Attached images.
    pub images: Vec<String>,
}

/// A case as served to readers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CaseView {
    /// The stored case.
    #[serde(flatten)]
    pub case: Case,
    /// Whether any update exists for the case.
    pub has_updates: bool,
}

/// Manages cases and case updates.
#[derive(Debug, Clone)]
pub struct CaseService {
    ledger: Arc<Ledger>,
    event_bus: EventBus,
}

impl CaseService {
    /// Creates a new `CaseService`.
    #[must_use]
    pub fn new(ledger: Arc<Ledger>, event_bus: EventBus) -> Self {
        Self { ledger, event_bus }
    }

    /// Welfare opens a case. Its registered address receives the funds.
    ///
    /// # Errors
    ///
    /// - [`MarketError::Forbidden`] unless the actor is a registered welfare.
    /// - [`MarketError::Validation`] on missing fields, an invalid target or
    ///   a missing payment address.
    pub async fn create(&self, actor: &Actor, new: NewCase) -> Result<CaseView, MarketError> {
        let mut t = self.ledger.write().await;
        let welfare = acting_as(&t, actor, Role::Welfare)?;
        let wallet_address = welfare.blockchain_address.clone().ok_or_else(|| {
            MarketError::Validation("register a blockchain address before creating cases".into())
        })?;
        let target_amount = resolve_target(new.target_amount, &new.cost_breakdown)?;
        let case = Case {
            id: CaseId::new(),
            title: required("title", &new.title)?,
            description: new.description,
            image: new.image,
            cost_breakdown: new.cost_breakdown,
            target_amount,
            amount_raised: 0.0,
            status: CaseStatus::Active,
            created_by: actor.id,
            wallet_address,
            assigned_doctor: None,
            emergency_id: None,
            created_at: Utc::now(),
        };
        t.cases.insert(case.id, case.clone());
        drop(t);

        self.event_bus.publish(MarketEvent::CaseCreated {
            case_id: case.id,
            welfare_id: actor.id,
            emergency_id: None,
            target_amount,
            timestamp: case.created_at,
        });
        tracing::info!(case_id = %case.id, welfare = %actor.id, target_amount, "case created");
        Ok(CaseView {
            case,
            has_updates: false,
        })
    }

    /// Cases, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<CaseStatus>) -> Vec<CaseView> {
        let t = self.ledger.read().await;
        let mut cases: Vec<CaseView> = t
            .cases
            .values()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .map(|c| view(&t, c))
            .collect();
        cases.sort_by(|a, b| b.case.created_at.cmp(&a.case.created_at));
        cases
    }

    /// Returns one case.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if it does not exist.
    pub async fn get(&self, id: CaseId) -> Result<CaseView, MarketError> {
        let t = self.ledger.read().await;
        let case = t.case(id)?;
        Ok(view(&t, case))
    }

    /// Owning welfare assigns a registered doctor to the case.
    ///
    /// # Errors
    ///
    /// - [`MarketError::NotFound`] if the case does not exist.
    /// - [`MarketError::Forbidden`] unless the actor owns the case.
    /// - [`MarketError::Validation`] if `doctor_id` is not a doctor.
    pub async fn assign_doctor(
        &self,
        actor: &Actor,
        id: CaseId,
        doctor_id: UserId,
    ) -> Result<CaseView, MarketError> {
        let mut t = self.ledger.write().await;
        owned_case(&t, actor, id)?;
        t.account_with_role(doctor_id, Role::Doctor)
            .map_err(|_| MarketError::Validation(format!("{doctor_id} is not a registered doctor")))?;
        let case = t.case_mut(id)?;
        case.assigned_doctor = Some(doctor_id);
        let case = case.clone();
        tracing::info!(case_id = %id, doctor = %doctor_id, "doctor assigned to case");
        Ok(view(&t, &case))
    }

    /// Posts an unpublished update. The owning welfare posts progress
    /// reports and success stories; the assigned doctor posts diagnoses.
    ///
    /// # Errors
    ///
    /// - [`MarketError::NotFound`] if the case does not exist.
    /// - [`MarketError::Forbidden`] if the actor may not post this kind.
    /// - [`MarketError::Validation`] on missing fields.
    pub async fn post_update(
        &self,
        actor: &Actor,
        case_id: CaseId,
        new: NewUpdate,
    ) -> Result<CaseUpdate, MarketError> {
        let mut t = self.ledger.write().await;
        let case = t.case(case_id)?;
        let allowed = match new.kind {
            UpdateKind::Diagnosis => {
                actor.role == Role::Doctor && case.assigned_doctor == Some(actor.id)
            }
            UpdateKind::Progress | UpdateKind::SuccessStory => {
                actor.role == Role::Welfare && case.is_owned_by(actor.id)
            }
        };
        if !allowed {
            return Err(MarketError::Forbidden(format!(
                "{} may not post this update on case {case_id}",
                actor.id
            )));
        }
        t.account_with_role(actor.id, actor.role)?;
        let welfare_id = case.created_by;

        let update = CaseUpdate {
            id: CaseUpdateId::new(),
            case_id,
            author: actor.id,
            kind: new.kind,
            title: required("title", &new.title)?,
            content: required("content", &new.content)?,
            images: new.images,
            is_published: false,
            created_at: Utc::now(),
        };
        t.case_updates.insert(update.id, update.clone());
        drop(t);

        self.changed(&update, welfare_id, UpdateChange::Posted, true);
        Ok(update)
    }

    /// Owning welfare publishes or hides an update.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] or [`MarketError::Forbidden`].
    pub async fn set_published(
        &self,
        actor: &Actor,
        id: CaseUpdateId,
        published: bool,
    ) -> Result<CaseUpdate, MarketError> {
        let mut t = self.ledger.write().await;
        let case_id = t.case_update(id)?.case_id;
        owned_case(&t, actor, case_id)?;
        let update = t
            .case_updates
            .get_mut(&id)
            .ok_or_else(|| MarketError::not_found("case update", id))?;
        update.is_published = published;
        let update = update.clone();
        drop(t);

        let change = if published {
            UpdateChange::Published
        } else {
            UpdateChange::Unpublished
        };
        self.changed(&update, actor.id, change, true);
        Ok(update)
    }

    /// Removes an update. Allowed for the case owner and the author.
    /// Returns whether the case still has updates.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] or [`MarketError::Forbidden`].
    pub async fn delete_update(&self, actor: &Actor, id: CaseUpdateId) -> Result<bool, MarketError> {
        let mut t = self.ledger.write().await;
        let update = t.case_update(id)?;
        let case = t.case(update.case_id)?;
        if !case.is_owned_by(actor.id) && update.author != actor.id {
            return Err(MarketError::Forbidden(format!(
                "case update {id} belongs to another account"
            )));
        }
        let welfare_id = case.created_by;
        let Some(update) = t.case_updates.remove(&id) else {
            return Err(MarketError::not_found("case update", id));
        };
        let has_updates = t.has_updates(update.case_id);
        drop(t);

        self.changed(&update, welfare_id, UpdateChange::Deleted, has_updates);
        Ok(has_updates)
    }

    /// Published updates for a case, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if the case does not exist.
    pub async fn published_updates(&self, case_id: CaseId) -> Result<Vec<CaseUpdate>, MarketError> {
        let t = self.ledger.read().await;
        t.case(case_id)?;
        Ok(updates_of(&t, case_id, true))
    }

    /// Every update for a case, for its owner or assigned doctor.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] or [`MarketError::Forbidden`].
    pub async fn all_updates(
        &self,
        actor: &Actor,
        case_id: CaseId,
    ) -> Result<Vec<CaseUpdate>, MarketError> {
        let t = self.ledger.read().await;
        let case = t.case(case_id)?;
        if !case.is_owned_by(actor.id) && case.assigned_doctor != Some(actor.id) {
            return Err(MarketError::Forbidden(format!(
                "unpublished updates of case {case_id} are private"
            )));
        }
        Ok(updates_of(&t, case_id, false))
    }

    fn changed(&self, update: &CaseUpdate, welfare_id: UserId, change: UpdateChange, has_updates: bool) {
        tracing::info!(case_id = %update.case_id, update_id = %update.id, ?change, has_updates, "case update changed");
        self.event_bus.publish(MarketEvent::CaseUpdateChanged {
            case_id: update.case_id,
            update_id: update.id,
            welfare_id,
            change,
            has_updates,
            timestamp: Utc::now(),
        });
    }
}

fn view(t: &Tables, case: &Case) -> CaseView {
    CaseView {
        case: case.clone(),
        has_updates: t.has_updates(case.id),
    }
}

fn owned_case(t: &Tables, actor: &Actor, id: CaseId) -> Result<(), MarketError> {
    let case = t.case(id)?;
    acting_as(t, actor, Role::Welfare)?;
    if !case.is_owned_by(actor.id) {
        return Err(MarketError::Forbidden(format!(
            "case {id} is owned by another welfare"
        )));
    }
    Ok(())
}

fn updates_of(t: &Tables, case_id: CaseId, published_only: bool) -> Vec<CaseUpdate> {
    let mut updates: Vec<CaseUpdate> = t
        .case_updates
        .values()
        .filter(|u| u.case_id == case_id && (u.is_published || !published_only))
        .cloned()
        .collect();
    updates.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    updates
}
