//! Emergency triage and emergency-to-case conversion.

use std::sync::Arc;

use chrono::Utc;

use super::{Outcome, acting_as, notify, required};
use crate::domain::case::resolve_target;
use crate::domain::{
    Actor, Case, CaseId, CaseStatus, CostItem, Emergency, EmergencyId, EmergencyStatus, EventBus,
    Ledger, MarketEvent, Notice, Role, UserId,
};
use crate::error::MarketError;

/// Fields of a new emergency report.
#[derive(Debug, Clone)]
pub struct NewEmergency {
    /// Short summary.
    pub title: String,
    /// What was observed.
    pub description: String,
    /// Where the animal is.
    pub location: String,
    /// Kind of animal, if known.
    pub animal_type: Option<String>,
    /// Photos.
    pub images: Vec<String>,
}

/// Funding terms supplied when converting an emergency.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    /// Case title; defaults to the emergency's title.
    pub title: Option<String>,
    /// Explicit target, used when no breakdown is given.
    pub target_amount: Option<f64>,
    /// Itemized costs; their sum becomes the target.
    pub cost_breakdown: Vec<CostItem>,
}

/// Drives emergencies from report to case.
#[derive(Debug, Clone)]
pub struct EmergencyService {
    ledger: Arc<Ledger>,
    event_bus: EventBus,
}

impl EmergencyService {
    /// Creates a new `EmergencyService`.
    #[must_use]
    pub fn new(ledger: Arc<Ledger>, event_bus: EventBus) -> Self {
        Self { ledger, event_bus }
    }

    /// Any registered account reports an emergency.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Forbidden`] for an unregistered caller, or
    /// [`MarketError::Validation`] on missing fields.
    pub async fn report(
        &self,
        actor: &Actor,
        report: NewEmergency,
    ) -> Result<Emergency, MarketError> {
        let mut t = self.ledger.write().await;
        t.account_with_role(actor.id, actor.role)?;
        let emergency = Emergency {
            id: EmergencyId::new(),
            title: required("title", &report.title)?,
            description: report.description,
            location: required("location", &report.location)?,
            animal_type: report.animal_type,
            images: report.images,
            status: EmergencyStatus::New,
            reported_by: actor.id,
            assigned_doctor: None,
            diagnosis: None,
            assigned_to: None,
            converted_to_case: false,
            case_id: None,
            created_at: Utc::now(),
        };
        t.emergencies.insert(emergency.id, emergency.clone());
        drop(t);

        self.event_bus.publish(MarketEvent::EmergencyReported {
            emergency_id: emergency.id,
            reported_by: actor.id,
            timestamp: emergency.created_at,
        });
        tracing::info!(emergency_id = %emergency.id, reporter = %actor.id, "emergency reported");
        Ok(emergency)
    }

    /// Emergencies, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<EmergencyStatus>) -> Vec<Emergency> {
        let t = self.ledger.read().await;
        let mut all: Vec<Emergency> = t
            .emergencies
            .values()
            .filter(|e| status.is_none_or(|s| e.status == s))
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Returns one emergency.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if it does not exist.
    pub async fn get(&self, id: EmergencyId) -> Result<Emergency, MarketError> {
        self.ledger.read().await.emergency(id).cloned()
    }

    /// Welfare puts a registered doctor on an open emergency.
    ///
    /// # Errors
    ///
    /// - [`MarketError::NotFound`] if the emergency does not exist.
    /// - [`MarketError::Forbidden`] unless the actor is a registered welfare.
    /// - [`MarketError::Validation`] if `doctor_id` is not a doctor.
    /// - [`MarketError::Conflict`] if the emergency is converted, resolved
    ///   or already being diagnosed.
    pub async fn assign_doctor(
        &self,
        actor: &Actor,
        id: EmergencyId,
        doctor_id: UserId,
    ) -> Result<Emergency, MarketError> {
        let mut t = self.ledger.write().await;
        let emergency = t.emergency(id)?;
        acting_as(&t, actor, Role::Welfare)?;
        emergency.ensure_open()?;
        if emergency.status == EmergencyStatus::InProgress {
            return Err(MarketError::Conflict(format!(
                "emergency {id} is already being diagnosed"
            )));
        }
        t.account_with_role(doctor_id, Role::Doctor)
            .map_err(|_| MarketError::Validation(format!("{doctor_id} is not a registered doctor")))?;

        let emergency = t
            .emergencies
            .get_mut(&id)
            .ok_or_else(|| MarketError::not_found("emergency", id))?;
        emergency.assigned_doctor = Some(doctor_id);
        emergency.status = EmergencyStatus::Assigned;
        let emergency = emergency.clone();
        drop(t);

        self.publish_update(&emergency);
        tracing::info!(emergency_id = %id, doctor = %doctor_id, "doctor assigned to emergency");
        Ok(emergency)
    }

    /// The assigned doctor records a diagnosis.
    ///
    /// # Errors
    ///
    /// - [`MarketError::NotFound`] if the emergency does not exist.
    /// - [`MarketError::Forbidden`] unless the actor is the assigned doctor.
    /// - [`MarketError::Validation`] if the diagnosis is empty.
    /// - [`MarketError::Conflict`] if the emergency is converted or resolved.
    pub async fn diagnose(
        &self,
        actor: &Actor,
        id: EmergencyId,
        diagnosis: &str,
    ) -> Result<Emergency, MarketError> {
        let mut t = self.ledger.write().await;
        let emergency = t.emergency(id)?;
        acting_as(&t, actor, Role::Doctor)?;
        if emergency.assigned_doctor != Some(actor.id) {
            return Err(MarketError::Forbidden(format!(
                "emergency {id} is assigned to another doctor"
            )));
        }
        emergency.ensure_open()?;
        let diagnosis = required("diagnosis", diagnosis)?;

        let emergency = t
            .emergencies
            .get_mut(&id)
            .ok_or_else(|| MarketError::not_found("emergency", id))?;
        emergency.diagnosis = Some(diagnosis);
        emergency.status = EmergencyStatus::InProgress;
        let emergency = emergency.clone();
        drop(t);

        self.publish_update(&emergency);
        tracing::info!(emergency_id = %id, doctor = %actor.id, "emergency diagnosed");
        Ok(emergency)
    }

    /// Converts an emergency into a fundraising case, exactly once.
    ///
    /// The new case takes the emergency's description, first image and
    /// assigned doctor, and the welfare's payment address. The emergency is
    /// latched as converted and resolved, and the reporter is told.
    ///
    /// # Errors
    ///
    /// - [`MarketError::NotFound`] if the emergency does not exist.
    /// - [`MarketError::Forbidden`] unless the actor is a registered welfare.
    /// - [`MarketError::Conflict`] if it was already converted or resolved.
    /// - [`MarketError::Validation`] if the welfare has no payment address
    ///   or the target is invalid.
    pub async fn convert_to_case(
        &self,
        actor: &Actor,
        id: EmergencyId,
        terms: Conversion,
    ) -> Result<Outcome<Case>, MarketError> {
        let mut t = self.ledger.write().await;
        let emergency = t.emergency(id)?;
        let welfare = acting_as(&t, actor, Role::Welfare)?;
        emergency.ensure_open()?;
        let wallet_address = welfare.blockchain_address.clone().ok_or_else(|| {
            MarketError::Validation(
                "register a blockchain address before converting emergencies".to_string(),
            )
        })?;
        let target_amount = resolve_target(terms.target_amount, &terms.cost_breakdown)?;
        let title = match terms.title {
            Some(title) => required("title", &title)?,
            None => emergency.title.clone(),
        };
        let reporter = emergency.reported_by;

        let case = Case {
            id: CaseId::new(),
            title,
            description: emergency.description.clone(),
            image: emergency.images.first().cloned(),
            cost_breakdown: terms.cost_breakdown,
            target_amount,
            amount_raised: 0.0,
            status: CaseStatus::Active,
            created_by: actor.id,
            wallet_address,
            assigned_doctor: emergency.assigned_doctor,
            emergency_id: Some(id),
            created_at: Utc::now(),
        };
        t.cases.insert(case.id, case.clone());
        if let Some(emergency) = t.emergencies.get_mut(&id) {
            emergency.converted_to_case = true;
            emergency.case_id = Some(case.id);
            emergency.assigned_to = Some(actor.id);
            emergency.status = EmergencyStatus::Resolved;
        }

        let mut events = vec![
            MarketEvent::CaseCreated {
                case_id: case.id,
                welfare_id: actor.id,
                emergency_id: Some(id),
                target_amount,
                timestamp: case.created_at,
            },
            MarketEvent::EmergencyConverted {
                emergency_id: id,
                case_id: case.id,
                welfare_id: actor.id,
                reported_by: reporter,
                timestamp: case.created_at,
            },
        ];
        let notification = notify(
            &mut t,
            Notice::new(
                actor.id,
                reporter,
                "Emergency Converted to Case",
                format!(
                    "The emergency you reported is now a fundraising case: {}.",
                    case.title
                ),
            )
            .about(case.id),
            &mut events,
        );
        drop(t);

        self.event_bus.publish_all(events);
        tracing::info!(emergency_id = %id, case_id = %case.id, welfare = %actor.id, "emergency converted to case");
        Ok(Outcome {
            record: case,
            notification,
        })
    }

    fn publish_update(&self, emergency: &Emergency) {
        self.event_bus.publish(MarketEvent::EmergencyUpdated {
            emergency_id: emergency.id,
            status: emergency.status,
            reported_by: emergency.reported_by,
            doctor_id: emergency.assigned_doctor,
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio_test::assert_ok;

    use super::*;
    use crate::service::fixtures::{ledger_and_bus, register};

    struct World {
        service: EmergencyService,
        ledger: Arc<Ledger>,
        reporter: Actor,
        emergency_id: EmergencyId,
    }

    async fn world() -> World {
        let (ledger, bus) = ledger_and_bus();
        let service = EmergencyService::new(Arc::clone(&ledger), bus);
        let reporter = register(&ledger, Role::Donor, false).await;
        let Ok(emergency) = service
            .report(
                &reporter,
                NewEmergency {
                    title: "Injured cat".into(),
                    description: "hit by a car".into(),
                    location: "Main street".into(),
                    animal_type: Some("cat".into()),
                    images: vec!["a.jpg".into(), "b.jpg".into()],
                },
            )
            .await
        else {
            panic!("report refused");
        };
        World {
            service,
            ledger,
            reporter,
            emergency_id: emergency.id,
        }
    }

    fn terms(target: f64) -> Conversion {
        Conversion {
            target_amount: Some(target),
            ..Conversion::default()
        }
    }

    #[tokio::test]
    async fn conversion_creates_case_and_latches_emergency() {
        let w = world().await;
        let welfare = register(&w.ledger, Role::Welfare, true).await;

        let Ok(outcome) = w
            .service
            .convert_to_case(&welfare, w.emergency_id, terms(250.0))
            .await
        else {
            panic!("conversion refused");
        };
        let case = outcome.record;
        assert_eq!(case.image.as_deref(), Some("a.jpg"));
        assert_eq!(case.emergency_id, Some(w.emergency_id));
        assert!(outcome.notification.delivered);

        let Ok(emergency) = w.service.get(w.emergency_id).await else {
            panic!("emergency vanished");
        };
        assert!(emergency.converted_to_case);
        assert_eq!(emergency.case_id, Some(case.id));
        assert_eq!(emergency.assigned_to, Some(welfare.id));
        assert_eq!(emergency.status, EmergencyStatus::Resolved);
        let t = w.ledger.read().await;
        assert!(t.messages.values().any(|m| m.to == w.reporter.id));
    }

    #[tokio::test]
    async fn second_conversion_conflicts_without_new_case() {
        let w = world().await;
        let welfare = register(&w.ledger, Role::Welfare, true).await;
        assert_ok!(
            w.service
                .convert_to_case(&welfare, w.emergency_id, terms(250.0))
                .await
        );

        let again = w
            .service
            .convert_to_case(&welfare, w.emergency_id, terms(250.0))
            .await;
        assert!(matches!(again, Err(MarketError::Conflict(_))));
        assert_eq!(w.ledger.read().await.cases.len(), 1);
    }

    #[tokio::test]
    async fn welfare_without_address_cannot_convert() {
        let w = world().await;
        let welfare = register(&w.ledger, Role::Welfare, false).await;

        let result = w
            .service
            .convert_to_case(&welfare, w.emergency_id, terms(250.0))
            .await;
        assert!(matches!(result, Err(MarketError::Validation(_))));

        let Ok(emergency) = w.service.get(w.emergency_id).await else {
            panic!("emergency vanished");
        };
        assert!(!emergency.converted_to_case);
        assert_eq!(emergency.status, EmergencyStatus::New);
        assert!(emergency.case_id.is_none());
        assert!(w.ledger.read().await.cases.is_empty());
    }

    #[tokio::test]
    async fn triage_then_conversion_carries_doctor() {
        let w = world().await;
        let welfare = register(&w.ledger, Role::Welfare, true).await;
        let doctor = register(&w.ledger, Role::Doctor, false).await;

        assert_ok!(
            w.service
                .assign_doctor(&welfare, w.emergency_id, doctor.id)
                .await
        );
        let Ok(diagnosed) = w
            .service
            .diagnose(&doctor, w.emergency_id, "fractured femur")
            .await
        else {
            panic!("diagnosis refused");
        };
        assert_eq!(diagnosed.status, EmergencyStatus::InProgress);

        let Ok(outcome) = w
            .service
            .convert_to_case(&welfare, w.emergency_id, terms(400.0))
            .await
        else {
            panic!("conversion refused");
        };
        assert_eq!(outcome.record.assigned_doctor, Some(doctor.id));
    }

    #[tokio::test]
    async fn only_assigned_doctor_diagnoses() {
        let w = world().await;
        let welfare = register(&w.ledger, Role::Welfare, true).await;
        let doctor = register(&w.ledger, Role::Doctor, false).await;
        let other = register(&w.ledger, Role::Doctor, false).await;
        assert_ok!(
            w.service
                .assign_doctor(&welfare, w.emergency_id, doctor.id)
                .await
        );

        let result = w.service.diagnose(&other, w.emergency_id, "guess").await;
        assert!(matches!(result, Err(MarketError::Forbidden(_))));
    }

    #[tokio::test]
    async fn resolved_emergency_rejects_triage() {
        let w = world().await;
        let welfare = register(&w.ledger, Role::Welfare, true).await;
        let doctor = register(&w.ledger, Role::Doctor, false).await;
        assert_ok!(
            w.service
                .convert_to_case(&welfare, w.emergency_id, terms(100.0))
                .await
        );

        let result = w
            .service
            .assign_doctor(&welfare, w.emergency_id, doctor.id)
            .await;
        assert!(matches!(result, Err(MarketError::Conflict(_))));
    }
}
