//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::{EventBus, Ledger};
use crate::service::{
    AdoptionService, CaseService, DonationService, EmergencyService, UsdRate, UserService,
};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Accounts and inbox.
    pub user_service: Arc<UserService>,
    /// Cases and case updates.
    pub case_service: Arc<CaseService>,
    /// Adoption listings and requests.
    pub adoption_service: Arc<AdoptionService>,
    /// Donation recording.
    pub donation_service: Arc<DonationService>,
    /// Emergency triage and conversion.
    pub emergency_service: Arc<EmergencyService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires every service around one ledger and one event bus.
    #[must_use]
    pub fn new(
        ledger: Arc<Ledger>,
        event_bus: EventBus,
        rate: UsdRate,
        adoption_min_payment_usd: f64,
    ) -> Self {
        Self {
            user_service: Arc::new(UserService::new(Arc::clone(&ledger))),
            case_service: Arc::new(CaseService::new(Arc::clone(&ledger), event_bus.clone())),
            adoption_service: Arc::new(AdoptionService::new(
                Arc::clone(&ledger),
                event_bus.clone(),
                adoption_min_payment_usd,
            )),
            donation_service: Arc::new(DonationService::new(
                Arc::clone(&ledger),
                event_bus.clone(),
                rate,
            )),
            emergency_service: Arc::new(EmergencyService::new(ledger, event_bus.clone())),
            event_bus,
        }
    }
}
