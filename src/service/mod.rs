//! Service layer: workflow orchestration.
//!
//! Each service owns an `Arc<Ledger>` for state and an [`EventBus`] for
//! event emission. Every mutation follows the same pattern: take the
//! ledger write guard → check every precondition → apply every effect
//! (including inbox messages) → release → publish events.
//!
//! [`EventBus`]: crate::domain::EventBus

pub mod adoption_service;
pub mod case_service;
pub mod donation_service;
pub mod emergency_service;
pub mod rate;
pub mod user_service;

pub use adoption_service::AdoptionService;
pub use case_service::CaseService;
pub use donation_service::DonationService;
pub use emergency_service::EmergencyService;
pub use rate::UsdRate;
pub use user_service::UserService;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Actor, MarketEvent, Notice, Role, Tables, UserAccount};
use crate::error::MarketError;

/// Whether the inbox message that accompanies a transition was written.
///
/// A failed notification never undoes the transition it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NotificationStatus {
    /// `true` if the message reached the recipient's inbox.
    pub delivered: bool,
    /// Why delivery failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationStatus {
    fn delivered() -> Self {
        Self {
            delivered: true,
            error: None,
        }
    }

    fn failed(error: &MarketError) -> Self {
        Self {
            delivered: false,
            error: Some(error.to_string()),
        }
    }
}

/// Result of a workflow operation together with its notification outcome.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    /// The record after the operation.
    pub record: T,
    /// What happened to the accompanying message.
    pub notification: NotificationStatus,
}

/// Checks that `actor` claims `role` and is registered with it.
fn acting_as<'t>(
    tables: &'t Tables,
    actor: &Actor,
    role: Role,
) -> Result<&'t UserAccount, MarketError> {
    actor.require(role)?;
    tables.account_with_role(actor.id, role)
}

/// Delivers `notice` inside the current unit, collecting the event on
/// success. Delivery failures are logged and reported, never propagated.
fn notify(tables: &mut Tables, notice: Notice, events: &mut Vec<MarketEvent>) -> NotificationStatus {
    let recipient = notice.to;
    match tables.deliver(notice) {
        Ok(event) => {
            events.push(event);
            NotificationStatus::delivered()
        }
        Err(err) => {
            tracing::warn!(%recipient, error = %err, "notification not delivered");
            NotificationStatus::failed(&err)
        }
    }
}

/// Trims `value` and fails with [`MarketError::Validation`] if nothing is left.
fn required(field: &str, value: &str) -> Result<String, MarketError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MarketError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
