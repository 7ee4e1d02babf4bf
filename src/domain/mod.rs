//! Domain layer: records, the adoption-request state machine, the ledger
//! store and the event system.

pub mod adoption;
pub mod case;
pub mod case_update;
pub mod chain;
pub mod donation;
pub mod emergency;
pub mod event;
pub mod event_bus;
pub mod ids;
pub mod ledger;
pub mod message;
pub mod user;

pub use adoption::{
    Adoption, AdoptionRequest, AdoptionRequestStatus, AdoptionStatus, PaymentRecord,
    RequestAction,
};
pub use case::{Case, CaseStatus, CostItem};
pub use case_update::{CaseUpdate, UpdateKind};
pub use chain::{TxHash, WalletAddress};
pub use donation::{Donation, DonationStatus};
pub use emergency::{Emergency, EmergencyStatus};
pub use event::{MarketEvent, UpdateChange};
pub use event_bus::EventBus;
pub use ids::{
    AdoptionId, AdoptionRequestId, CaseId, CaseUpdateId, DonationId, EmergencyId, MessageId,
    UserId,
};
pub use ledger::{Ledger, LedgerSnapshot, Tables};
pub use message::{Message, Notice};
pub use user::{Actor, Role, UserAccount};
