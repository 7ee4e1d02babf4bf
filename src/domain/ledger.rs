//! In-process record store.
//!
//! [`Ledger`] keeps every record table behind a single
//! [`tokio::sync::RwLock`]. A workflow operation takes the write guard
//! once, checks all of its preconditions, then applies all of its effects
//! before releasing it, so readers never observe a half-applied unit
//! (e.g. a donation without the matching case credit).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{
    Adoption, AdoptionId, AdoptionRequest, AdoptionRequestId, Case, CaseId, CaseUpdate,
    CaseUpdateId, Donation, DonationId, Emergency, EmergencyId, MarketEvent, Message, MessageId,
    Notice, Role, TxHash, UserAccount, UserId,
};
use crate::error::MarketError;

/// All record tables.
#[derive(Debug, Default)]
pub struct Tables {
    /// Registered accounts.
    pub users: HashMap<UserId, UserAccount>,
    /// Fundraising cases.
    pub cases: HashMap<CaseId, Case>,
    /// Case updates.
    pub case_updates: HashMap<CaseUpdateId, CaseUpdate>,
    /// Recorded donations.
    pub donations: HashMap<DonationId, Donation>,
    /// Adoption listings.
    pub adoptions: HashMap<AdoptionId, Adoption>,
    /// Adoption requests.
    pub adoption_requests: HashMap<AdoptionRequestId, AdoptionRequest>,
    /// Emergency reports.
    pub emergencies: HashMap<EmergencyId, Emergency>,
    /// Inbox messages.
    pub messages: HashMap<MessageId, Message>,
}

impl Tables {
    /// Looks up an account.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if it is not registered.
    pub fn user(&self, id: UserId) -> Result<&UserAccount, MarketError> {
        self.users
            .get(&id)
            .ok_or_else(|| MarketError::not_found("user", id))
    }

    /// Looks up an account and checks it holds `role`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Forbidden`] if the account is unknown or holds
    /// another role.
    pub fn account_with_role(&self, id: UserId, role: Role) -> Result<&UserAccount, MarketError> {
        match self.users.get(&id) {
            Some(account) if account.role == role => Ok(account),
            Some(account) => Err(MarketError::Forbidden(format!(
                "account {id} is a {}, not a {role}",
                account.role
            ))),
            None => Err(MarketError::Forbidden(format!(
                "account {id} is not registered"
            ))),
        }
    }

    /// Looks up a case.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if it does not exist.
    pub fn case(&self, id: CaseId) -> Result<&Case, MarketError> {
        self.cases
            .get(&id)
            .ok_or_else(|| MarketError::not_found("case", id))
    }

    /// Mutable variant of [`Tables::case`].
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if it does not exist.
    pub fn case_mut(&mut self, id: CaseId) -> Result<&mut Case, MarketError> {
        self.cases
            .get_mut(&id)
            .ok_or_else(|| MarketError::not_found("case", id))
    }

    /// Looks up a case update.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if it does not exist.
    pub fn case_update(&self, id: CaseUpdateId) -> Result<&CaseUpdate, MarketError> {
        self.case_updates
            .get(&id)
            .ok_or_else(|| MarketError::not_found("case update", id))
    }

    /// Looks up an adoption listing.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if it does not exist.
    pub fn adoption(&self, id: AdoptionId) -> Result<&Adoption, MarketError> {
        self.adoptions
            .get(&id)
            .ok_or_else(|| MarketError::not_found("adoption", id))
    }

    /// Looks up an adoption request.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if it does not exist.
    pub fn adoption_request(&self, id: AdoptionRequestId) -> Result<&AdoptionRequest, MarketError> {
        self.adoption_requests
            .get(&id)
            .ok_or_else(|| MarketError::not_found("adoption request", id))
    }

    /// Looks up an emergency.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if it does not exist.
    pub fn emergency(&self, id: EmergencyId) -> Result<&Emergency, MarketError> {
        self.emergencies
            .get(&id)
            .ok_or_else(|| MarketError::not_found("emergency", id))
    }

    /// Returns `true` if any update exists for the case. Computed on every
    /// call rather than stored on the case.
    #[must_use]
    pub fn has_updates(&self, case_id: CaseId) -> bool {
        self.case_updates.values().any(|u| u.case_id == case_id)
    }

    /// Returns `true` if a donation with this transfer hash was recorded.
    #[must_use]
    pub fn has_donation_for(&self, tx_hash: &TxHash) -> bool {
        self.donations.values().any(|d| &d.tx_hash == tx_hash)
    }

    /// Writes a message into the recipient's inbox and returns the
    /// matching [`MarketEvent::MessageCreated`].
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Upstream`] if the recipient has no account to
    /// deliver to. Nothing is written in that case.
    pub fn deliver(&mut self, notice: Notice) -> Result<MarketEvent, MarketError> {
        if !self.users.contains_key(&notice.to) {
            return Err(MarketError::Upstream(format!(
                "no inbox for recipient {}",
                notice.to
            )));
        }
        let message = notice.into_message();
        let event = MarketEvent::MessageCreated {
            message_id: message.id,
            recipient: message.to,
            title: message.title.clone(),
            timestamp: message.created_at,
        };
        self.messages.insert(message.id, message);
        Ok(event)
    }
}

/// Serializable copy of every table, used for persistence snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Registered accounts.
    pub users: Vec<UserAccount>,
    /// Fundraising cases.
    pub cases: Vec<Case>,
    /// Case updates.
    pub case_updates: Vec<CaseUpdate>,
    /// Recorded donations.
    pub donations: Vec<Donation>,
    /// Adoption listings.
    pub adoptions: Vec<Adoption>,
    /// Adoption requests.
    pub adoption_requests: Vec<AdoptionRequest>,
    /// Emergency reports.
    pub emergencies: Vec<Emergency>,
    /// Inbox messages.
    pub messages: Vec<Message>,
}

impl LedgerSnapshot {
    /// Total number of records across tables.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.users.len()
            + self.cases.len()
            + self.case_updates.len()
            + self.donations.len()
            + self.adoptions.len()
            + self.adoption_requests.len()
            + self.emergencies.len()
            + self.messages.len()
    }
}

/// Central store for all marketplace records.
#[derive(Debug, Default)]
pub struct Ledger {
    tables: RwLock<Tables>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires shared read access to every table.
    pub async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    /// Acquires exclusive access to every table for one workflow unit.
    pub async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }

    /// Copies every table into a [`LedgerSnapshot`].
    pub async fn snapshot(&self) -> LedgerSnapshot {
        let t = self.tables.read().await;
        LedgerSnapshot {
            users: t.users.values().cloned().collect(),
            cases: t.cases.values().cloned().collect(),
            case_updates: t.case_updates.values().cloned().collect(),
            donations: t.donations.values().cloned().collect(),
            adoptions: t.adoptions.values().cloned().collect(),
            adoption_requests: t.adoption_requests.values().cloned().collect(),
            emergencies: t.emergencies.values().cloned().collect(),
            messages: t.messages.values().cloned().collect(),
        }
    }

    /// Replaces every table with the contents of `snapshot`.
    pub async fn restore(&self, snapshot: LedgerSnapshot) {
        let mut t = self.tables.write().await;
        *t = Tables {
            users: snapshot.users.into_iter().map(|r| (r.id, r)).collect(),
            cases: snapshot.cases.into_iter().map(|r| (r.id, r)).collect(),
            case_updates: snapshot.case_updates.into_iter().map(|r| (r.id, r)).collect(),
            donations: snapshot.donations.into_iter().map(|r| (r.id, r)).collect(),
            adoptions: snapshot.adoptions.into_iter().map(|r| (r.id, r)).collect(),
            adoption_requests: snapshot
                .adoption_requests
                .into_iter()
                .map(|r| (r.id, r))
                .collect(),
            emergencies: snapshot.emergencies.into_iter().map(|r| (r.id, r)).collect(),
            messages: snapshot.messages.into_iter().map(|r| (r.id, r)).collect(),
        };
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn account(role: Role) -> UserAccount {
        UserAccount::new(role, "a".into(), format!("{}@x.org", UserId::new()), None)
    }

    #[tokio::test]
    async fn deliver_requires_registered_recipient() {
        let ledger = Ledger::new();
        let mut t = ledger.write().await;
        let sender = UserId::new();
        let result = t.deliver(Notice::new(sender, UserId::new(), "hi", "there"));
        assert!(matches!(result, Err(MarketError::Upstream(_))));
        assert!(t.messages.is_empty());
    }

    #[tokio::test]
    async fn deliver_writes_unread_message() {
        let ledger = Ledger::new();
        let mut t = ledger.write().await;
        let donor = account(Role::Donor);
        let donor_id = donor.id;
        t.users.insert(donor_id, donor);
        let Ok(event) = t.deliver(Notice::new(UserId::new(), donor_id, "hi", "there")) else {
            panic!("delivery failed");
        };
        assert_eq!(event.audience(), vec![donor_id]);
        let Some(message) = t.messages.values().next() else {
            panic!("message not stored");
        };
        assert!(!message.is_read);
        assert_eq!(message.to, donor_id);
    }

    #[tokio::test]
    async fn role_check_distinguishes_roles() {
        let ledger = Ledger::new();
        let mut t = ledger.write().await;
        let doctor = account(Role::Doctor);
        let id = doctor.id;
        t.users.insert(id, doctor);
        assert!(t.account_with_role(id, Role::Doctor).is_ok());
        assert!(matches!(
            t.account_with_role(id, Role::Welfare),
            Err(MarketError::Forbidden(_))
        ));
        assert!(matches!(
            t.account_with_role(UserId::new(), Role::Doctor),
            Err(MarketError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn snapshot_restore_round_trip() {
        let ledger = Ledger::new();
        {
            let mut t = ledger.write().await;
            for role in [Role::Donor, Role::Welfare] {
                let a = account(role);
                t.users.insert(a.id, a);
            }
        }
        let snapshot = ledger.snapshot().await;
        assert_eq!(snapshot.record_count(), 2);

        let restored = Ledger::new();
        restored.restore(snapshot).await;
        assert_eq!(restored.read().await.users.len(), 2);
    }
}
