//! Account registration, payment addresses and the inbox.

use std::sync::Arc;

use super::{acting_as, required};
use crate::domain::{Actor, Ledger, Message, MessageId, Role, UserAccount, UserId, WalletAddress};
use crate::error::MarketError;

/// Fields of a new account.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Account role.
    pub role: Role,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Payment-receiving address.
    pub blockchain_address: Option<String>,
}

/// Registers accounts and serves inboxes.
#[derive(Debug, Clone)]
pub struct UserService {
    ledger: Arc<Ledger>,
}

impl UserService {
    /// Creates a new `UserService`.
    #[must_use]
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// Registers an account.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] for a missing name, a malformed
    /// email or address, or [`MarketError::Conflict`] if the email is taken.
    pub async fn register(&self, registration: Registration) -> Result<UserAccount, MarketError> {
        let name = required("name", &registration.name)?;
        let email = required("email", &registration.email)?.to_ascii_lowercase();
        if !email.contains('@') {
            return Err(MarketError::Validation(format!("invalid email: {email}")));
        }
        let address = registration
            .blockchain_address
            .as_deref()
            .map(WalletAddress::parse)
            .transpose()?;

        let mut t = self.ledger.write().await;
        if t.users.values().any(|u| u.email == email) {
            return Err(MarketError::Conflict(format!(
                "an account for {email} already exists"
            )));
        }
        let account = UserAccount::new(registration.role, name, email, address);
        t.users.insert(account.id, account.clone());
        tracing::info!(user_id = %account.id, role = %account.role, "account registered");
        Ok(account)
    }

    /// Returns an account's profile.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] if it is not registered.
    pub async fn profile(&self, id: UserId) -> Result<UserAccount, MarketError> {
        self.ledger.read().await.user(id).cloned()
    }

    /// Welfare sets or replaces its payment-receiving address.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Forbidden`] unless the actor is a registered
    /// welfare, or [`MarketError::Validation`] for a malformed address.
    pub async fn set_blockchain_address(
        &self,
        actor: &Actor,
        address: &str,
    ) -> Result<UserAccount, MarketError> {
        let address = WalletAddress::parse(address)?;
        let mut t = self.ledger.write().await;
        acting_as(&t, actor, Role::Welfare)?;
        let account = t
            .users
            .get_mut(&actor.id)
            .ok_or_else(|| MarketError::not_found("user", actor.id))?;
        account.blockchain_address = Some(address);
        tracing::info!(user_id = %actor.id, "blockchain address updated");
        Ok(account.clone())
    }

    /// The actor's inbox, newest first.
    pub async fn inbox(&self, actor: &Actor) -> Vec<Message> {
        let t = self.ledger.read().await;
        let mut messages: Vec<Message> = t
            .messages
            .values()
            .filter(|m| m.to == actor.id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        messages
    }

    /// Marks a message read. Only its recipient may.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotFound`] or [`MarketError::Forbidden`].
    pub async fn mark_read(&self, actor: &Actor, id: MessageId) -> Result<Message, MarketError> {
        let mut t = self.ledger.write().await;
        let message = t
            .messages
            .get_mut(&id)
            .ok_or_else(|| MarketError::not_found("message", id))?;
        if message.to != actor.id {
            return Err(MarketError::Forbidden(format!(
                "message {id} is addressed to another account"
            )));
        }
        message.is_read = true;
        Ok(message.clone())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Notice;
    use crate::service::fixtures::ADDRESS;

    fn registration(role: Role, email: &str) -> Registration {
        Registration {
            role,
            name: "Paws Shelter".into(),
            email: email.into(),
            blockchain_address: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let service = UserService::new(Arc::new(Ledger::new()));
        assert!(service.register(registration(Role::Donor, "a@b.org")).await.is_ok());
        let again = service.register(registration(Role::Welfare, "A@B.org")).await;
        assert!(matches!(again, Err(MarketError::Conflict(_))));
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let service = UserService::new(Arc::new(Ledger::new()));
        let result = service.register(registration(Role::Donor, "nobody")).await;
        assert!(matches!(result, Err(MarketError::Validation(_))));
    }

    #[tokio::test]
    async fn only_welfare_sets_address() {
        let service = UserService::new(Arc::new(Ledger::new()));
        let Ok(donor) = service.register(registration(Role::Donor, "d@x.org")).await else {
            panic!("registration refused");
        };
        let Ok(welfare) = service.register(registration(Role::Welfare, "w@x.org")).await else {
            panic!("registration refused");
        };

        let denied = service
            .set_blockchain_address(&Actor::new(donor.id, Role::Donor), ADDRESS)
            .await;
        assert!(matches!(denied, Err(MarketError::Forbidden(_))));

        let Ok(updated) = service
            .set_blockchain_address(&Actor::new(welfare.id, Role::Welfare), ADDRESS)
            .await
        else {
            panic!("address refused");
        };
        assert_eq!(
            updated.blockchain_address.map(|a| a.as_str().to_string()),
            Some(ADDRESS.to_string())
        );
    }

    #[tokio::test]
    async fn only_recipient_marks_read() {
        let ledger = Arc::new(Ledger::new());
        let service = UserService::new(Arc::clone(&ledger));
        let Ok(donor) = service.register(registration(Role::Donor, "d@x.org")).await else {
            panic!("registration refused");
        };
        let message_id = {
            let mut t = ledger.write().await;
            if t.deliver(Notice::new(UserId::new(), donor.id, "hello", "body")).is_err() {
                panic!("delivery failed");
            }
            let Some(id) = t.messages.keys().next().copied() else {
                panic!("message missing");
            };
            id
        };

        let stranger = Actor::new(UserId::new(), Role::Donor);
        assert!(matches!(
            service.mark_read(&stranger, message_id).await,
            Err(MarketError::Forbidden(_))
        ));
        let me = Actor::new(donor.id, Role::Donor);
        assert!(matches!(service.mark_read(&me, message_id).await, Ok(m) if m.is_read));
        assert_eq!(service.inbox(&me).await.len(), 1);
    }
}
