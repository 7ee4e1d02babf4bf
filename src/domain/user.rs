//! Registered accounts and their roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{UserId, WalletAddress};
use crate::error::MarketError;

/// What an account is allowed to do on the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Browses, donates, files adoption requests.
    Donor,
    /// Welfare organization: posts cases and listings, owns their lifecycle.
    Welfare,
    /// Veterinarian: diagnoses emergencies and assigned cases.
    Doctor,
}

impl Role {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::Welfare => "welfare",
            Self::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "donor" => Ok(Self::Donor),
            "welfare" => Ok(Self::Welfare),
            "doctor" => Ok(Self::Doctor),
            other => Err(MarketError::Validation(format!("unknown role: {other}"))),
        }
    }
}

/// Authenticated caller of a workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Authenticated subject.
    pub id: UserId,
    /// Role claimed by the identity layer.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Fails with [`MarketError::Forbidden`] unless the claimed role is `role`.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn require(&self, role: Role) -> Result<(), MarketError> {
        if self.role == role {
            Ok(())
        } else {
            Err(MarketError::Forbidden(format!(
                "only a {role} may do this, caller is a {}",
                self.role
            )))
        }
    }
}

/// A registered donor, welfare organization or doctor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserAccount {
    /// Account identifier.
    pub id: UserId,
    /// Account role.
    pub role: Role,
    /// Display name.
    pub name: String,
    /// Contact email, unique across accounts.
    pub email: String,
    /// Payment-receiving address. Welfare organizations need one before
    /// they can raise funds.
    pub blockchain_address: Option<WalletAddress>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Creates a new account with a fresh id.
    #[must_use]
    pub fn new(
        role: Role,
        name: String,
        email: String,
        blockchain_address: Option<WalletAddress>,
    ) -> Self {
        Self {
            id: UserId::new(),
            role,
            name,
            email,
            blockchain_address,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Welfare".parse::<Role>().ok(), Some(Role::Welfare));
        assert_eq!(" doctor ".parse::<Role>().ok(), Some(Role::Doctor));
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn role_round_trips_through_display() {
        for role in [Role::Donor, Role::Welfare, Role::Doctor] {
            assert_eq!(role.to_string().parse::<Role>().ok(), Some(role));
        }
    }
}
