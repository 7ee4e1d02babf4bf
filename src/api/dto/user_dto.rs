//! Account and inbox DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::Role;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    /// Account role.
    pub role: Role,
    /// Display name.
    pub name: String,
    /// Contact email, unique across accounts.
    pub email: String,
    /// Payment-receiving address (`0x` + 40 hex chars).
    #[serde(default)]
    pub blockchain_address: Option<String>,
}

/// Request body for `PUT /users/me/blockchain-address`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BlockchainAddressRequest {
    /// New payment-receiving address.
    pub blockchain_address: String,
}
