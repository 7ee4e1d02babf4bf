//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain records are returned as-is; these types cover request bodies,
//! list envelopes and workflow responses that carry a notification flag.

pub mod adoption_dto;
pub mod case_dto;
pub mod common_dto;
pub mod donation_dto;
pub mod emergency_dto;
pub mod user_dto;

pub use adoption_dto::*;
pub use case_dto::*;
pub use common_dto::*;
pub use donation_dto::*;
pub use emergency_dto::*;
pub use user_dto::*;
