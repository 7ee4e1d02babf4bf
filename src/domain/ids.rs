//! Type-safe record identifiers.
//!
//! Every record kind gets its own newtype wrapper around [`uuid::Uuid`]
//! (v4) so that, for example, a case id can never be passed where an
//! adoption id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! record_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Creates an identifier from an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

record_id!(
    /// Identifier of a registered account (donor, welfare or doctor).
    UserId
);
record_id!(
    /// Identifier of a fundraising case.
    CaseId
);
record_id!(
    /// Identifier of a case update (diagnosis, progress, success story).
    CaseUpdateId
);
record_id!(
    /// Identifier of a recorded donation.
    DonationId
);
record_id!(
    /// Identifier of an adoption listing.
    AdoptionId
);
record_id!(
    /// Identifier of a donor's adoption request.
    AdoptionRequestId
);
record_id!(
    /// Identifier of an emergency report.
    EmergencyId
);
record_id!(
    /// Identifier of an inbox message.
    MessageId
);

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(CaseId::new(), CaseId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let s = format!("{}", EmergencyId::new());
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn serializes_as_bare_uuid_string() {
        let uuid = uuid::Uuid::new_v4();
        let id = UserId::from_uuid(uuid);
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, format!("\"{uuid}\""));
        let Ok(back) = serde_json::from_str::<UserId>(&json) else {
            panic!("deserialization failed");
        };
        assert_eq!(back, id);
    }

    #[test]
    fn converts_into_uuid() {
        let uuid = uuid::Uuid::new_v4();
        let id = AdoptionRequestId::from(uuid);
        assert_eq!(*id.as_uuid(), uuid);
        assert_eq!(uuid::Uuid::from(id), uuid);
    }
}
