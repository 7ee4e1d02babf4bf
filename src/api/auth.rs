//! Caller identity extraction.
//!
//! Token issuance lives in the upstream auth proxy, which forwards the
//! authenticated subject as `X-User-Id` and `X-User-Role`. Handlers take an
//! [`Actor`] argument to require both.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::domain::{Actor, Role, UserId};
use crate::error::MarketError;

/// Header carrying the caller's account id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = MarketError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers)
    }
}

/// Parses the identity headers.
///
/// # Errors
///
/// Returns [`MarketError::Unauthorized`] if either header is missing or
/// garbled.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, MarketError> {
    let id = header(headers, USER_ID_HEADER)?
        .parse::<uuid::Uuid>()
        .map_err(|_| MarketError::Unauthorized(format!("{USER_ID_HEADER} is not a UUID")))?;
    let role = header(headers, USER_ROLE_HEADER)?
        .parse::<Role>()
        .map_err(|_| MarketError::Unauthorized(format!("{USER_ROLE_HEADER} is not a known role")))?;
    Ok(Actor::new(UserId::from_uuid(id), role))
}

fn header<'h>(headers: &'h HeaderMap, name: &str) -> Result<&'h str, MarketError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| MarketError::Unauthorized(format!("missing {name} header")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn parses_well_formed_headers() {
        let id = uuid::Uuid::new_v4();
        let mut headers = HeaderMap::new();
        let Ok(value) = HeaderValue::from_str(&id.to_string()) else {
            panic!("bad header value");
        };
        headers.insert(USER_ID_HEADER, value);
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("Welfare"));

        let Ok(actor) = actor_from_headers(&headers) else {
            panic!("headers rejected");
        };
        assert_eq!(actor.id, UserId::from_uuid(id));
        assert_eq!(actor.role, Role::Welfare);
    }

    #[test]
    fn missing_or_garbled_headers_are_unauthorized() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            actor_from_headers(&headers),
            Err(MarketError::Unauthorized(_))
        ));
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("donor"));
        assert!(matches!(
            actor_from_headers(&headers),
            Err(MarketError::Unauthorized(_))
        ));
    }
}
