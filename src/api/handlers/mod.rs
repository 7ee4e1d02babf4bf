//! REST endpoint handlers organized by resource.

pub mod adoptions;
pub mod cases;
pub mod donations;
pub mod emergency;
pub mod messages;
pub mod system;
pub mod users;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(users::routes())
        .merge(messages::routes())
        .merge(cases::routes())
        .merge(adoptions::routes())
        .merge(donations::routes())
        .merge(emergency::routes())
}
