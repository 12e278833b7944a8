//! CurrentUser Extractor
//!
//! Handlers that need the caller's identity take `CurrentUser` as an
//! argument. The value set by [`super::authenticate`] is reused when present.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::auth::middleware::user_from_header;
use crate::core::ServerState;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::not_authenticated)?;

        let user = user_from_header(state.get_jwt_service(), header, &parts.uri)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
