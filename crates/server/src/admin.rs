// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Admin identity extraction.
//!
//! Authentication happens at the fronting gateway, which asserts the
//! signed-in admin through the `x-admin-identity` header. This server only
//! requires that the header is present and names someone.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::routes::ErrorResponse;

/// Header carrying the admin identity asserted by the gateway.
pub const ADMIN_IDENTITY_HEADER: &str = "x-admin-identity";

/// Extractor for admin-only routes.
///
/// ```ignore
/// async fn my_handler(AdminIdentity(admin): AdminIdentity) -> ... {
///     // admin: String, already trimmed and non-empty
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 if the header is missing, not valid UTF-8, or blank.
pub struct AdminIdentity(pub String);

impl<S: Send + Sync> FromRequestParts<S> for AdminIdentity {
    type Rejection = AdminIdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw: &str = parts
            .headers
            .get(ADMIN_IDENTITY_HEADER)
            .ok_or_else(|| {
                debug!(path = %parts.uri.path(), "Missing admin identity header");
                AdminIdentityError::Missing
            })?
            .to_str()
            .map_err(|_| {
                warn!("Admin identity header is not valid UTF-8");
                AdminIdentityError::Invalid
            })?;

        let identity: &str = raw.trim();
        if identity.is_empty() {
            return Err(AdminIdentityError::Invalid);
        }
        Ok(Self(identity.to_string()))
    }
}

#[derive(Debug)]
pub enum AdminIdentityError {
    Missing,
    Invalid,
}

impl IntoResponse for AdminIdentityError {
    fn into_response(self) -> Response {
        let message: &str = match self {
            Self::Missing => "Missing x-admin-identity header",
            Self::Invalid => "Invalid x-admin-identity header",
        };
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: message.to_string(),
            conflict: None,
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
