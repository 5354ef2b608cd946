//! Bearer-token authentication gate for mutating routes.
//!
//! Reads are public; create, update, and delete go through this filter
//! before any validation or store access. Whatever the internal failure
//! (missing header, bad signature, expired token, wrong kind), the caller
//! sees the same `401 {"error":"unauthorized"}` — the distinction is only
//! logged.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::state::ServiceState;
use crate::error::Error;
use crate::store::CompanyStore;
use crate::token::{AccessClaims, TokenService};

/// Verified token subject, attached to the request extensions for
/// downstream handlers.
#[derive(Debug, Clone)]
pub struct AuthSubject(String);

impl AuthSubject {
    /// The verified subject string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Extract and verify the bearer credential from the request headers.
///
/// Strips an optional `Bearer` scheme prefix and surrounding whitespace; a
/// bare token without the scheme is still verified. An empty credential is
/// rejected before the token service is consulted.
fn bearer_claims(tokens: &TokenService, headers: &HeaderMap) -> Result<AccessClaims, Error> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let token = raw.strip_prefix("Bearer").unwrap_or(raw).trim();
    if token.is_empty() {
        return Err(Error::InvalidToken);
    }

    tokens.verify(token)
}

/// Middleware protecting the mutating routes.
///
/// On success the verified subject is attached to the request as
/// [`AuthSubject`]; on any failure the request is answered here and never
/// reaches the handler.
pub async fn require_bearer<S: CompanyStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    match bearer_claims(&state.tokens, request.headers()) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthSubject(claims.subject));
            next.run(request).await
        }
        Err(e) => {
            warn!(path = %request.uri().path(), error = %e, "request rejected by auth gate");
            Error::Unauthorized.into_response()
        }
    }
}
