use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use grocery_auth::{AuthError, CredentialVerifier};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn CredentialVerifier>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let principal = extract_bearer(req.headers())
        .and_then(|token| state.verifier.verify(token, Utc::now()))
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected credentials");
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "invalid token")
        })?;

    req.extensions_mut().insert(PrincipalContext::new(principal));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let header = header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("authorization header is not ascii".to_string()))?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("expected a Bearer token".to_string()))?;

    let token = header.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}
