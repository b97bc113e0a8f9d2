//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: registry wiring (in-memory or Postgres, optional demo seed)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use grocery_auth::{CredentialVerifier, Hs256Verifier};
use grocery_directory::{RegistryError, StaffService};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> Result<Router, RegistryError> {
    let verifier = Arc::new(Hs256Verifier::new(config.jwt_secret.as_bytes()));
    let staff = services::build_services(config).await?;
    Ok(router(verifier, staff))
}

/// Router over already-built collaborators.
pub fn router(verifier: Arc<dyn CredentialVerifier>, staff: StaffService) -> Router {
    let auth_state = middleware::AuthState { verifier };

    // Protected routes: require a verified principal.
    let protected = routes::router()
        .layer(Extension(Arc::new(staff)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/ping", get(routes::system::ping))
        .merge(protected)
        .layer(ServiceBuilder::new())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use grocery_auth::{JwtClaims, Principal, Role};
    use grocery_core::{NodePath, PersonId};
    use grocery_directory::{InMemoryNodeRegistry, InMemoryPersonRegistry};

    use super::*;

    fn app(verifier: Arc<Hs256Verifier>) -> Router {
        let staff = StaffService::new(
            Arc::new(InMemoryNodeRegistry::new()),
            Arc::new(InMemoryPersonRegistry::new()),
        );
        router(verifier, staff)
    }

    #[tokio::test]
    async fn ping_needs_no_token() {
        let res = app(Arc::new(Hs256Verifier::new("k")))
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), 64).await.unwrap();
        assert_eq!(&body[..], b"pong");
    }

    #[tokio::test]
    async fn whoami_echoes_the_principal() {
        let verifier = Arc::new(Hs256Verifier::new("k"));
        let principal = Principal::new(PersonId::new(), NodePath::parse("/a/b").unwrap(), Role::Manager);
        let token = verifier
            .issue(&JwtClaims::for_principal(&principal, Utc::now(), Duration::minutes(5)))
            .unwrap();

        let res = app(verifier)
            .oneshot(
                Request::get("/whoami")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["node_path"], "/a/b");
        assert_eq!(json["role"], "manager");
        assert_eq!(json["subject"], principal.person_id.to_string());
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let other = Hs256Verifier::new("other");
        let principal = Principal::new(PersonId::new(), NodePath::parse("/a").unwrap(), Role::SuperUser);
        let token = other
            .issue(&JwtClaims::for_principal(&principal, Utc::now(), Duration::minutes(5)))
            .unwrap();

        let res = app(Arc::new(Hs256Verifier::new("k")))
            .oneshot(
                Request::get("/stores")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
