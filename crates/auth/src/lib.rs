//! `grocery-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it turns a
//! bearer token into a [`Principal`], decides whether that principal may act
//! on a node path, and describes which records a read may see.

pub mod authorize;
pub mod claims;
pub mod principal;
pub mod roles;
pub mod scope;
pub mod verifier;

pub use authorize::{
    AccessDecision, AccessExplanation, DenyReason, Operation, PolicyRule, Tier, decide, evaluate, explain,
};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use principal::Principal;
pub use roles::{Role, UnknownRole};
pub use scope::{PathFilter, ScopeQuery, StorageFilter};
pub use verifier::{AuthError, CredentialVerifier, Hs256Verifier};
