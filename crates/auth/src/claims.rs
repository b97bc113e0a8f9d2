use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use grocery_core::{NodePath, PersonId};

use crate::{Principal, Role};

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims the directory expects once a token has
/// been decoded and its signature checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the person the token was issued to.
    pub sub: PersonId,

    /// Home node of the subject.
    pub node_path: NodePath,

    pub role: Role,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl JwtClaims {
    /// Claims for `principal`, valid from `now` for `ttl`.
    pub fn for_principal(principal: &Principal, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: principal.person_id,
            node_path: principal.home_path.clone(),
            role: principal.role,
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn into_principal(self) -> Principal {
        Principal::new(self.sub, self.node_path, self.role)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::Hs256Verifier`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        let principal = Principal::new(
            PersonId::new(),
            NodePath::parse("/srbija/grad-beograd").unwrap(),
            Role::Manager,
        );
        JwtClaims::for_principal(&principal, now, Duration::minutes(10))
    }

    #[test]
    fn accepts_claims_inside_their_window() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims(now), now + Duration::minutes(1)), Ok(()));
    }

    #[test]
    fn rejects_expired_and_future_claims() {
        let now = Utc::now();
        let c = claims(now);
        assert_eq!(
            validate_claims(&c, now + Duration::minutes(10)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&c, now - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let mut c = claims(now);
        c.expires_at = c.issued_at;
        assert_eq!(validate_claims(&c, now), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn principal_round_trips_through_claims() {
        let now = Utc::now();
        let c = claims(now);
        let principal = c.clone().into_principal();
        assert_eq!(principal.person_id, c.sub);
        assert_eq!(principal.home_path, c.node_path);
        assert_eq!(principal.role, Role::Manager);
    }
}
