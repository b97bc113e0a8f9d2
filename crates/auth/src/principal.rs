use grocery_core::{NodePath, PersonId};

use crate::Role;

/// The authenticated caller of a single request.
///
/// Derived from a verified credential and never mutated afterwards. There is
/// no way to build one from an unverified token: [`crate::CredentialVerifier`]
/// either returns a principal or an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub person_id: PersonId,
    pub home_path: NodePath,
    pub role: Role,
}

impl Principal {
    pub fn new(person_id: PersonId, home_path: NodePath, role: Role) -> Self {
        Self {
            person_id,
            home_path,
            role,
        }
    }
}
