use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a person in the organization.
///
/// `SuperUser` is global; `Manager` and `Employee` are scoped to the subtree
/// rooted at the person's home node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
    SuperUser,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}' (expected one of: employee, manager, superuser)")]
pub struct UnknownRole(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
            Role::SuperUser => "superuser",
        }
    }

    /// Whether a manager may hand this role out through the directory.
    ///
    /// Superusers are provisioned out of band.
    pub fn is_assignable(&self) -> bool {
        match self {
            Role::Employee | Role::Manager => true,
            Role::SuperUser => false,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Role::Employee),
            "manager" => Ok(Role::Manager),
            "superuser" => Ok(Role::SuperUser),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
