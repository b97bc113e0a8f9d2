//! People assigned to nodes, and the shapes used to create and change them.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use grocery_auth::Role;
use grocery_core::{DomainError, DomainResult, NodePath, PersonId};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_NODE_PATH_LEN: usize = 10_000;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub email: String,
    pub node_path: NodePath,
    pub role: Role,
}

impl Person {
    pub fn apply(&mut self, changes: PersonChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(node_path) = changes.node_path {
            self.node_path = node_path;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
    }
}

/// Registry input for a new record. Path and role are decided by the caller
/// of the registry, never by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub name: String,
    pub email: String,
    pub node_path: NodePath,
    pub role: Role,
}

impl NewPerson {
    pub fn into_person(self, id: PersonId) -> Person {
        Person {
            id,
            name: self.name,
            email: self.email,
            node_path: self.node_path,
            role: self.role,
        }
    }
}

/// Resolved partial update handed to a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub node_path: Option<NodePath>,
    pub role: Option<Role>,
}

/// Client-supplied fields for creating a person.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersonDraft {
    pub name: String,
    pub email: String,
}

impl PersonDraft {
    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)?;
        validate_email(&self.email)
    }
}

/// Client-supplied partial update. `node_path` stays raw until the service
/// has validated and resolved it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "nodePath")]
    pub node_path: Option<String>,
    pub role: Option<Role>,
}

impl PersonPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(raw) = &self.node_path {
            if raw.len() > MAX_NODE_PATH_LEN {
                return Err(DomainError::validation(
                    "node_path",
                    format!("must be at most {MAX_NODE_PATH_LEN} characters"),
                ));
            }
        }
        if let Some(role) = self.role {
            if !role.is_assignable() {
                return Err(DomainError::validation("role", "must be one of: manager, employee"));
            }
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name", "must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(
            "name",
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> DomainResult<()> {
    if !EMAIL.is_match(email) {
        return Err(DomainError::validation("email", format!("'{email}' is not a valid email address")));
    }
    Ok(())
}
