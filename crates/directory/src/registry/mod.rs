//! Storage contracts for nodes and people.
//!
//! Registries are dumb: they apply the filters they are given and never make
//! authorization decisions themselves.

use async_trait::async_trait;
use thiserror::Error;

use grocery_auth::{Role, ScopeQuery};
use grocery_core::{NodePath, PersonId};

use crate::{NewPerson, Node, Person, PersonChanges};

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::{InMemoryNodeRegistry, InMemoryPersonRegistry};
#[cfg(feature = "postgres")]
pub use postgres::PostgresDirectory;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A uniqueness constraint would be violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store could not serve the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait NodeRegistry: Send + Sync {
    async fn get(&self, path: &NodePath) -> Result<Option<Node>, RegistryError>;

    /// Nodes at or below `within`; every node when `None`. Ordered by path.
    async fn list(&self, within: Option<&NodePath>) -> Result<Vec<Node>, RegistryError>;

    async fn insert(&self, node: Node) -> Result<Node, RegistryError>;

    async fn exists(&self, path: &NodePath) -> Result<bool, RegistryError> {
        Ok(self.get(path).await?.is_some())
    }

    /// The path as the registry stores it, or `None` if there is no such node.
    async fn canonical_path_for(&self, path: &NodePath) -> Result<Option<NodePath>, RegistryError> {
        Ok(self.get(path).await?.map(|node| node.path))
    }
}

/// Person storage. Every single-record operation is addressed by
/// `(node path, id, role)` so that a record can only be reached through the
/// node and endpoint it belongs to.
#[async_trait]
pub trait PersonRegistry: Send + Sync {
    async fn find(&self, query: &ScopeQuery) -> Result<Vec<Person>, RegistryError>;

    async fn get(&self, path: &NodePath, id: PersonId, role: Role) -> Result<Option<Person>, RegistryError>;

    async fn create(&self, person: NewPerson) -> Result<Person, RegistryError>;

    /// Returns `None` when no record matches.
    async fn update(
        &self,
        path: &NodePath,
        id: PersonId,
        role: Role,
        changes: PersonChanges,
    ) -> Result<Option<Person>, RegistryError>;

    /// Returns `false` when no record matches.
    async fn delete(&self, path: &NodePath, id: PersonId, role: Role) -> Result<bool, RegistryError>;
}
