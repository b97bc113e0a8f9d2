//! Staff request pipeline.
//!
//! Every operation on people runs through the same steps:
//!
//! ```text
//! Principal + target path
//!   ↓
//! 1. Access policy (scope, then role tier)
//!   ↓
//! 2. Input validation / node existence (writes only)
//!   ↓
//! 3. Scope resolution (reads) or addressed write
//!   ↓
//! 4. Registry call, bounded by a timeout
//! ```
//!
//! A denial stops the pipeline before any registry is touched. Registry
//! faults and timeouts surface as [`StaffError::Collaborator`] and are never
//! retried here.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info};

use grocery_auth::{AccessExplanation, DenyReason, Operation, Principal, Role, ScopeQuery, decide, explain};
use grocery_core::{DomainError, NodePath, PersonId};

use crate::{
    NewPerson, Node, NodeRegistry, Person, PersonChanges, PersonDraft, PersonPatch, PersonRegistry, RegistryError,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Which collection a single-record request came in through. The endpoint
/// fixes the role of the record being addressed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Managers,
    Employees,
}

impl Endpoint {
    pub fn role(self) -> Role {
        match self {
            Endpoint::Managers => Role::Manager,
            Endpoint::Employees => Role::Employee,
        }
    }

    pub fn read_operation(self) -> Operation {
        match self {
            Endpoint::Managers => Operation::ReadManagers,
            Endpoint::Employees => Operation::ReadEmployees,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StaffError {
    #[error("{0}")]
    Denied(#[from] DenyReason),

    #[error("store {0} not found")]
    NodeNotFound(NodePath),

    #[error("id={id} not found at store {path}")]
    PersonNotFound { path: NodePath, id: PersonId },

    #[error("invalid {field}: {detail}")]
    Validation { field: &'static str, detail: String },

    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage failed or did not answer in time.
    #[error("collaborator fault: {0}")]
    Collaborator(String),
}

impl From<DomainError> for StaffError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation { field, detail } => StaffError::Validation { field, detail },
            DomainError::InvalidPath(e) => StaffError::Validation {
                field: "node_path",
                detail: e.to_string(),
            },
            DomainError::InvalidId(detail) => StaffError::Validation { field: "id", detail },
        }
    }
}

impl From<RegistryError> for StaffError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::Conflict(msg) => StaffError::Conflict(msg),
            other => StaffError::Collaborator(other.to_string()),
        }
    }
}

/// Orchestrates policy, scope resolution and the registries.
#[derive(Clone)]
pub struct StaffService {
    nodes: Arc<dyn NodeRegistry>,
    people: Arc<dyn PersonRegistry>,
    timeout: Duration,
}

impl StaffService {
    pub fn new(nodes: Arc<dyn NodeRegistry>, people: Arc<dyn PersonRegistry>) -> Self {
        Self {
            nodes,
            people,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// People at `target` (and below it when `deep`), optionally of one role.
    ///
    /// Reading employees is open to the employees of a subtree; any read that
    /// may return managers needs the manager tier. Superuser records are
    /// never listed.
    pub async fn list_people(
        &self,
        principal: &Principal,
        target: &NodePath,
        deep: bool,
        role: Option<Role>,
    ) -> Result<Vec<Person>, StaffError> {
        let operation = match role {
            Some(Role::Employee) => Operation::ReadEmployees,
            _ => Operation::ReadManagers,
        };
        self.guard(principal, target, operation)?;

        let query = ScopeQuery::resolve(target.clone(), deep, role);
        let mut people = self.call("find", self.people.find(&query)).await?;
        people.retain(|p| p.role.is_assignable());
        debug!(target = %target, deep, count = people.len(), "listed people");
        Ok(people)
    }

    pub async fn get_person(
        &self,
        principal: &Principal,
        target: &NodePath,
        endpoint: Endpoint,
        id: PersonId,
    ) -> Result<Person, StaffError> {
        self.guard(principal, target, endpoint.read_operation())?;

        self.call("get", self.people.get(target, id, endpoint.role()))
            .await?
            .ok_or_else(|| not_found(target, id))
    }

    /// Create a person at `target`. The stored path is the registry's
    /// canonical form of `target` and the role comes from the endpoint.
    pub async fn create_person(
        &self,
        principal: &Principal,
        target: &NodePath,
        endpoint: Endpoint,
        draft: PersonDraft,
    ) -> Result<Person, StaffError> {
        self.guard(principal, target, Operation::Write)?;
        draft.validate()?;

        let node_path = self.existing_node(target).await?;
        let created = self
            .call(
                "create",
                self.people.create(NewPerson {
                    name: draft.name,
                    email: draft.email,
                    node_path,
                    role: endpoint.role(),
                }),
            )
            .await?;

        info!(id = %created.id, path = %created.node_path, role = %created.role, "person created");
        Ok(created)
    }

    /// Partial update of the record addressed by `target`, `id` and the
    /// endpoint's role. A new `node_path` must itself be writable by the
    /// caller and must name an existing node.
    pub async fn update_person(
        &self,
        principal: &Principal,
        target: &NodePath,
        endpoint: Endpoint,
        id: PersonId,
        patch: PersonPatch,
    ) -> Result<Person, StaffError> {
        self.guard(principal, target, Operation::Write)?;
        patch.validate()?;

        let node_path = match patch.node_path.as_deref() {
            Some(raw) => {
                let requested = NodePath::parse(raw).map_err(DomainError::from)?;
                self.guard(principal, &requested, Operation::Write)?;
                Some(self.existing_node(&requested).await?)
            }
            None => None,
        };

        let changes = PersonChanges {
            name: patch.name,
            email: patch.email,
            node_path,
            role: patch.role,
        };
        let updated = self
            .call("update", self.people.update(target, id, endpoint.role(), changes))
            .await?
            .ok_or_else(|| not_found(target, id))?;

        info!(id = %updated.id, path = %updated.node_path, role = %updated.role, "person updated");
        Ok(updated)
    }

    pub async fn delete_person(
        &self,
        principal: &Principal,
        target: &NodePath,
        endpoint: Endpoint,
        id: PersonId,
    ) -> Result<(), StaffError> {
        self.guard(principal, target, Operation::Write)?;

        if !self.call("delete", self.people.delete(target, id, endpoint.role())).await? {
            return Err(not_found(target, id));
        }
        info!(id = %id, path = %target, "person deleted");
        Ok(())
    }

    /// Nodes the principal may see: its home subtree, or everything for a
    /// superuser.
    pub async fn list_stores(&self, principal: &Principal) -> Result<Vec<Node>, StaffError> {
        let within = match principal.role {
            Role::SuperUser => None,
            Role::Manager | Role::Employee => Some(&principal.home_path),
        };
        self.call("list_nodes", self.nodes.list(within)).await
    }

    /// Decision and rule for every operation class at `target`.
    pub fn explain_access(&self, principal: &Principal, target: &NodePath) -> Vec<AccessExplanation> {
        Operation::ALL
            .into_iter()
            .map(|operation| explain(principal, target, operation))
            .collect()
    }

    fn guard(&self, principal: &Principal, target: &NodePath, operation: Operation) -> Result<(), StaffError> {
        let decision = decide(principal, target, operation);
        match decision.into_result() {
            Ok(()) => {
                debug!(subject = %principal.person_id, target = %target, ?operation, "access allowed");
                Ok(())
            }
            Err(reason) => {
                info!(
                    subject = %principal.person_id,
                    home = %principal.home_path,
                    target = %target,
                    ?operation,
                    %reason,
                    "access denied"
                );
                Err(StaffError::Denied(reason))
            }
        }
    }

    async fn existing_node(&self, target: &NodePath) -> Result<NodePath, StaffError> {
        self.call("canonical_path_for", self.nodes.canonical_path_for(target))
            .await?
            .ok_or_else(|| StaffError::NodeNotFound(target.clone()))
    }

    async fn call<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StaffError>
    where
        F: Future<Output = Result<T, RegistryError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(RegistryError::Conflict(msg))) => Err(StaffError::Conflict(msg)),
            Ok(Err(err)) => {
                error!(operation, error = %err, "registry call failed");
                Err(err.into())
            }
            Err(_) => {
                error!(operation, timeout_ms = self.timeout.as_millis() as u64, "registry call timed out");
                Err(StaffError::Collaborator(format!(
                    "{operation} timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

impl core::fmt::Debug for StaffService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StaffService").field("timeout", &self.timeout).finish_non_exhaustive()
    }
}

fn not_found(path: &NodePath, id: PersonId) -> StaffError {
    StaffError::PersonNotFound {
        path: path.clone(),
        id,
    }
}
