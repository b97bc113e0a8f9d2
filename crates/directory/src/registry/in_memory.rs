use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use grocery_auth::{Role, ScopeQuery};
use grocery_core::{NodePath, PersonId};

use super::{NodeRegistry, PersonRegistry, RegistryError};
use crate::{NewPerson, Node, Person, PersonChanges};

fn poisoned() -> RegistryError {
    RegistryError::Unavailable("in-memory registry lock poisoned".to_string())
}

/// In-memory node registry for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryNodeRegistry {
    inner: RwLock<BTreeMap<NodePath, Node>>,
}

impl InMemoryNodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NodeRegistry for InMemoryNodeRegistry {
    async fn get(&self, path: &NodePath) -> Result<Option<Node>, RegistryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(path).cloned())
    }

    async fn list(&self, within: Option<&NodePath>) -> Result<Vec<Node>, RegistryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .values()
            .filter(|node| within.is_none_or(|root| root.is_ancestor_or_self(&node.path)))
            .cloned()
            .collect())
    }

    async fn insert(&self, node: Node) -> Result<Node, RegistryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&node.path) {
            return Err(RegistryError::Conflict(format!("node {} already exists", node.path)));
        }
        map.insert(node.path.clone(), node.clone());
        Ok(node)
    }
}

/// In-memory person registry for tests/dev.
///
/// Emails are unique (case-insensitive) across the whole directory.
#[derive(Debug, Default)]
pub struct InMemoryPersonRegistry {
    inner: RwLock<HashMap<PersonId, Person>>,
}

impl InMemoryPersonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(map: &HashMap<PersonId, Person>, email: &str, except: Option<PersonId>) -> bool {
        map.values()
            .any(|p| Some(p.id) != except && p.email.eq_ignore_ascii_case(email))
    }
}

fn addressed(person: &Person, path: &NodePath, role: Role) -> bool {
    &person.node_path == path && person.role == role
}

#[async_trait]
impl PersonRegistry for InMemoryPersonRegistry {
    async fn find(&self, query: &ScopeQuery) -> Result<Vec<Person>, RegistryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut people: Vec<Person> = map
            .values()
            .filter(|p| query.matches(&p.node_path, p.role))
            .cloned()
            .collect();
        people.sort_by(|a, b| a.node_path.cmp(&b.node_path).then_with(|| a.name.cmp(&b.name)));
        Ok(people)
    }

    async fn get(&self, path: &NodePath, id: PersonId, role: Role) -> Result<Option<Person>, RegistryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).filter(|p| addressed(p, path, role)).cloned())
    }

    async fn create(&self, person: NewPerson) -> Result<Person, RegistryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if Self::email_taken(&map, &person.email, None) {
            return Err(RegistryError::Conflict(format!("email {} is already registered", person.email)));
        }
        let created = person.into_person(PersonId::new());
        map.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        path: &NodePath,
        id: PersonId,
        role: Role,
        changes: PersonChanges,
    ) -> Result<Option<Person>, RegistryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if !map.get(&id).is_some_and(|p| addressed(p, path, role)) {
            return Ok(None);
        }
        if let Some(email) = &changes.email {
            if Self::email_taken(&map, email, Some(id)) {
                return Err(RegistryError::Conflict(format!("email {email} is already registered")));
            }
        }
        let Some(person) = map.get_mut(&id) else {
            return Ok(None);
        };
        person.apply(changes);
        Ok(Some(person.clone()))
    }

    async fn delete(&self, path: &NodePath, id: PersonId, role: Role) -> Result<bool, RegistryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.get(&id).is_some_and(|p| addressed(p, path, role)) {
            map.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}
