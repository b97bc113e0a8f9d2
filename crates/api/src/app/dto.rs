use serde::Deserialize;

use grocery_auth::{AccessExplanation, Principal, Role};
use grocery_directory::{Node, Person};

// -------------------------
// Request DTOs
// -------------------------

/// Query string of list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Include every descendant store.
    #[serde(default)]
    pub deep: bool,
    /// Only honored by the `staff` listing.
    pub role: Option<Role>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn person_to_json(p: Person) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "name": p.name,
        "email": p.email,
        "node_path": p.node_path.to_storage_key(),
        "role": p.role.as_str(),
    })
}

pub fn people_to_json(people: Vec<Person>) -> serde_json::Value {
    serde_json::Value::Array(people.into_iter().map(person_to_json).collect())
}

pub fn node_to_json(n: Node) -> serde_json::Value {
    serde_json::json!({
        "path": n.path.to_storage_key(),
        "route": n.path.to_route_param(),
        "name": n.name,
    })
}

pub fn principal_to_json(p: &Principal) -> serde_json::Value {
    serde_json::json!({
        "subject": p.person_id.to_string(),
        "node_path": p.home_path.to_storage_key(),
        "role": p.role.as_str(),
    })
}

pub fn explanation_to_json(e: AccessExplanation) -> serde_json::Value {
    serde_json::json!({
        "operation": e.operation,
        "target": e.target.to_storage_key(),
        "granted": e.granted,
        "rule": e.rule,
        "reason": e.deny_reason.map(|r| r.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use grocery_core::{NodePath, PersonId};

    use super::*;

    #[test]
    fn list_query_defaults_to_shallow() {
        let q: ListQuery = serde_json::from_str("{}").unwrap();
        assert!(!q.deep);
        assert_eq!(q.role, None);
    }

    #[test]
    fn person_json_uses_storage_key_paths() {
        let path = NodePath::parse("srbija.vojvodina").unwrap();
        let person = Person {
            id: PersonId::new(),
            name: "Ana".into(),
            email: "ana@grocery.test".into(),
            node_path: path,
            role: Role::Employee,
        };
        let json = person_to_json(person);
        assert_eq!(json["node_path"], "/srbija/vojvodina");
        assert_eq!(json["role"], "employee");
    }
}
