//! Read scope resolution.
//!
//! A [`ScopeQuery`] is a declarative description of which people a read may
//! see. Registries either evaluate [`ScopeQuery::matches`] in memory or
//! translate [`ScopeQuery::storage_filter`] into their own query language.

use grocery_core::NodePath;
use grocery_core::path::DELIMITER;

use crate::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeQuery {
    pub target: NodePath,
    /// Include every descendant of `target`, not just `target` itself.
    pub deep: bool,
    /// Restrict to a single role; `None` returns managers and employees alike.
    pub role: Option<Role>,
}

impl ScopeQuery {
    pub fn resolve(target: NodePath, deep: bool, role: Option<Role>) -> Self {
        Self { target, deep, role }
    }

    /// Does a record living at `home` with `role` fall inside this scope?
    pub fn matches(&self, home: &NodePath, role: Role) -> bool {
        let path_ok = if self.deep {
            self.target.is_ancestor_or_self(home)
        } else {
            &self.target == home
        };
        path_ok && self.role.is_none_or(|wanted| wanted == role)
    }

    pub fn storage_filter(&self) -> StorageFilter {
        let key = self.target.to_storage_key();
        let path = if self.deep {
            let mut descendant_prefix = key.clone();
            descendant_prefix.push(DELIMITER);
            PathFilter::Subtree { key, descendant_prefix }
        } else {
            PathFilter::Exact(key)
        };
        StorageFilter { path, role: self.role }
    }
}

/// Path predicate over canonical storage keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFilter {
    /// `node_path = key`
    Exact(String),
    /// `node_path = key OR node_path starts with descendant_prefix`.
    ///
    /// The trailing delimiter in `descendant_prefix` is what keeps `/ab` from
    /// matching `/abc`.
    Subtree { key: String, descendant_prefix: String },
}

impl PathFilter {
    pub fn matches_key(&self, stored: &str) -> bool {
        match self {
            PathFilter::Exact(key) => stored == key,
            PathFilter::Subtree { key, descendant_prefix } => {
                stored == key || stored.starts_with(descendant_prefix.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageFilter {
    pub path: PathFilter,
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(raw: &str) -> NodePath {
        NodePath::parse(raw).unwrap()
    }

    #[test]
    fn shallow_scope_matches_only_the_target() {
        let q = ScopeQuery::resolve(p("/srbija/grad-beograd/vracar"), false, None);
        assert!(q.matches(&p("/srbija/grad-beograd/vracar"), Role::Employee));
        assert!(q.matches(&p("/srbija/grad-beograd/vracar"), Role::Manager));
        assert!(!q.matches(&p("/srbija/grad-beograd/vracar/neimar"), Role::Employee));
    }

    #[test]
    fn deep_scope_includes_descendants_only() {
        let q = ScopeQuery::resolve(p("/srbija/grad-beograd/vracar"), true, None);
        assert!(q.matches(&p("/srbija/grad-beograd/vracar"), Role::Employee));
        assert!(q.matches(&p("/srbija/grad-beograd/vracar/neimar/radnja-7"), Role::Manager));
        assert!(!q.matches(&p("/srbija/grad-beograd"), Role::Manager));
        assert!(!q.matches(&p("/srbija/grad-beograd/vracar2"), Role::Manager));
    }

    #[test]
    fn role_filter_intersects() {
        let q = ScopeQuery::resolve(p("/a"), true, Some(Role::Manager));
        assert!(q.matches(&p("/a/b"), Role::Manager));
        assert!(!q.matches(&p("/a/b"), Role::Employee));
    }

    #[test]
    fn storage_filter_uses_a_delimited_prefix() {
        let q = ScopeQuery::resolve(p("/ab"), true, Some(Role::Employee));
        let f = q.storage_filter();
        assert_eq!(
            f.path,
            PathFilter::Subtree {
                key: "/ab".into(),
                descendant_prefix: "/ab/".into()
            }
        );
        assert_eq!(f.role, Some(Role::Employee));
        assert!(f.path.matches_key("/ab"));
        assert!(f.path.matches_key("/ab/c"));
        assert!(!f.path.matches_key("/abc"));

        let shallow = ScopeQuery::resolve(p("/ab"), false, None).storage_filter();
        assert_eq!(shallow.path, PathFilter::Exact("/ab".into()));
    }

    fn path() -> impl Strategy<Value = NodePath> {
        prop::collection::vec("[a-b]{1,2}", 1..4).prop_map(|s| NodePath::from_segments(s).unwrap())
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the deep result is a superset of the shallow result.
        #[test]
        fn deep_contains_shallow(target in path(), home in path()) {
            let shallow = ScopeQuery::resolve(target.clone(), false, None);
            let deep = ScopeQuery::resolve(target, true, None);
            if shallow.matches(&home, Role::Employee) {
                prop_assert!(deep.matches(&home, Role::Employee));
            }
        }

        /// Property: the storage filter agrees with the in-memory predicate.
        #[test]
        fn storage_filter_agrees_with_matches(target in path(), home in path(), deep in any::<bool>()) {
            let q = ScopeQuery::resolve(target, deep, None);
            prop_assert_eq!(
                q.storage_filter().path.matches_key(&home.to_storage_key()),
                q.matches(&home, Role::Manager)
            );
        }
    }
}
