//! Scoped access policy.
//!
//! Every decision is made against an explicit target path. The rule table is
//! evaluated in order and the first matching rule wins:
//!
//! 1. superusers are allowed everywhere;
//! 2. targets outside the principal's home subtree are denied;
//! 3. manager-tier operations require the `Manager` role;
//! 4. employee-tier operations admit employees and managers;
//! 5. anything else is denied.
//!
//! - No IO
//! - No panics

use serde::Serialize;
use thiserror::Error;

use grocery_core::NodePath;

use crate::{Principal, Role};

/// Minimum role tier an operation needs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Employee,
    Manager,
}

/// Class of operation being authorized.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Read employee-level data (open to employees of the subtree).
    ReadEmployees,
    /// Read manager-level data.
    ReadManagers,
    /// Create, update or delete people.
    Write,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::ReadEmployees, Operation::ReadManagers, Operation::Write];

    pub fn required_tier(self) -> Tier {
        match self {
            Operation::ReadEmployees => Tier::Employee,
            Operation::ReadManagers | Operation::Write => Tier::Manager,
        }
    }
}

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    #[error("out of scope")]
    OutOfScope,

    #[error("managers only")]
    ManagersOnly,

    #[error("insufficient role")]
    InsufficientRole,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, AccessDecision::Allow)
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny(reason) => Err(reason),
        }
    }
}

/// The rule of the table that produced a decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyRule {
    SuperUser,
    Scope,
    ManagerTier,
    EmployeeTier,
    Fallthrough,
}

/// Decide whether `principal` may perform `operation` on `target`.
pub fn decide(principal: &Principal, target: &NodePath, operation: Operation) -> AccessDecision {
    evaluate(principal, target, operation).0
}

/// Like [`decide`], also reporting which rule fired.
pub fn evaluate(principal: &Principal, target: &NodePath, operation: Operation) -> (AccessDecision, PolicyRule) {
    if principal.role == Role::SuperUser {
        return (AccessDecision::Allow, PolicyRule::SuperUser);
    }

    if !principal.home_path.is_ancestor_or_self(target) {
        return (AccessDecision::Deny(DenyReason::OutOfScope), PolicyRule::Scope);
    }

    match (operation.required_tier(), principal.role) {
        (Tier::Manager, Role::Manager) => (AccessDecision::Allow, PolicyRule::ManagerTier),
        (Tier::Manager, Role::Employee) => (AccessDecision::Deny(DenyReason::ManagersOnly), PolicyRule::ManagerTier),
        (Tier::Employee, Role::Employee | Role::Manager) => (AccessDecision::Allow, PolicyRule::EmployeeTier),
        // Superusers were admitted by the first rule.
        (_, Role::SuperUser) => (AccessDecision::Deny(DenyReason::InsufficientRole), PolicyRule::Fallthrough),
    }
}

/// Auditable description of a single decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessExplanation {
    pub operation: Operation,
    pub target: NodePath,
    pub home_path: NodePath,
    pub role: Role,
    pub granted: bool,
    pub rule: PolicyRule,
    pub deny_reason: Option<DenyReason>,
}

/// Explain why `operation` on `target` is allowed or denied for `principal`.
pub fn explain(principal: &Principal, target: &NodePath, operation: Operation) -> AccessExplanation {
    let (decision, rule) = evaluate(principal, target, operation);
    AccessExplanation {
        operation,
        target: target.clone(),
        home_path: principal.home_path.clone(),
        role: principal.role,
        granted: decision.is_allowed(),
        rule,
        deny_reason: match decision {
            AccessDecision::Allow => None,
            AccessDecision::Deny(reason) => Some(reason),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocery_core::PersonId;
    use proptest::prelude::*;

    fn p(raw: &str) -> NodePath {
        NodePath::parse(raw).unwrap()
    }

    fn principal(home: &str, role: Role) -> Principal {
        Principal::new(PersonId::new(), p(home), role)
    }

    #[test]
    fn manager_reads_own_subtree_but_not_a_sibling_branch() {
        let manager = principal("/srbija/grad-beograd/vracar", Role::Manager);

        assert_eq!(
            decide(&manager, &p("/srbija/grad-beograd/vracar"), Operation::ReadEmployees),
            AccessDecision::Allow
        );
        assert_eq!(
            decide(&manager, &p("/srbija/grad-beograd/vracar/neimar"), Operation::ReadManagers),
            AccessDecision::Allow
        );
        assert_eq!(
            decide(&manager, &p("/srbija/vojvodina"), Operation::ReadEmployees),
            AccessDecision::Deny(DenyReason::OutOfScope)
        );
    }

    #[test]
    fn manager_cannot_act_upwards() {
        let manager = principal("/a/b", Role::Manager);
        assert_eq!(
            decide(&manager, &p("/a"), Operation::Write),
            AccessDecision::Deny(DenyReason::OutOfScope)
        );
    }

    #[test]
    fn sibling_with_shared_text_prefix_is_out_of_scope() {
        let manager = principal("/srbija/beograd", Role::Manager);
        assert_eq!(
            decide(&manager, &p("/srbija/beograd2"), Operation::ReadEmployees),
            AccessDecision::Deny(DenyReason::OutOfScope)
        );
    }

    #[test]
    fn employee_reads_employees_but_not_managers() {
        let employee = principal("/srbija/grad-beograd/vracar", Role::Employee);
        let home = p("/srbija/grad-beograd/vracar");

        assert_eq!(decide(&employee, &home, Operation::ReadEmployees), AccessDecision::Allow);
        assert_eq!(
            decide(&employee, &home, Operation::ReadManagers),
            AccessDecision::Deny(DenyReason::ManagersOnly)
        );
        assert_eq!(
            decide(&employee, &home, Operation::Write),
            AccessDecision::Deny(DenyReason::ManagersOnly)
        );
    }

    #[test]
    fn scope_is_checked_before_tier() {
        let employee = principal("/a/b", Role::Employee);
        assert_eq!(
            decide(&employee, &p("/a/c"), Operation::ReadManagers),
            AccessDecision::Deny(DenyReason::OutOfScope)
        );
    }

    #[test]
    fn explanation_names_the_rule() {
        let manager = principal("/a/b", Role::Manager);
        let e = explain(&manager, &p("/a"), Operation::Write);
        assert!(!e.granted);
        assert_eq!(e.rule, PolicyRule::Scope);
        assert_eq!(e.deny_reason, Some(DenyReason::OutOfScope));

        let root = principal("/a/b", Role::SuperUser);
        let e = explain(&root, &p("/x"), Operation::Write);
        assert!(e.granted);
        assert_eq!(e.rule, PolicyRule::SuperUser);
        assert_eq!(e.deny_reason, None);
    }

    #[test]
    fn deny_reasons_render_as_boundary_messages() {
        assert_eq!(DenyReason::OutOfScope.to_string(), "out of scope");
        assert_eq!(DenyReason::ManagersOnly.to_string(), "managers only");
        assert_eq!(AccessDecision::Deny(DenyReason::ManagersOnly).into_result(), Err(DenyReason::ManagersOnly));
    }

    fn path() -> impl Strategy<Value = NodePath> {
        prop::collection::vec("[a-c]{1,2}", 1..4).prop_map(|s| NodePath::from_segments(s).unwrap())
    }

    fn role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::Employee), Just(Role::Manager), Just(Role::SuperUser)]
    }

    fn operation() -> impl Strategy<Value = Operation> {
        prop_oneof![
            Just(Operation::ReadEmployees),
            Just(Operation::ReadManagers),
            Just(Operation::Write)
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        #[test]
        fn superuser_is_always_allowed(home in path(), target in path(), op in operation()) {
            let root = Principal::new(PersonId::new(), home, Role::SuperUser);
            prop_assert_eq!(decide(&root, &target, op), AccessDecision::Allow);
        }

        /// Property: outside the home subtree every non-superuser is denied.
        #[test]
        fn out_of_scope_is_always_denied(home in path(), target in path(), r in role(), op in operation()) {
            prop_assume!(r != Role::SuperUser);
            prop_assume!(!home.is_ancestor_or_self(&target));
            let caller = Principal::new(PersonId::new(), home, r);
            prop_assert_eq!(decide(&caller, &target, op), AccessDecision::Deny(DenyReason::OutOfScope));
        }

        /// Property: an allowed decision never escapes the caller's subtree.
        #[test]
        fn allow_implies_in_scope(home in path(), target in path(), r in role(), op in operation()) {
            let in_scope = r == Role::SuperUser || home.is_ancestor_or_self(&target);
            let caller = Principal::new(PersonId::new(), home, r);
            if decide(&caller, &target, op).is_allowed() {
                prop_assert!(in_scope);
            }
        }
    }
}
