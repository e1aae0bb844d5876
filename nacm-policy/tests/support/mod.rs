//! Shared test harness for nacm-policy integration tests.
//!
//! Seed policies, rules, and data trees used across the RPC, read, and
//! write test crates.

// Kept as a shared utility module across the integration tests; individual
// test crates intentionally do not use every helper.
#![allow(dead_code)]

use nacm_core::{DataTree, NamespaceContext, NodeId, SchemaRegistry};
use nacm_policy::{AccessOps, Action, Group, PathExpr, Policy, Rule, RuleList, RuleType};

/// Namespace of the example data module used by the test trees
pub const NS: &str = "urn:example:config";
/// Module name registered for [`NS`]
pub const MODULE: &str = "example-config";
/// Recovery user configured on every test context
pub const RECOVERY_USER: &str = "root";
/// Ordinary requesting user, member of the `ops` group
pub const USER: &str = "admin";

pub fn schema() -> SchemaRegistry {
    let mut schema = SchemaRegistry::new();
    schema.register(MODULE, NS);
    schema
}

pub fn nsctx() -> NamespaceContext {
    NamespaceContext::with_default(NS)
}

// =============================================================================
// Policy builders
// =============================================================================

pub fn group(name: &str, users: &[&str]) -> Group {
    Group {
        name: name.to_string(),
        user_names: users.iter().map(|u| u.to_string()).collect(),
    }
}

pub fn rule_list(name: &str, groups: &[&str], rules: Vec<Rule>) -> RuleList {
    RuleList {
        name: name.to_string(),
        groups: groups.iter().map(|g| g.to_string()).collect(),
        rules,
    }
}

pub fn rpc_rule(name: &str, module: &str, rpc: &str, access: &str, action: Action) -> Rule {
    Rule {
        name: name.to_string(),
        module_name: Some(module.to_string()),
        rule_type: RuleType::Rpc(rpc.to_string()),
        access: AccessOps::parse(access),
        action,
    }
}

pub fn path_rule(name: &str, module: &str, expr: &str, access: &str, action: Action) -> Rule {
    Rule {
        name: name.to_string(),
        module_name: Some(module.to_string()),
        rule_type: RuleType::DataPath(PathExpr {
            expr: expr.to_string(),
            nsctx: nsctx(),
        }),
        access: AccessOps::parse(access),
        action,
    }
}

pub fn any_rule(name: &str, module: &str, access: &str, action: Action) -> Rule {
    Rule {
        name: name.to_string(),
        module_name: Some(module.to_string()),
        rule_type: RuleType::Any,
        access: AccessOps::parse(access),
        action,
    }
}

/// Enabled policy with [`USER`] in the `ops` group and no rule-lists
pub fn base_policy() -> Policy {
    Policy {
        enable_nacm: true,
        groups: vec![group("ops", &[USER])],
        ..Policy::default()
    }
}

/// [`base_policy`] with a single `ops` rule-list carrying `rules`
pub fn policy_with_rules(rules: Vec<Rule>) -> Policy {
    Policy {
        rule_lists: vec![rule_list("ops-acl", &["ops"], rules)],
        ..base_policy()
    }
}

// =============================================================================
// Data trees
// =============================================================================

/// Build `/a/b/c`, returning `(tree, a, b, c)`
pub fn tree_abc() -> (DataTree, NodeId, NodeId, NodeId) {
    let mut tree = DataTree::new();
    let a = tree.add_element(tree.root(), "a", NS);
    let b = tree.add_element(a, "b", NS);
    let c = tree.add_element(b, "c", NS);
    (tree, a, b, c)
}

/// Build `<r><x/><y><z/></y></r>`, returning `(tree, r, x, y, z)`
pub fn tree_rxyz() -> (DataTree, NodeId, NodeId, NodeId, NodeId) {
    let mut tree = DataTree::new();
    let r = tree.add_element(tree.root(), "r", NS);
    let x = tree.add_element(r, "x", NS);
    let y = tree.add_element(r, "y", NS);
    let z = tree.add_element(y, "z", NS);
    (tree, r, x, y, z)
}

/// Names of the element children of `node`, in document order
pub fn child_names(tree: &DataTree, node: NodeId) -> Vec<String> {
    tree.children(node)
        .map(|c| tree.name(c).to_string())
        .collect()
}
