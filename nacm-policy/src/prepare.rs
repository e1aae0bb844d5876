//! Preparation Cache
//!
//! Per-request precomputation for the data-node passes. Path
//! canonicalisation and instance-id resolution depend only on the data
//! tree, not on the node being checked, so they are hoisted out of the
//! traversal: the traversal then costs a linear scan of the cache per
//! node.
//!
//! The cache borrows rules from the policy and is consumed by exactly one
//! evaluation; entry order preserves rule-list and rule document order.

use crate::types::{AccessMode, Rule, RuleType};
use crate::view::PolicyView;
use crate::Result;
use nacm_core::{canonicalize_path, resolve_instance_id, DataTree, NodeId, SchemaRegistry};

/// One cached rule with its pre-evaluated path targets.
///
/// `targets` is empty exactly for rule-type-any rules; a path rule whose
/// resolution is empty is not cached at all.
#[derive(Debug)]
pub struct RuleCacheEntry<'a> {
    pub rule: &'a Rule,
    pub targets: Vec<NodeId>,
}

/// Build the rule cache for one data-node access request.
///
/// Keeps, in order, every rule that belongs to a rule-list of one of the
/// user's groups and whose access-operations match `mode`; resolves path
/// rules against `tree` and drops rpc/notification rules and path rules
/// that select nothing. `mode` must be one of read, create, update, or
/// delete.
pub fn build_rule_cache<'a>(
    view: PolicyView<'a>,
    group_names: &[&str],
    mode: AccessMode,
    tree: &DataTree,
    schema: &SchemaRegistry,
) -> Result<Vec<RuleCacheEntry<'a>>> {
    debug_assert!(mode != AccessMode::Exec);
    let mut entries = Vec::new();
    for rule_list in view.rule_lists() {
        if !rule_list
            .groups
            .iter()
            .any(|g| group_names.contains(&g.as_str()))
        {
            continue;
        }
        for rule in &rule_list.rules {
            if !rule.access.permits(mode) {
                continue;
            }
            match &rule.rule_type {
                RuleType::Rpc(_) | RuleType::Notification(_) => continue,
                RuleType::Any => entries.push(RuleCacheEntry {
                    rule,
                    targets: Vec::new(),
                }),
                RuleType::DataPath(path) => {
                    let canonical = canonicalize_path(&path.expr, &path.nsctx, schema)?;
                    let targets = resolve_instance_id(tree, tree.root(), schema, &canonical);
                    if targets.is_empty() {
                        continue;
                    }
                    entries.push(RuleCacheEntry { rule, targets });
                }
            }
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessOps, Action, PathExpr, Policy, RuleList};
    use nacm_core::NamespaceContext;

    const NS: &str = "urn:example:config";

    fn make_rule(name: &str, rule_type: RuleType, access: &str) -> Rule {
        Rule {
            name: name.to_string(),
            module_name: Some("*".to_string()),
            rule_type,
            access: AccessOps::parse(access),
            action: Action::Permit,
        }
    }

    fn path_type(expr: &str) -> RuleType {
        RuleType::DataPath(PathExpr {
            expr: expr.to_string(),
            nsctx: NamespaceContext::with_default(NS),
        })
    }

    fn make_policy(rule_lists: Vec<RuleList>) -> Policy {
        Policy {
            enable_nacm: true,
            rule_lists,
            ..Policy::default()
        }
    }

    fn sample_tree() -> DataTree {
        let mut tree = DataTree::new();
        let a = tree.add_element(tree.root(), "a", NS);
        tree.add_element(a, "b", NS);
        tree
    }

    fn schema() -> SchemaRegistry {
        let mut schema = SchemaRegistry::new();
        schema.register("example-config", NS);
        schema
    }

    #[test]
    fn test_cache_preserves_rule_list_and_rule_order() {
        let policy = make_policy(vec![
            RuleList {
                name: "first".to_string(),
                groups: vec!["ops".to_string()],
                rules: vec![
                    make_rule("r1", path_type("/a"), "read"),
                    make_rule("r2", RuleType::Any, "read"),
                ],
            },
            RuleList {
                name: "second".to_string(),
                groups: vec!["ops".to_string()],
                rules: vec![make_rule("r3", path_type("/a/b"), "read")],
            },
        ]);
        let view = PolicyView::new(&policy, "root");
        let cache =
            build_rule_cache(view, &["ops"], AccessMode::Read, &sample_tree(), &schema()).unwrap();
        let names: Vec<&str> = cache.iter().map(|e| e.rule.name.as_str()).collect();
        assert_eq!(names, vec!["r1", "r2", "r3"]);
        assert!(cache[1].targets.is_empty());
        assert_eq!(cache[2].targets.len(), 1);
    }

    #[test]
    fn test_cache_skips_foreign_group_rule_lists() {
        let policy = make_policy(vec![RuleList {
            name: "admin-only".to_string(),
            groups: vec!["admin".to_string()],
            rules: vec![make_rule("r1", RuleType::Any, "*")],
        }]);
        let view = PolicyView::new(&policy, "root");
        let cache =
            build_rule_cache(view, &["ops"], AccessMode::Read, &sample_tree(), &schema()).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_filters_by_access_mode() {
        let policy = make_policy(vec![RuleList {
            name: "ops-acl".to_string(),
            groups: vec!["ops".to_string()],
            rules: vec![
                make_rule("read-only", RuleType::Any, "read"),
                make_rule("writes", RuleType::Any, "write"),
            ],
        }]);
        let view = PolicyView::new(&policy, "root");
        let tree = sample_tree();
        let schema = schema();

        let read = build_rule_cache(view, &["ops"], AccessMode::Read, &tree, &schema).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].rule.name, "read-only");

        let create = build_rule_cache(view, &["ops"], AccessMode::Create, &tree, &schema).unwrap();
        assert_eq!(create.len(), 1);
        assert_eq!(create[0].rule.name, "writes");
    }

    #[test]
    fn test_cache_drops_unresolved_path_rules() {
        let policy = make_policy(vec![RuleList {
            name: "ops-acl".to_string(),
            groups: vec!["ops".to_string()],
            rules: vec![make_rule("gone", path_type("/does-not-exist"), "read")],
        }]);
        let view = PolicyView::new(&policy, "root");
        let cache =
            build_rule_cache(view, &["ops"], AccessMode::Read, &sample_tree(), &schema()).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_skips_rpc_and_notification_rules() {
        let policy = make_policy(vec![RuleList {
            name: "ops-acl".to_string(),
            groups: vec!["ops".to_string()],
            rules: vec![
                make_rule("rpc", RuleType::Rpc("*".to_string()), "*"),
                make_rule("notif", RuleType::Notification("*".to_string()), "*"),
                make_rule("kept", RuleType::Any, "*"),
            ],
        }]);
        let view = PolicyView::new(&policy, "root");
        let cache =
            build_rule_cache(view, &["ops"], AccessMode::Read, &sample_tree(), &schema()).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache[0].rule.name, "kept");
    }

    #[test]
    fn test_cache_propagates_canonicalisation_failure() {
        let mut rule = make_rule("bad", path_type("/x:a"), "read");
        if let RuleType::DataPath(path) = &mut rule.rule_type {
            path.nsctx = NamespaceContext::new(); // prefix unresolvable
        }
        let policy = make_policy(vec![RuleList {
            name: "ops-acl".to_string(),
            groups: vec!["ops".to_string()],
            rules: vec![rule],
        }]);
        let view = PolicyView::new(&policy, "root");
        assert!(
            build_rule_cache(view, &["ops"], AccessMode::Read, &sample_tree(), &schema()).is_err()
        );
    }
}
