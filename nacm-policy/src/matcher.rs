//! Rule Matcher
//!
//! Decides whether one rule applies to one request and, if so, which
//! action it prescribes. The RPC and data-node variants share the
//! module-name gate; a rule without a module-name matches nothing in
//! either pass.

use crate::types::{AccessMode, Action, Rule, RuleType};
use nacm_core::{DataTree, NodeId, Result as CoreResult, SchemaRegistry};

/// Match a rule against a protocol operation.
///
/// The rule matches iff its module-name is `*` or equals `module`, its
/// rule type is compatible (no type, or an rpc-name of `*` or
/// `operation`), and its access-operations carry the exec bit.
pub fn match_rpc(rule: &Rule, module: &str, operation: &str) -> Option<Action> {
    let pattern = rule.module_name.as_deref()?;
    if pattern != "*" && pattern != module {
        return None;
    }
    match &rule.rule_type {
        RuleType::Any => {}
        RuleType::Rpc(name) if name == "*" || name == operation => {}
        _ => return None,
    }
    if !rule.access.permits(AccessMode::Exec) {
        return None;
    }
    Some(rule.action)
}

/// Match a rule against a data node.
///
/// `targets` is the rule's pre-evaluated path result (empty for a
/// rule-type-any rule; see the preparation cache). The rule matches iff
/// its module-name is `*` or equals the module of `node`, and either the
/// rule has no path, or `node` is one of — or a descendant of one of —
/// the target nodes.
pub fn match_data_node(
    rule: &Rule,
    targets: &[NodeId],
    tree: &DataTree,
    node: NodeId,
    schema: &SchemaRegistry,
) -> CoreResult<Option<Action>> {
    let Some(pattern) = rule.module_name.as_deref() else {
        return Ok(None);
    };
    if pattern != "*" {
        let module = schema.module_of(tree, node)?;
        if module.name != pattern {
            return Ok(None);
        }
    }
    match &rule.rule_type {
        RuleType::Any => Ok(Some(rule.action)),
        RuleType::DataPath(_) => {
            let hit = targets
                .iter()
                .any(|&t| t == node || tree.is_ancestor(node, t));
            Ok(if hit { Some(rule.action) } else { None })
        }
        // rpc/notification rules are dropped at prepare time; treat a
        // stray one as no-match
        _ => Ok(None),
    }
}
