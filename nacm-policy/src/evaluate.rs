//! Access Evaluators
//!
//! Three entry points drive the matcher over a per-request rule cache:
//!
//! - [`AccessContext::evaluate_rpc`]: protocol-operation validation
//! - [`AccessContext::evaluate_write`]: recursive data-node write check
//!   with descendant-deny semantics
//! - [`AccessContext::evaluate_read`]: two-pass read filtering (evaluate,
//!   then prune) that silently removes denied subtrees
//!
//! # Evaluation Semantics
//!
//! 1. **Pre-checks first**: an absent or disabled policy permits
//!    everything and leaves the data tree untouched; the recovery user
//!    bypasses all rules; `close-session` is always permitted
//! 2. **Group resolution**: a request with no user or no groups skips the
//!    rule scan and falls through to the relevant default
//! 3. **First match wins**: rule-lists and rules are scanned in document
//!    order; the first matching rule decides (for reads, decides that
//!    node)
//! 4. **Write descendant-deny**: any denied node fails the whole write
//!    immediately; a permit match stops the scan for that node only and
//!    recursion continues into its children
//! 5. **Read never errors**: denied subtrees are detached, and under
//!    `read-default` deny everything without a permitted descendant is
//!    pruned after the traversal
//!
//! Denies are verdicts carrying the structured payload; engine errors are
//! configuration faults or collaborator failures only.

use crate::matcher::{match_data_node, match_rpc};
use crate::prepare::{build_rule_cache, RuleCacheEntry};
use crate::types::{AccessMode, Action, Policy, Verdict, WriteOp};
use crate::view::PolicyView;
use crate::Result;
use nacm_core::{AccessDenied, DataTree, NodeFlag, NodeId, SchemaRegistry};
use tracing::debug;

/// Deny message for rule-driven denies
const MSG_ACCESS_DENIED: &str = "access denied";
/// Deny message for default-rule denies
const MSG_DEFAULT_DENY: &str = "default deny";

fn deny(message: &str) -> Verdict {
    Verdict::Deny(AccessDenied::application(message))
}

fn default_verdict(default: Action) -> Verdict {
    match default {
        Action::Permit => Verdict::Permit,
        Action::Deny => deny(MSG_DEFAULT_DENY),
    }
}

/// Per-request evaluation context.
///
/// Borrows the loaded policy (if any), the schema registry, the
/// authenticated user, and any transport-provided external group names for
/// the duration of one request. The preparation cache built inside the
/// data-node evaluators never outlives a call.
pub struct AccessContext<'a> {
    view: Option<PolicyView<'a>>,
    schema: &'a SchemaRegistry,
    user: Option<&'a str>,
    external_groups: &'a [String],
}

impl<'a> AccessContext<'a> {
    /// Create a context for one request. `policy` is `None` when the
    /// loader found no policy; `user` is `None` for an unauthenticated
    /// session.
    pub fn new(
        policy: Option<&'a Policy>,
        recovery_user: &'a str,
        schema: &'a SchemaRegistry,
        user: Option<&'a str>,
    ) -> Self {
        AccessContext {
            view: policy.map(|p| PolicyView::new(p, recovery_user)),
            schema,
            user,
            external_groups: &[],
        }
    }

    /// Attach transport-provided group names. They only take effect when
    /// the policy sets `enable-external-groups`.
    pub fn with_external_groups(mut self, groups: &'a [String]) -> Self {
        self.external_groups = groups;
        self
    }

    /// The policy view, if a policy is loaded
    pub fn view(&self) -> Option<PolicyView<'a>> {
        self.view
    }

    /// Validate a protocol operation.
    ///
    /// Scans the rules of every rule-list matching one of the user's
    /// groups, in document order, and stops at the first match. With no
    /// match, `kill-session` and `delete-config` are denied
    /// unconditionally; everything else falls back to `exec-default`.
    pub fn evaluate_rpc(&self, module: &str, operation: &str) -> Result<Verdict> {
        let Some(view) = self.view else {
            return Ok(Verdict::Permit);
        };
        if !view.enabled() {
            return Ok(Verdict::Permit);
        }
        if self.user.is_some_and(|u| view.is_recovery(u)) {
            return Ok(Verdict::Permit);
        }
        if operation == "close-session" {
            return Ok(Verdict::Permit);
        }

        if let Some(user) = self.user {
            let groups = view.groups_for(user, self.external_groups);
            if !groups.is_empty() {
                for rule_list in view.rule_lists() {
                    if !rule_list
                        .groups
                        .iter()
                        .any(|g| groups.contains(&g.as_str()))
                    {
                        continue;
                    }
                    for rule in &rule_list.rules {
                        if let Some(action) = match_rpc(rule, module, operation) {
                            debug!(rule = %rule.name, operation, ?action, "rpc rule matched");
                            return Ok(match action {
                                Action::Permit => Verdict::Permit,
                                Action::Deny => deny(MSG_ACCESS_DENIED),
                            });
                        }
                    }
                }
            }
        }

        if operation == "kill-session" || operation == "delete-config" {
            debug!(operation, "rpc denied by default");
            return Ok(deny(MSG_DEFAULT_DENY));
        }
        Ok(default_verdict(view.exec_default()))
    }

    /// Validate a write (create, update, or delete) of the subtree rooted
    /// at `requested` inside `tree`.
    ///
    /// Recurses over the requested subtree; the first node that a deny
    /// rule matches — or that no rule matches under `write-default` deny —
    /// fails the entire write. The tree is never mutated.
    pub fn evaluate_write(
        &self,
        tree: &DataTree,
        requested: NodeId,
        op: WriteOp,
    ) -> Result<Verdict> {
        let Some(view) = self.view else {
            return Ok(Verdict::Permit);
        };
        if !view.enabled() {
            return Ok(Verdict::Permit);
        }
        if self.user.is_some_and(|u| view.is_recovery(u)) {
            return Ok(Verdict::Permit);
        }
        let write_default = view.write_default()?;

        let groups = match self.user {
            Some(user) => view.groups_for(user, self.external_groups),
            None => Vec::new(),
        };
        if groups.is_empty() {
            return Ok(default_verdict(write_default));
        }

        let cache = build_rule_cache(view, &groups, op.mode(), tree, self.schema)?;
        let verdict = self.write_recurse(tree, requested, &cache, write_default)?;
        debug!(
            op = op.mode().as_str(),
            permitted = verdict.is_permit(),
            "write evaluated"
        );
        Ok(verdict)
    }

    fn write_recurse(
        &self,
        tree: &DataTree,
        node: NodeId,
        cache: &[RuleCacheEntry<'_>],
        write_default: Action,
    ) -> Result<Verdict> {
        let mut matched = false;
        for entry in cache {
            match match_data_node(entry.rule, &entry.targets, tree, node, self.schema)? {
                Some(Action::Deny) => {
                    debug!(rule = %entry.rule.name, node = tree.name(node), "write denied by rule");
                    return Ok(deny(MSG_ACCESS_DENIED));
                }
                Some(Action::Permit) => {
                    // Stop scanning for this node; descendants are still
                    // checked against the full cache.
                    matched = true;
                    break;
                }
                None => {}
            }
        }
        if !matched && write_default == Action::Deny {
            return Ok(deny(MSG_DEFAULT_DENY));
        }
        for child in tree.children(node) {
            let verdict = self.write_recurse(tree, child, cache, write_default)?;
            if verdict.is_deny() {
                return Ok(verdict);
            }
        }
        Ok(Verdict::Permit)
    }

    /// Filter `tree` for a read request.
    ///
    /// Denied nodes produce no error: their subtrees are removed from the
    /// tree. Under `read-default` permit, denied subtrees are flagged and
    /// detached during the traversal; under `read-default` deny, permitted
    /// nodes are marked and everything without a marked node in its
    /// subtree is pruned afterwards. MARK flags are cleared before
    /// returning.
    ///
    /// With no user or no groups the traversal is skipped and every
    /// requested subtree root is removed: no rule could have permitted
    /// anything.
    pub fn evaluate_read(&self, tree: &mut DataTree, requested_roots: &[NodeId]) -> Result<()> {
        let Some(view) = self.view else {
            return Ok(());
        };
        if !view.enabled() {
            return Ok(());
        }
        if self.user.is_some_and(|u| view.is_recovery(u)) {
            return Ok(());
        }

        let groups = match self.user {
            Some(user) => view.groups_for(user, self.external_groups),
            None => Vec::new(),
        };
        if groups.is_empty() {
            debug!("read with no groups, removing requested subtrees");
            for &root in requested_roots {
                tree.detach(root);
            }
            return Ok(());
        }

        let cache = build_rule_cache(view, &groups, AccessMode::Read, tree, self.schema)?;
        let root = tree.root();
        self.read_recurse(tree, root, &cache)?;
        if view.read_default() == Action::Deny {
            tree.prune_unmarked(root, NodeFlag::Mark);
        }
        tree.clear_flag_all(NodeFlag::Mark);
        Ok(())
    }

    fn read_recurse(
        &self,
        tree: &mut DataTree,
        node: NodeId,
        cache: &[RuleCacheEntry<'_>],
    ) -> Result<()> {
        if node != tree.root() {
            for entry in cache {
                match match_data_node(entry.rule, &entry.targets, tree, node, self.schema)? {
                    Some(Action::Deny) => {
                        tree.set_flag(node, NodeFlag::Delete);
                        break;
                    }
                    Some(Action::Permit) => {
                        tree.set_flag(node, NodeFlag::Mark);
                        break;
                    }
                    None => {}
                }
            }
            if tree.has_flag(node, NodeFlag::Delete) {
                // Parent detaches this subtree; nothing below it needs a
                // verdict.
                return Ok(());
            }
        }
        let children: Vec<NodeId> = tree.children(node).collect();
        for child in children {
            self.read_recurse(tree, child, cache)?;
            if tree.has_flag(child, NodeFlag::Delete) {
                tree.detach(child);
            }
        }
        Ok(())
    }
}
