//! # NACM Policy
//!
//! Access control engine for NETCONF per RFC 8341: decides whether an
//! authenticated user may invoke a protocol operation, read a subtree of
//! configuration data, or modify one.
//!
//! # Core Types
//!
//! - [`Policy`]: an already-parsed, order-preserving policy document
//! - [`PolicyView`]: read-only queries over a borrowed policy
//! - [`AccessContext`]: per-request context with the three evaluators
//! - [`Verdict`]: permit, or deny with a structured [`AccessDenied`] payload
//!
//! # Evaluation Semantics
//!
//! 1. **Disabled policy permits**: no policy, or `enable-nacm` false,
//!    permits every request without touching the data tree
//! 2. **Recovery user bypasses everything**
//! 3. **First match wins**: rule-lists in document order, rules in
//!    document order, first matching rule decides
//! 4. **Defaults fill the gaps**: `exec-default` and `read-default`
//!    default to permit; `write-default` is mandatory configuration
//! 5. **Reads prune, writes veto**: a denied read subtree is silently
//!    removed; a single denied node fails an entire write
//!
//! # Usage
//!
//! Build an [`AccessContext`] per request from the loaded [`Policy`], the
//! configured recovery user, the schema registry, and the authenticated
//! user, then call [`AccessContext::evaluate_rpc`],
//! [`AccessContext::evaluate_write`], or [`AccessContext::evaluate_read`].
//! The context and everything it borrows are discarded when the request
//! completes; nothing is cached across requests.
//!
//! [`AccessDenied`]: nacm_core::AccessDenied

mod error;
mod evaluate;
mod matcher;
mod prepare;
mod types;
mod view;

pub use error::{PolicyError, Result};
pub use evaluate::AccessContext;
pub use matcher::{match_data_node, match_rpc};
pub use prepare::{build_rule_cache, RuleCacheEntry};
pub use types::{
    AccessMode, AccessOps, Action, Group, PathExpr, Policy, PolicyMode, Rule, RuleList, RuleType,
    Verdict, WriteOp,
};
pub use view::PolicyView;
