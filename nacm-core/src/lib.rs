//! # NACM Core
//!
//! Data-tree and schema collaborators for the NETCONF access control engine.
//!
//! This crate provides:
//! - [`DataTree`]/[`NodeId`]: an arena-indexed instance data tree with
//!   document-order element children, per-node MARK/DELETE flags, subtree
//!   detach, and unmarked-subtree pruning
//! - [`NamespaceContext`]: prefix-to-namespace bindings with a default
//!   namespace, as carried by a rule's `path` element
//! - [`SchemaRegistry`]: YANG module lookup by namespace
//! - [`CanonicalPath`]: instance-identifier parsing, canonicalisation, and
//!   resolution against a tree
//! - [`AccessDenied`]: the structured deny payload (wire encoding is the
//!   caller's concern)
//!
//! ## Design Principles
//!
//! 1. **Id handles over owned storage**: nodes are addressed by copyable
//!    [`NodeId`]s; detaching a subtree never invalidates ids already handed
//!    out, it only unlinks the subtree from its parent
//! 2. **Synchronous**: no I/O, no async; trees are built by the caller and
//!    borrowed for the duration of an evaluation

pub mod error;
pub mod nsctx;
pub mod path;
pub mod payload;
pub mod schema;
pub mod tree;

pub use error::{Error, Result};
pub use nsctx::NamespaceContext;
pub use path::{canonicalize_path, resolve_instance_id, CanonicalPath, PathStep};
pub use payload::AccessDenied;
pub use schema::{Module, SchemaRegistry};
pub use tree::{DataTree, NodeFlag, NodeId};
