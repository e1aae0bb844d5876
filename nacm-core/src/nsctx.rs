//! Namespace context: prefix bindings local to a policy rule's path element

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prefix-to-namespace bindings with an optional default namespace.
///
/// A rule's `path` leaf is interpreted in the namespace context of the XML
/// element that carried it; unprefixed path steps resolve to the default
/// namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceContext {
    default_ns: Option<String>,
    prefixes: HashMap<String, String>,
}

impl NamespaceContext {
    /// Empty context with no default namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with the given default namespace
    pub fn with_default(namespace: impl Into<String>) -> Self {
        NamespaceContext {
            default_ns: Some(namespace.into()),
            prefixes: HashMap::new(),
        }
    }

    /// Bind a prefix to a namespace URI
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Resolve a prefix; `None` resolves to the default namespace
    pub fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        match prefix {
            Some(p) => self.prefixes.get(p).map(String::as_str),
            None => self.default_ns.as_deref(),
        }
    }
}
