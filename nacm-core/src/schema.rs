//! YANG module registry keyed by namespace

use crate::error::{Error, Result};
use crate::tree::{DataTree, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A registered YANG module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Module name as it appears in canonical paths and rule module-name leafs
    pub name: String,
    /// XML namespace URI of the module
    pub namespace: String,
}

/// Registry of known YANG modules.
///
/// The engine only needs one direction of lookup: from a data node's
/// namespace to the module that defines it.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    modules: Vec<Module>,
    by_namespace: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under its namespace. Re-registering a namespace
    /// replaces the earlier entry.
    pub fn register(&mut self, name: impl Into<String>, namespace: impl Into<String>) {
        let module = Module {
            name: name.into(),
            namespace: namespace.into(),
        };
        if let Some(&idx) = self.by_namespace.get(&module.namespace) {
            self.modules[idx] = module;
        } else {
            self.by_namespace
                .insert(module.namespace.clone(), self.modules.len());
            self.modules.push(module);
        }
    }

    /// Module registered under `namespace`, if any
    pub fn module_for_namespace(&self, namespace: &str) -> Option<&Module> {
        self.by_namespace.get(namespace).map(|&i| &self.modules[i])
    }

    /// The module defining `node`, looked up through the node's namespace
    pub fn module_of(&self, tree: &DataTree, node: NodeId) -> Result<&Module> {
        let ns = tree.namespace(node);
        self.module_for_namespace(ns)
            .ok_or_else(|| Error::unknown_namespace(ns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_of() {
        let mut schema = SchemaRegistry::new();
        schema.register("example-config", "urn:example:config");
        let mut tree = DataTree::new();
        let top = tree.add_element(tree.root(), "top", "urn:example:config");
        let module = schema.module_of(&tree, top).unwrap();
        assert_eq!(module.name, "example-config");
    }

    #[test]
    fn test_module_of_unregistered_namespace() {
        let schema = SchemaRegistry::new();
        let mut tree = DataTree::new();
        let top = tree.add_element(tree.root(), "top", "urn:example:unknown");
        assert!(matches!(
            schema.module_of(&tree, top),
            Err(Error::UnknownNamespace(_))
        ));
    }

    #[test]
    fn test_reregister_replaces() {
        let mut schema = SchemaRegistry::new();
        schema.register("old", "urn:example:config");
        schema.register("new", "urn:example:config");
        assert_eq!(
            schema.module_for_namespace("urn:example:config").unwrap().name,
            "new"
        );
    }
}
