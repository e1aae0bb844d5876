//! Arena-indexed instance data tree
//!
//! The tree stores element nodes in a flat arena and addresses them with
//! copyable [`NodeId`] handles. Every tree has a nameless document root;
//! instance data hangs beneath it in document order.
//!
//! ## Flags
//!
//! Read evaluation records per-node decisions as [`NodeFlag::Mark`]
//! (permitted) and [`NodeFlag::Delete`] (denied) before pruning. Flags are
//! plain per-node bits; setting one never touches ancestors or descendants.
//!
//! ## Detach semantics
//!
//! [`DataTree::detach`] unlinks a subtree from its parent. The arena slots
//! stay allocated, so any [`NodeId`] handed out earlier remains valid to
//! query; the subtree is simply unreachable from the root.

/// Handle to a node in a [`DataTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Per-node evaluation flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFlag {
    /// Node was explicitly permitted
    Mark,
    /// Node was explicitly denied and is scheduled for removal
    Delete,
}

impl NodeFlag {
    fn bit(self) -> u8 {
        match self {
            NodeFlag::Mark => 0x01,
            NodeFlag::Delete => 0x02,
        }
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    name: String,
    namespace: String,
    body: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    flags: u8,
}

/// Instance data tree
#[derive(Debug, Clone)]
pub struct DataTree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Default for DataTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DataTree {
    /// Create an empty tree containing only the document root
    pub fn new() -> Self {
        let root = NodeData {
            name: String::new(),
            namespace: String::new(),
            body: None,
            parent: None,
            children: Vec::new(),
            flags: 0,
        };
        DataTree {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// The document root. It carries no name or namespace and is never
    /// matched against rules or detached.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Append a new element as the last child of `parent`
    pub fn add_element(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name: name.into(),
            namespace: namespace.into(),
            body: None,
            parent: Some(parent),
            children: Vec::new(),
            flags: 0,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Set the text body of a node (leaf value)
    pub fn set_body(&mut self, node: NodeId, body: impl Into<String>) {
        self.nodes[node.0].body = Some(body.into());
    }

    /// Element name
    pub fn name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    /// Namespace URI of the element
    pub fn namespace(&self, node: NodeId) -> &str {
        &self.nodes[node.0].namespace
    }

    /// Text body, if any
    pub fn body(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0].body.as_deref()
    }

    /// Parent node; `None` for the root and for detached subtree roots
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Element children in document order
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[node.0].children.iter().copied()
    }

    /// First element child named `name`
    pub fn find_child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.children(node).find(|&c| self.name(c) == name)
    }

    /// Text body of the first element child named `name`
    pub fn find_child_body(&self, node: NodeId, name: &str) -> Option<&str> {
        self.find_child(node, name).and_then(|c| self.body(c))
    }

    /// True iff `ancestor` is a strict ancestor of `node`
    pub fn is_ancestor(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = self.parent(node);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.parent(p);
        }
        false
    }

    /// Set a flag on a node
    pub fn set_flag(&mut self, node: NodeId, flag: NodeFlag) {
        self.nodes[node.0].flags |= flag.bit();
    }

    /// Clear a flag on a node
    pub fn clear_flag(&mut self, node: NodeId, flag: NodeFlag) {
        self.nodes[node.0].flags &= !flag.bit();
    }

    /// Test a flag on a node
    pub fn has_flag(&self, node: NodeId, flag: NodeFlag) -> bool {
        self.nodes[node.0].flags & flag.bit() != 0
    }

    /// Clear a flag on every node, including detached ones
    pub fn clear_flag_all(&mut self, flag: NodeFlag) {
        for data in &mut self.nodes {
            data.flags &= !flag.bit();
        }
    }

    /// Unlink `node` from its parent. No-op for the root and for nodes
    /// already detached.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Remove every subtree below `root` whose own root does not carry
    /// `flag` and which contains no flagged descendant. Subtrees with a
    /// flagged descendant survive so that ancestor chains of flagged nodes
    /// are preserved; `root` itself is never detached.
    pub fn prune_unmarked(&mut self, root: NodeId, flag: NodeFlag) {
        let children: Vec<NodeId> = self.children(root).collect();
        for child in children {
            if !self.prune_rec(child, flag) {
                self.detach(child);
            }
        }
    }

    /// Prune within the subtree at `node`; returns true iff the subtree
    /// still contains a flagged node.
    fn prune_rec(&mut self, node: NodeId, flag: NodeFlag) -> bool {
        let mut alive = self.has_flag(node, flag);
        let children: Vec<NodeId> = self.children(node).collect();
        for child in children {
            if self.prune_rec(child, flag) {
                alive = true;
            } else {
                self.detach(child);
            }
        }
        alive
    }

    /// Number of element children
    pub fn child_count(&self, node: NodeId) -> usize {
        self.nodes[node.0].children.len()
    }
}
