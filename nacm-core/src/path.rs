//! Instance-identifier canonicalisation and resolution
//!
//! Rule paths arrive as instance-identifier expressions written against the
//! rule element's local namespace context (`/if:interfaces/if:interface`).
//! Canonicalisation resolves each step's prefix through that context and
//! maps the namespace to a YANG module name through the schema registry,
//! yielding a [`CanonicalPath`] that no longer depends on prefix bindings.
//!
//! Resolution walks a [`DataTree`] step by step. A step without key
//! predicates selects every matching list entry; key predicates
//! (`[name='eth0']`) narrow a step to entries whose key leaf carries the
//! given value. Key names are matched by local name.

use crate::error::{Error, Result};
use crate::nsctx::NamespaceContext;
use crate::schema::SchemaRegistry;
use crate::tree::{DataTree, NodeId};
use std::fmt;

/// One step of a canonical path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    /// Module qualifier; `None` leaves the step unqualified
    pub module: Option<String>,
    /// Element local name
    pub name: String,
    /// Key predicates, each `(leaf name, required value)`
    pub keys: Vec<(String, String)>,
}

/// Instance identifier after namespace resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPath {
    pub steps: Vec<PathStep>,
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            f.write_str("/")?;
            if let Some(module) = &step.module {
                write!(f, "{}:", module)?;
            }
            f.write_str(&step.name)?;
            for (k, v) in &step.keys {
                write!(f, "[{}='{}']", k, v)?;
            }
        }
        Ok(())
    }
}

/// Canonicalise an instance-identifier expression.
///
/// Each step's prefix is resolved through `nsctx` (unprefixed steps use the
/// default namespace) and the namespace is mapped to its module name
/// through `schema`. A step with neither prefix nor default namespace stays
/// unqualified and matches any module during resolution.
pub fn canonicalize_path(
    expr: &str,
    nsctx: &NamespaceContext,
    schema: &SchemaRegistry,
) -> Result<CanonicalPath> {
    let expr = expr.trim();
    if !expr.starts_with('/') {
        return Err(Error::path_syntax(format!(
            "expected absolute path, got '{expr}'"
        )));
    }
    let mut steps = Vec::new();
    for raw in split_steps(expr)? {
        let (prefix, name, keys) = parse_step(raw)?;
        let module = match nsctx.resolve(prefix) {
            Some(ns) => Some(
                schema
                    .module_for_namespace(ns)
                    .ok_or_else(|| Error::unknown_namespace(ns))?
                    .name
                    .clone(),
            ),
            None => match prefix {
                Some(p) => return Err(Error::unknown_prefix(p)),
                None => None,
            },
        };
        steps.push(PathStep {
            module,
            name: name.to_string(),
            keys,
        });
    }
    Ok(CanonicalPath { steps })
}

/// Resolve a canonical path against a tree, starting below `root`.
///
/// Returns the matched nodes in document order; the set may be empty.
pub fn resolve_instance_id(
    tree: &DataTree,
    root: NodeId,
    schema: &SchemaRegistry,
    path: &CanonicalPath,
) -> Vec<NodeId> {
    let mut frontier = vec![root];
    for step in &path.steps {
        let mut next = Vec::new();
        for &node in &frontier {
            for child in tree.children(node) {
                if tree.name(child) != step.name {
                    continue;
                }
                if let Some(module) = &step.module {
                    match schema.module_for_namespace(tree.namespace(child)) {
                        Some(m) if &m.name == module => {}
                        _ => continue,
                    }
                }
                let keys_match = step
                    .keys
                    .iter()
                    .all(|(k, v)| tree.find_child_body(child, k) == Some(v.as_str()));
                if keys_match {
                    next.push(child);
                }
            }
        }
        if next.is_empty() {
            return Vec::new();
        }
        frontier = next;
    }
    frontier
}

/// Split an absolute path into raw steps at top-level slashes, honoring
/// brackets and quoted predicate values.
fn split_steps(expr: &str) -> Result<Vec<&str>> {
    let mut steps = Vec::new();
    let mut start = 1;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in expr.char_indices() {
        if i == 0 {
            continue;
        }
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '[' => depth += 1,
                ']' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| Error::path_syntax("unbalanced ']'"))?;
                }
                '/' if depth == 0 => {
                    steps.push(&expr[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    if quote.is_some() {
        return Err(Error::path_syntax("unterminated quote in predicate"));
    }
    if depth != 0 {
        return Err(Error::path_syntax("unbalanced '['"));
    }
    steps.push(&expr[start..]);
    if steps.iter().any(|s| s.is_empty()) {
        return Err(Error::path_syntax("empty path step"));
    }
    Ok(steps)
}

/// Parse one raw step into `(prefix, name, keys)`
fn parse_step(raw: &str) -> Result<(Option<&str>, &str, Vec<(String, String)>)> {
    let (qname, mut rest) = match raw.find('[') {
        Some(idx) => (&raw[..idx], &raw[idx..]),
        None => (raw, ""),
    };
    let (prefix, name) = match qname.split_once(':') {
        Some((p, n)) => (Some(p), n),
        None => (None, qname),
    };
    if name.is_empty() {
        return Err(Error::path_syntax(format!("missing name in step '{raw}'")));
    }
    let mut keys = Vec::new();
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(Error::path_syntax(format!(
                "unexpected text after predicate in '{raw}'"
            )));
        }
        let close = find_predicate_end(rest)
            .ok_or_else(|| Error::path_syntax(format!("unterminated predicate in '{raw}'")))?;
        let inner = &rest[1..close];
        let (key, value) = inner
            .split_once('=')
            .ok_or_else(|| Error::path_syntax(format!("malformed predicate '[{inner}]'")))?;
        let key = key.trim();
        let key = key.split_once(':').map_or(key, |(_, local)| local);
        let value = unquote(value.trim())
            .ok_or_else(|| Error::path_syntax(format!("unquoted predicate value in '[{inner}]'")))?;
        if key.is_empty() {
            return Err(Error::path_syntax(format!("empty key in '[{inner}]'")));
        }
        keys.push((key.to_string(), value.to_string()));
        rest = &rest[close + 1..];
    }
    Ok((prefix, name, keys))
}

/// Index of the `]` closing the predicate that `rest` starts with
fn find_predicate_end(rest: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in rest.char_indices().skip(1) {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                ']' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

fn unquote(value: &str) -> Option<&str> {
    let mut chars = value.chars();
    let first = chars.next()?;
    if (first == '\'' || first == '"') && value.len() >= 2 && value.ends_with(first) {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:example:config";

    fn schema() -> SchemaRegistry {
        let mut schema = SchemaRegistry::new();
        schema.register("example-config", NS);
        schema
    }

    fn nsctx() -> NamespaceContext {
        let mut nsctx = NamespaceContext::with_default(NS);
        nsctx.bind("ex", NS);
        nsctx
    }

    #[test]
    fn test_canonicalize_default_namespace() {
        let path = canonicalize_path("/a/b", &nsctx(), &schema()).unwrap();
        assert_eq!(path.to_string(), "/example-config:a/example-config:b");
    }

    #[test]
    fn test_canonicalize_prefixed_with_keys() {
        let path = canonicalize_path("/ex:ifs/ex:if[name='eth0']", &nsctx(), &schema()).unwrap();
        assert_eq!(path.steps.len(), 2);
        assert_eq!(path.steps[1].keys, vec![("name".into(), "eth0".into())]);
        assert_eq!(
            path.to_string(),
            "/example-config:ifs/example-config:if[name='eth0']"
        );
    }

    #[test]
    fn test_canonicalize_trims_whitespace() {
        let path = canonicalize_path("  /a \n", &nsctx(), &schema()).unwrap();
        assert_eq!(path.steps[0].name, "a");
    }

    #[test]
    fn test_canonicalize_unknown_prefix() {
        assert!(matches!(
            canonicalize_path("/bad:a", &nsctx(), &schema()),
            Err(Error::UnknownPrefix(_))
        ));
    }

    #[test]
    fn test_canonicalize_unregistered_namespace() {
        let mut nsctx = NamespaceContext::new();
        nsctx.bind("x", "urn:example:elsewhere");
        assert!(matches!(
            canonicalize_path("/x:a", &nsctx, &schema()),
            Err(Error::UnknownNamespace(_))
        ));
    }

    #[test]
    fn test_canonicalize_rejects_relative_and_empty_steps() {
        assert!(canonicalize_path("a/b", &nsctx(), &schema()).is_err());
        assert!(canonicalize_path("/a//b", &nsctx(), &schema()).is_err());
        assert!(canonicalize_path("/", &nsctx(), &schema()).is_err());
    }

    #[test]
    fn test_canonicalize_rejects_text_after_predicate() {
        assert!(canonicalize_path("/a[k='v']x", &nsctx(), &schema()).is_err());
    }

    #[test]
    fn test_slash_inside_predicate_value() {
        let path = canonicalize_path("/a[k='x/y']", &nsctx(), &schema()).unwrap();
        assert_eq!(path.steps[0].keys, vec![("k".into(), "x/y".into())]);
    }

    fn interface_tree() -> (DataTree, NodeId, NodeId) {
        let mut tree = DataTree::new();
        let ifs = tree.add_element(tree.root(), "interfaces", NS);
        let eth0 = tree.add_element(ifs, "interface", NS);
        let name0 = tree.add_element(eth0, "name", NS);
        tree.set_body(name0, "eth0");
        let eth1 = tree.add_element(ifs, "interface", NS);
        let name1 = tree.add_element(eth1, "name", NS);
        tree.set_body(name1, "eth1");
        (tree, eth0, eth1)
    }

    #[test]
    fn test_resolve_keyed_entry() {
        let (tree, eth0, _) = interface_tree();
        let path =
            canonicalize_path("/interfaces/interface[name='eth0']", &nsctx(), &schema()).unwrap();
        let nodes = resolve_instance_id(&tree, tree.root(), &schema(), &path);
        assert_eq!(nodes, vec![eth0]);
    }

    #[test]
    fn test_resolve_keyless_selects_all_entries() {
        let (tree, eth0, eth1) = interface_tree();
        let path = canonicalize_path("/interfaces/interface", &nsctx(), &schema()).unwrap();
        let nodes = resolve_instance_id(&tree, tree.root(), &schema(), &path);
        assert_eq!(nodes, vec![eth0, eth1]);
    }

    #[test]
    fn test_resolve_no_match_is_empty() {
        let (tree, ..) = interface_tree();
        let path =
            canonicalize_path("/interfaces/interface[name='eth9']", &nsctx(), &schema()).unwrap();
        assert!(resolve_instance_id(&tree, tree.root(), &schema(), &path).is_empty());
    }

    #[test]
    fn test_resolve_module_qualifier_must_match() {
        let (mut tree, ..) = interface_tree();
        // A sibling in a foreign namespace never matches a qualified step
        let alien = tree.add_element(tree.root(), "interfaces", "urn:example:other");
        tree.add_element(alien, "interface", "urn:example:other");
        let path = canonicalize_path("/interfaces", &nsctx(), &schema()).unwrap();
        let nodes = resolve_instance_id(&tree, tree.root(), &schema(), &path);
        assert_eq!(nodes.len(), 1);
    }
}
