//! Policy data model
//!
//! The engine consumes already-parsed policy objects: rule-lists and rules
//! arrive in document order and the order is load-bearing — the first
//! matching rule in the first applicable rule-list decides a request.
//!
//! [`AccessOps`] is a real bit set. The `access-operations` leaf is a
//! space-separated token list; tokens are matched exactly, never by
//! substring, and the `write` token is shorthand for
//! create ∪ update ∪ delete.

use nacm_core::{AccessDenied, NamespaceContext};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::PolicyError;

/// Rule action and default action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Permit,
    Deny,
}

/// Requested access operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Create,
    Read,
    Update,
    Delete,
    Exec,
}

impl AccessMode {
    /// Token name as it appears in `access-operations`
    pub fn as_str(self) -> &'static str {
        match self {
            AccessMode::Create => "create",
            AccessMode::Read => "read",
            AccessMode::Update => "update",
            AccessMode::Delete => "delete",
            AccessMode::Exec => "exec",
        }
    }
}

/// The write operations accepted by the write evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl WriteOp {
    /// The access mode this operation requests
    pub fn mode(self) -> AccessMode {
        match self {
            WriteOp::Create => AccessMode::Create,
            WriteOp::Update => AccessMode::Update,
            WriteOp::Delete => AccessMode::Delete,
        }
    }
}

const OP_CREATE: u8 = 0x01;
const OP_READ: u8 = 0x02;
const OP_UPDATE: u8 = 0x04;
const OP_DELETE: u8 = 0x08;
const OP_EXEC: u8 = 0x10;
const OP_ALL: u8 = 0x1f;

/// Bit set over {create, read, update, delete, exec}.
///
/// An absent `access-operations` leaf is the empty set and matches no
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessOps(u8);

impl AccessOps {
    /// The empty set
    pub fn empty() -> Self {
        AccessOps(0)
    }

    /// All five bits, the `*` value
    pub fn all() -> Self {
        AccessOps(OP_ALL)
    }

    /// Parse a space-separated token list. `*` sets every bit, `write`
    /// sets create, update, and delete; unrecognised tokens are ignored.
    pub fn parse(tokens: &str) -> Self {
        let mut bits = 0;
        for token in tokens.split_whitespace() {
            bits |= match token {
                "*" => OP_ALL,
                "create" => OP_CREATE,
                "read" => OP_READ,
                "update" => OP_UPDATE,
                "delete" => OP_DELETE,
                "exec" => OP_EXEC,
                "write" => OP_CREATE | OP_UPDATE | OP_DELETE,
                _ => 0,
            };
        }
        AccessOps(bits)
    }

    /// True iff no bit is set
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Exact bit membership of the requested mode
    pub fn permits(self, mode: AccessMode) -> bool {
        let bit = match mode {
            AccessMode::Create => OP_CREATE,
            AccessMode::Read => OP_READ,
            AccessMode::Update => OP_UPDATE,
            AccessMode::Delete => OP_DELETE,
            AccessMode::Exec => OP_EXEC,
        };
        self.0 & bit != 0
    }
}

impl fmt::Display for AccessOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == OP_ALL {
            return f.write_str("*");
        }
        let mut first = true;
        for mode in [
            AccessMode::Create,
            AccessMode::Read,
            AccessMode::Update,
            AccessMode::Delete,
            AccessMode::Exec,
        ] {
            if self.permits(mode) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(mode.as_str())?;
                first = false;
            }
        }
        Ok(())
    }
}

impl Serialize for AccessOps {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccessOps {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tokens = String::deserialize(deserializer)?;
        Ok(AccessOps::parse(&tokens))
    }
}

/// A rule's `path` leaf together with the namespace context of the element
/// that carried it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathExpr {
    /// Raw instance-identifier expression
    pub expr: String,
    /// Local namespace context for prefix resolution
    pub nsctx: NamespaceContext,
}

/// Rule type: at most one of rpc-name, path, or notification-name.
///
/// A rule with none of the three is [`RuleType::Any`] and applies to any
/// target of a matching access operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleType {
    #[default]
    Any,
    /// Protocol-operation rule; `*` matches any operation
    Rpc(String),
    /// Data-node rule
    DataPath(PathExpr),
    /// Notification rule; carried in the model but never evaluated here
    Notification(String),
}

/// One access control rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    /// Module pattern; `*` matches any module. A rule without a
    /// module-name matches nothing in the RPC and data-node passes.
    #[serde(default)]
    pub module_name: Option<String>,
    #[serde(default)]
    pub rule_type: RuleType,
    #[serde(default)]
    pub access: AccessOps,
    pub action: Action,
}

/// Ordered rules applying to a set of groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleList {
    pub name: String,
    /// Group names; the rule-list applies when any of them is one of the
    /// requesting user's groups
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// A named group of users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub user_names: Vec<String>,
}

/// An NACM policy document, order-preserving
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub enable_nacm: bool,
    #[serde(default)]
    pub read_default: Option<Action>,
    #[serde(default)]
    pub write_default: Option<Action>,
    #[serde(default)]
    pub exec_default: Option<Action>,
    #[serde(default)]
    pub enable_external_groups: bool,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub rule_lists: Vec<RuleList>,
}

/// Policy-mode selector held by the surrounding service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyMode {
    Disabled,
    Internal,
    External,
}

impl FromStr for PolicyMode {
    type Err = PolicyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "disabled" => Ok(PolicyMode::Disabled),
            "internal" => Ok(PolicyMode::Internal),
            "external" => Ok(PolicyMode::External),
            other => Err(PolicyError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolicyMode::Disabled => "disabled",
            PolicyMode::Internal => "internal",
            PolicyMode::External => "external",
        })
    }
}

/// Outcome of an RPC or write evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Permit,
    Deny(AccessDenied),
}

impl Verdict {
    /// True iff access was permitted
    pub fn is_permit(&self) -> bool {
        matches!(self, Verdict::Permit)
    }

    /// True iff access was denied
    pub fn is_deny(&self) -> bool {
        matches!(self, Verdict::Deny(_))
    }

    /// The deny message, if denied
    pub fn deny_message(&self) -> Option<&str> {
        match self {
            Verdict::Deny(payload) => Some(&payload.message),
            Verdict::Permit => None,
        }
    }
}
