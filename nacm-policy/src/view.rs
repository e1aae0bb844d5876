//! Policy View: read-only queries over a policy document
//!
//! The view projects a borrowed [`Policy`] into exactly the queries the
//! evaluators need, together with the recovery-user name the surrounding
//! service is configured with. It materialises nothing.

use crate::error::{PolicyError, Result};
use crate::types::{Action, Policy, RuleList};

/// Read-only projection of a policy document
#[derive(Debug, Clone, Copy)]
pub struct PolicyView<'a> {
    policy: &'a Policy,
    recovery_user: &'a str,
}

impl<'a> PolicyView<'a> {
    /// Wrap a policy with the configured recovery user
    pub fn new(policy: &'a Policy, recovery_user: &'a str) -> Self {
        PolicyView {
            policy,
            recovery_user,
        }
    }

    /// True iff `enable-nacm` is set
    pub fn enabled(&self) -> bool {
        self.policy.enable_nacm
    }

    /// True iff `user` is the configured recovery user
    pub fn is_recovery(&self, user: &str) -> bool {
        self.recovery_user == user
    }

    /// `read-default`; absent means permit
    pub fn read_default(&self) -> Action {
        self.policy.read_default.unwrap_or(Action::Permit)
    }

    /// `exec-default`; absent means permit
    pub fn exec_default(&self) -> Action {
        self.policy.exec_default.unwrap_or(Action::Permit)
    }

    /// `write-default`; absence is a configuration fault
    pub fn write_default(&self) -> Result<Action> {
        self.policy
            .write_default
            .ok_or(PolicyError::MissingWriteDefault)
    }

    /// Names of the groups containing `user`, in document order. When
    /// `enable-external-groups` is set, transport-provided names are
    /// appended after the policy's own groups.
    pub fn groups_for<'b>(&self, user: &str, external: &'b [String]) -> Vec<&'b str>
    where
        'a: 'b,
    {
        let mut names: Vec<&'b str> = self
            .policy
            .groups
            .iter()
            .filter(|g| g.user_names.iter().any(|u| u == user))
            .map(|g| g.name.as_str())
            .collect();
        if self.policy.enable_external_groups {
            names.extend(external.iter().map(String::as_str));
        }
        names
    }

    /// Rule-lists in document order
    pub fn rule_lists(&self) -> &'a [RuleList] {
        &self.policy.rule_lists
    }
}
