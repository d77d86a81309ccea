use std::fmt;

use serde::Serialize;

use super::rule::RuleId;

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    NoTenant,
    ResourceNoTenant,
    TenantMismatch,
    ParentTenantMismatch,
    NoMatchingRule,
    /// The input broke the engine's contract (malformed resource, unresolved
    /// parent, undefined action). Always denied.
    ContractViolation,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NoTenant => "no-tenant",
            DenyReason::ResourceNoTenant => "resource-no-tenant",
            DenyReason::TenantMismatch => "tenant-mismatch",
            DenyReason::ParentTenantMismatch => "parent-tenant-mismatch",
            DenyReason::NoMatchingRule => "no-matching-rule",
            DenyReason::ContractViolation => "contract-violation",
        }
    }

    /// Denials that point at a tenant boundary or a broken integration.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            DenyReason::TenantMismatch | DenyReason::ParentTenantMismatch | DenyReason::ContractViolation
        )
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<RuleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl Decision {
    pub fn allow(rule: RuleId) -> Self {
        Self { allowed: true, matched_rule: Some(rule), reason: None }
    }

    pub fn deny(reason: DenyReason) -> Self {
        Self { allowed: false, matched_rule: None, reason: Some(reason) }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn is_denied(&self) -> bool {
        !self.allowed
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.allowed, self.matched_rule, self.reason) {
            (true, Some(rule), _) => write!(f, "allow ({rule})"),
            (true, None, _) => f.write_str("allow"),
            (false, _, Some(reason)) => write!(f, "deny ({reason})"),
            (false, _, None) => f.write_str("deny"),
        }
    }
}
