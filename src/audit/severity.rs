use serde::{Deserialize, Serialize};

use crate::authz::Decision;

/// Severity levels for decision records.
/// Controls retention policies and log filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cross-tenant attempts and contract violations: never auto-delete
    Critical,
    /// Ordinary denials (default)
    #[default]
    Important,
    /// Allows: aggressively trimmed
    Noise,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Important => "important",
            Severity::Noise => "noise",
        }
    }

    pub fn for_decision(decision: &Decision) -> Self {
        match decision.reason {
            _ if decision.allowed => Severity::Noise,
            Some(reason) if reason.is_critical() => Severity::Critical,
            _ => Severity::Important,
        }
    }
}
