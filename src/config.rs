use crate::errors::AppError;

/// How terminal statuses gate updates on change requests, RFIs and NCRs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateGateMode {
    /// Creators and project managers are both blocked once a record reaches a
    /// terminal status; only admin-tier roles may still update it.
    #[default]
    Strict,
    /// The `project_manager` role or the `project.update` permission also
    /// reaches records in terminal status.
    Permissive,
}

/// What the engine does with a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContractMode {
    /// Log at error level and deny.
    #[default]
    FailClosed,
    /// Panic. Meant for development and test builds.
    Fatal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthzConfig {
    pub state_gate: StateGateMode,
    pub contract_mode: ContractMode,
}

impl AuthzConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let state_gate = match lookup("AUTHZ_STATE_GATE").unwrap_or_default().trim().to_lowercase().as_str() {
            "" | "strict" => StateGateMode::Strict,
            "permissive" => StateGateMode::Permissive,
            other => {
                return Err(AppError::configuration(format!(
                    "AUTHZ_STATE_GATE must be 'strict' or 'permissive', got '{other}'"
                )))
            }
        };

        let contract_mode = match lookup("AUTHZ_CONTRACT_MODE").unwrap_or_default().trim().to_lowercase().as_str() {
            "" | "fail_closed" => ContractMode::FailClosed,
            "fatal" => ContractMode::Fatal,
            other => {
                return Err(AppError::configuration(format!(
                    "AUTHZ_CONTRACT_MODE must be 'fail_closed' or 'fatal', got '{other}'"
                )))
            }
        };

        Ok(Self { state_gate, contract_mode })
    }

    pub fn with_state_gate(mut self, mode: StateGateMode) -> Self {
        self.state_gate = mode;
        self
    }

    pub fn with_contract_mode(mut self, mode: ContractMode) -> Self {
        self.contract_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_strict_and_fail_closed() {
        let config = AuthzConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.state_gate, StateGateMode::Strict);
        assert_eq!(config.contract_mode, ContractMode::FailClosed);
    }

    #[test]
    fn parses_values_case_insensitively() {
        let config = AuthzConfig::from_lookup(lookup(&[
            ("AUTHZ_STATE_GATE", "Permissive"),
            ("AUTHZ_CONTRACT_MODE", " FATAL "),
        ]))
        .unwrap();
        assert_eq!(config.state_gate, StateGateMode::Permissive);
        assert_eq!(config.contract_mode, ContractMode::Fatal);
    }

    #[test]
    fn rejects_unknown_values() {
        let err = AuthzConfig::from_lookup(lookup(&[("AUTHZ_STATE_GATE", "lenient")])).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
