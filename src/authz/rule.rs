use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use super::action::Action;
use super::predicate::Predicate;
use super::resource::ResourceKind;
use crate::errors::{AppError, AppResult};

/// Stable rule identifier, reported in decisions and audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RuleId(pub &'static str);

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub id: RuleId,
    pub action: Action,
    pub predicate: Predicate,
}

/// Ordered allow rules for one resource kind. For a given action the rules
/// are OR-ed in declaration order and the first match wins.
#[derive(Debug, Clone, Serialize)]
pub struct RuleTable {
    pub kind: ResourceKind,
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind, rules: Vec::new() }
    }

    pub fn allow(mut self, action: Action, id: &'static str, predicate: Predicate) -> Self {
        self.rules.push(Rule { id: RuleId(id), action, predicate });
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rules_for(&self, action: Action) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |rule| rule.action == action)
    }

    /// The closed set of actions this kind understands.
    pub fn actions(&self) -> BTreeSet<Action> {
        self.rules.iter().map(|rule| rule.action).collect()
    }

    pub fn supports(&self, action: Action) -> bool {
        self.rules.iter().any(|rule| rule.action == action)
    }

    pub fn parent_depth(&self, action: Action) -> usize {
        self.rules_for(action)
            .map(|rule| rule.predicate.parent_depth())
            .max()
            .unwrap_or(0)
    }

    pub fn status_levels(&self, action: Action) -> BTreeSet<usize> {
        let mut levels = BTreeSet::new();
        for rule in self.rules_for(action) {
            rule.predicate.status_levels(0, &mut levels);
        }
        levels
    }

    /// Static sanity checks run when a rule book is assembled.
    pub fn validate(&self) -> AppResult<()> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id) {
                return Err(AppError::internal(format!("duplicate rule id {} in {} table", rule.id, self.kind)));
            }
            if rule.action.is_collection() && rule.predicate.needs_instance() {
                return Err(AppError::internal(format!(
                    "collection rule {} reads a resource instance",
                    rule.id
                )));
            }
        }
        Ok(())
    }
}

/// One rule table per resource kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleBook {
    tables: BTreeMap<ResourceKind, RuleTable>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the table for `table.kind`.
    pub fn insert(&mut self, table: RuleTable) -> AppResult<()> {
        table.validate()?;
        self.tables.insert(table.kind, table);
        Ok(())
    }

    /// Builder form for compiled-in tables; checked by [`validate`](Self::validate) in tests.
    pub(crate) fn with_table(mut self, table: RuleTable) -> Self {
        self.tables.insert(table.kind, table);
        self
    }

    pub fn validate(&self) -> AppResult<()> {
        self.tables.values().try_for_each(RuleTable::validate)
    }

    pub fn table(&self, kind: ResourceKind) -> Option<&RuleTable> {
        self.tables.get(&kind)
    }

    pub fn tables(&self) -> impl Iterator<Item = &RuleTable> {
        self.tables.values()
    }
}
