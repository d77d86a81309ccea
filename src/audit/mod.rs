//! Decision records and the sinks that receive them.
//!
//! The engine itself stays side-effect free. Callers build a
//! [`DecisionRecord`] from the returned [`Decision`] and hand it to a sink.
//! Persistence of the records is left to the sink's owner.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub mod severity;
pub use severity::Severity;

use crate::authz::{Action, Actor, ActorId, Decision, ResourceKind, TenantId};
use crate::errors::{AppError, AppResult};

/// One audited authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub actor_id: ActorId,
    pub tenant_id: Option<TenantId>,
    pub action: Action,
    pub resource_kind: ResourceKind,
    pub resource_id: Option<Uuid>,
    pub allowed: bool,
    pub matched_rule: Option<String>,
    pub deny_reason: Option<String>,
    pub severity: Severity,
    pub occurred_at: DateTime<Utc>,
    /// Set by [`ChainedAuditSink`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl DecisionRecord {
    pub fn new(
        actor: &Actor,
        action: Action,
        resource_kind: ResourceKind,
        resource_id: Option<Uuid>,
        decision: &Decision,
    ) -> Self {
        Self {
            actor_id: actor.actor_id,
            tenant_id: actor.tenant_id,
            action,
            resource_kind,
            resource_id,
            allowed: decision.allowed,
            matched_rule: decision.matched_rule.map(|rule| rule.as_str().to_string()),
            deny_reason: decision.reason.map(|reason| reason.as_str().to_string()),
            severity: Severity::for_decision(decision),
            occurred_at: Utc::now(),
            prev_hash: None,
            hash: None,
        }
    }

    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }

    /// SHA256(prev_hash || json(record without hashes)), hex encoded.
    pub fn chain_hash(&self, prev_hash: Option<&str>) -> AppResult<String> {
        let mut unchained = self.clone();
        unchained.prev_hash = None;
        unchained.hash = None;
        let payload = serde_json::to_string(&unchained)
            .map_err(|err| AppError::internal(format!("failed to encode decision record: {err}")))?;

        let mut hasher = Sha256::new();
        if let Some(prev) = prev_hash {
            hasher.update(prev.as_bytes());
        }
        hasher.update(payload.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Receives decision records. Sinks must not fail the request on their own
/// errors; the caller decides whether an `Err` is fatal.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: DecisionRecord) -> AppResult<()>;
}

/// Emits each record as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: DecisionRecord) -> AppResult<()> {
        let matched_rule = record.matched_rule.as_deref().unwrap_or("-");
        let deny_reason = record.deny_reason.as_deref().unwrap_or("-");
        let resource_id = record.resource_id.map(|id| id.to_string()).unwrap_or_default();

        match record.severity {
            Severity::Critical => tracing::warn!(
                target: "site_authz::audit",
                actor_id = %record.actor_id,
                action = %record.action,
                resource_kind = %record.resource_kind,
                resource_id = %resource_id,
                deny_reason,
                severity = record.severity.as_str(),
                "authorization denied"
            ),
            _ => tracing::info!(
                target: "site_authz::audit",
                actor_id = %record.actor_id,
                action = %record.action,
                resource_kind = %record.resource_kind,
                resource_id = %resource_id,
                allowed = record.allowed,
                matched_rule,
                deny_reason,
                severity = record.severity.as_str(),
                "authorization decision"
            ),
        }
        Ok(())
    }
}

/// Keeps records in memory, mostly for tests.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    records: Mutex<Vec<DecisionRecord>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DecisionRecord> {
        self.records.lock().map(|records| records.clone()).unwrap_or_default()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, record: DecisionRecord) -> AppResult<()> {
        self.records
            .lock()
            .map_err(|_| AppError::internal("audit buffer poisoned"))?
            .push(record);
        Ok(())
    }
}

/// Stamps every record with the hash of its predecessor before forwarding
/// it, so edits to a stored trail break the chain.
#[derive(Debug)]
pub struct ChainedAuditSink<S> {
    inner: S,
    last_hash: Mutex<Option<String>>,
}

impl<S: AuditSink> ChainedAuditSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, last_hash: Mutex::new(None) }
    }

    /// Continues a chain whose last stored hash is `last_hash`.
    pub fn resume(inner: S, last_hash: impl Into<String>) -> Self {
        Self { inner, last_hash: Mutex::new(Some(last_hash.into())) }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: AuditSink> AuditSink for ChainedAuditSink<S> {
    fn record(&self, mut record: DecisionRecord) -> AppResult<()> {
        let mut last = self
            .last_hash
            .lock()
            .map_err(|_| AppError::internal("audit chain poisoned"))?;

        let hash = record.chain_hash(last.as_deref())?;
        record.prev_hash = last.clone();
        record.hash = Some(hash.clone());

        self.inner.record(record)?;
        *last = Some(hash);
        Ok(())
    }
}

/// Index of the first record whose hash or back link does not match.
///
/// `anchor` is the hash the first record must link back to: `None` for a
/// chain that starts at the genesis record, or the last hash of the
/// preceding segment when checking a tail.
pub fn verify_chain(records: &[DecisionRecord], anchor: Option<&str>) -> AppResult<Option<usize>> {
    let mut prev = anchor;
    for (index, record) in records.iter().enumerate() {
        if record.prev_hash.as_deref() != prev {
            return Ok(Some(index));
        }
        let expected = record.chain_hash(record.prev_hash.as_deref())?;
        if record.hash.as_deref() != Some(expected.as_str()) {
            return Ok(Some(index));
        }
        prev = record.hash.as_deref();
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::{DenyReason, Role, RuleId};

    fn record(allowed: bool) -> DecisionRecord {
        let actor = Actor::new(ActorId::new(), Some(TenantId::new())).with_roles([Role::Member]);
        let decision = if allowed {
            Decision::allow(RuleId("task.view.member"))
        } else {
            Decision::deny(DenyReason::NoMatchingRule)
        };
        DecisionRecord::new(&actor, Action::View, ResourceKind::Task, Some(Uuid::new_v4()), &decision)
    }

    #[test]
    fn record_carries_the_decision() {
        let allow = record(true);
        assert!(allow.allowed);
        assert_eq!(allow.matched_rule.as_deref(), Some("task.view.member"));
        assert_eq!(allow.severity, Severity::Noise);

        let deny = record(false);
        assert_eq!(deny.deny_reason.as_deref(), Some("no-matching-rule"));
        assert_eq!(deny.severity, Severity::Important);
    }

    #[test]
    fn chained_sink_links_records() {
        let sink = ChainedAuditSink::new(InMemoryAuditSink::new());
        for allowed in [true, false, true] {
            sink.record(record(allowed)).unwrap();
        }

        let records = sink.inner().records();
        assert_eq!(records.len(), 3);
        assert!(records[0].prev_hash.is_none());
        assert_eq!(records[1].prev_hash, records[0].hash);
        assert_eq!(verify_chain(&records, None).unwrap(), None);
        assert_eq!(verify_chain(&records[1..], records[0].hash.as_deref()).unwrap(), None);
    }

    #[test]
    fn tampering_breaks_the_chain() {
        let sink = ChainedAuditSink::new(InMemoryAuditSink::new());
        for allowed in [false, false, true] {
            sink.record(record(allowed)).unwrap();
        }

        let mut records = sink.inner().records();
        records[1].allowed = true;
        assert_eq!(verify_chain(&records, None).unwrap(), Some(1));

        let mut records = sink.inner().records();
        records.remove(1);
        assert_eq!(verify_chain(&records, None).unwrap(), Some(1));
    }

    #[test]
    fn dropping_the_head_breaks_the_chain() {
        let sink = ChainedAuditSink::new(InMemoryAuditSink::new());
        for allowed in [true, false, true] {
            sink.record(record(allowed)).unwrap();
        }

        let records = sink.inner().records();
        assert_eq!(verify_chain(&records[1..], None).unwrap(), Some(0));
        assert_eq!(verify_chain(&records[2..], records[0].hash.as_deref()).unwrap(), Some(0));
    }

    #[test]
    fn resumed_chain_verifies_against_its_anchor() {
        let sink = ChainedAuditSink::resume(InMemoryAuditSink::new(), "f00d");
        sink.record(record(false)).unwrap();
        sink.record(record(true)).unwrap();

        let records = sink.inner().records();
        assert_eq!(verify_chain(&records, Some("f00d")).unwrap(), None);
        assert_eq!(verify_chain(&records, None).unwrap(), Some(0));
    }

    #[test]
    fn tracing_sink_accepts_every_severity() {
        let sink = TracingAuditSink;
        sink.record(record(true)).unwrap();
        sink.record(record(false)).unwrap();
    }
}
