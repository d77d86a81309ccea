//! One-shot decision requests, as read by the `check` command.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::DecisionRecord;
use crate::authz::{Action, Actor, Decision, DenyReason, ParentResolver, PolicyEngine, Resource, ResourceKind, ResourceRef};
use crate::errors::{AppError, AppResult};

/// `{actor, action, resource}` for an instance check or
/// `{actor, action, kind}` for a collection check. `parents` feeds lazily
/// referenced parents by id.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckRequest {
    pub actor: Actor,
    pub action: Action,
    #[serde(default)]
    pub resource: Option<Resource>,
    #[serde(default)]
    pub kind: Option<ResourceKind>,
    #[serde(default)]
    pub parents: Vec<Resource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub decision: Decision,
    pub record: DecisionRecord,
}

impl CheckOutcome {
    /// Process exit status: 0 allow, 1 deny, 2 contract violation.
    pub fn exit_code(&self) -> i32 {
        match self.decision.reason {
            None => 0,
            Some(DenyReason::ContractViolation) => 2,
            Some(_) => 1,
        }
    }
}

/// Parents supplied alongside a request.
#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    by_id: HashMap<Uuid, Resource>,
}

impl ResourceIndex {
    pub fn new(resources: impl IntoIterator<Item = Resource>) -> AppResult<Self> {
        let mut by_id = HashMap::new();
        for resource in resources {
            let id = resource
                .id
                .ok_or_else(|| AppError::malformed(format!("supplied parent {} has no id", resource.label())))?;
            by_id.insert(id, resource);
        }
        Ok(Self { by_id })
    }
}

impl ParentResolver for ResourceIndex {
    fn resolve(&self, parent: &ResourceRef) -> AppResult<Option<Resource>> {
        Ok(self.by_id.get(&parent.id).cloned())
    }
}

/// Parses a request, reporting the JSON path of the first bad field.
pub fn parse_request(input: &str) -> AppResult<CheckRequest> {
    let mut de = serde_json::Deserializer::from_str(input);
    serde_path_to_error::deserialize(&mut de)
        .map_err(|err| AppError::malformed(format!("invalid request at {}: {}", err.path(), err.inner())))
}

pub fn run_check(engine: &PolicyEngine, request: CheckRequest) -> AppResult<CheckOutcome> {
    let CheckRequest { actor, action, resource, kind, parents } = request;

    let (decision, kind, resource_id) = match (resource, kind) {
        (Some(resource), None) => {
            let index = ResourceIndex::new(parents)?;
            let decision = engine.decide_with(&actor, action, &resource, &index);
            (decision, resource.kind, resource.id)
        }
        (None, Some(kind)) => (engine.decide_kind(&actor, action, kind), kind, None),
        _ => return Err(AppError::malformed("request needs exactly one of `resource` or `kind`")),
    };

    let record = DecisionRecord::new(&actor, action, kind, resource_id, &decision);
    Ok(CheckOutcome { decision, record })
}
