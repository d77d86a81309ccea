use std::borrow::Cow;

use super::action::Action;
use super::actor::Actor;
use super::decision::{Decision, DenyReason};
use super::resource::{Parent, Resource, ResourceKind, ResourceRef};
use super::rule::{RuleBook, RuleTable};
use super::tables;
use crate::config::{AuthzConfig, ContractMode};
use crate::errors::{AppError, AppResult};

/// Loads a parent record the caller did not join eagerly.
///
/// Lookups are synchronous: the engine never awaits. Callers backed by an
/// async store should preload the chain and pass `Parent::Loaded` instead.
pub trait ParentResolver: Send + Sync {
    fn resolve(&self, parent: &ResourceRef) -> AppResult<Option<Resource>>;
}

/// Resolver for callers that always join parents eagerly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParentResolver;

impl ParentResolver for NoParentResolver {
    fn resolve(&self, _parent: &ResourceRef) -> AppResult<Option<Resource>> {
        Ok(None)
    }
}

/// Tenant-scoped policy engine.
///
/// Evaluation order:
/// 1. tenant gate on the actor and the resource -> deny
/// 2. action not defined for the kind -> contract violation
/// 3. parent chain resolved and checked against the actor's tenant -> deny
/// 4. rules of the resource kind for the action, first match -> allow
/// 5. deny
///
/// The engine holds only immutable tables, so one instance can be shared
/// across threads and requests.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    rules: RuleBook,
    config: AuthzConfig,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(AuthzConfig::default())
    }
}

impl PolicyEngine {
    pub fn new(config: AuthzConfig) -> Self {
        Self {
            rules: tables::standard(config.state_gate),
            config,
        }
    }

    pub fn with_rules(rules: RuleBook, config: AuthzConfig) -> Self {
        Self { rules, config }
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn config(&self) -> &AuthzConfig {
        &self.config
    }

    /// Instance-level check. Contract violations are handled per
    /// [`ContractMode`]; the result is never an allow in that case.
    pub fn decide(&self, actor: &Actor, action: Action, resource: &Resource) -> Decision {
        self.decide_with(actor, action, resource, &NoParentResolver)
    }

    pub fn decide_with(
        &self,
        actor: &Actor,
        action: Action,
        resource: &Resource,
        parents: &dyn ParentResolver,
    ) -> Decision {
        let outcome = self.try_decide_with(actor, action, resource, parents);
        self.settle(actor, action, resource.kind, outcome)
    }

    /// Collection-level check (`viewAny`, `create`) where no instance exists yet.
    pub fn decide_kind(&self, actor: &Actor, action: Action, kind: ResourceKind) -> Decision {
        let outcome = self.try_decide_kind(actor, action, kind);
        self.settle(actor, action, kind, outcome)
    }

    pub fn try_decide(&self, actor: &Actor, action: Action, resource: &Resource) -> AppResult<Decision> {
        self.try_decide_with(actor, action, resource, &NoParentResolver)
    }

    pub fn try_decide_with(
        &self,
        actor: &Actor,
        action: Action,
        resource: &Resource,
        parents: &dyn ParentResolver,
    ) -> AppResult<Decision> {
        if let Some(reason) = tenant_gate(actor, resource) {
            return Ok(Decision::deny(reason));
        }
        let table = self.table_for(resource.kind, action)?;

        let chain = resolve_chain(resource, table.parent_depth(action), parents)?;
        if !ancestors_in_tenant(actor, &chain) {
            return Ok(Decision::deny(DenyReason::ParentTenantMismatch));
        }

        for level in table.status_levels(action) {
            if chain[level].status.is_none() {
                return Err(AppError::malformed(format!(
                    "{} needs a status to check {}",
                    chain[level].label(),
                    action
                )));
            }
        }

        evaluate(table, actor, action, &chain)
    }

    pub fn try_decide_kind(&self, actor: &Actor, action: Action, kind: ResourceKind) -> AppResult<Decision> {
        if actor.tenant_id.is_none() {
            return Ok(Decision::deny(DenyReason::NoTenant));
        }
        if !action.is_collection() {
            return Err(AppError::malformed(format!("{action} on {kind} needs a resource instance")));
        }
        let table = self.table_for(kind, action)?;

        evaluate(table, actor, action, &[])
    }

    fn table_for(&self, kind: ResourceKind, action: Action) -> AppResult<&RuleTable> {
        let table = self
            .rules
            .table(kind)
            .ok_or_else(|| AppError::malformed(format!("no rule table for {kind}")))?;
        if !table.supports(action) {
            return Err(AppError::malformed(format!("{action} is not defined for {kind}")));
        }
        Ok(table)
    }

    fn settle(&self, actor: &Actor, action: Action, kind: ResourceKind, outcome: AppResult<Decision>) -> Decision {
        match outcome {
            Ok(decision) => {
                tracing::debug!(
                    actor_id = %actor.actor_id,
                    action = %action,
                    kind = %kind,
                    decision = %decision,
                    "authorization decision"
                );
                decision
            }
            Err(err) => match self.config.contract_mode {
                ContractMode::Fatal => panic!("authorization contract violation: {err}"),
                ContractMode::FailClosed => {
                    tracing::error!(
                        actor_id = %actor.actor_id,
                        action = %action,
                        kind = %kind,
                        error = %err,
                        "authorization contract violation, denying"
                    );
                    Decision::deny(DenyReason::ContractViolation)
                }
            },
        }
    }
}

fn tenant_gate(actor: &Actor, resource: &Resource) -> Option<DenyReason> {
    let Some(actor_tenant) = actor.tenant_id else {
        return Some(DenyReason::NoTenant);
    };
    match resource.tenant_id {
        None => Some(DenyReason::ResourceNoTenant),
        Some(tenant) if tenant != actor_tenant => Some(DenyReason::TenantMismatch),
        Some(_) => None,
    }
}

fn evaluate(table: &RuleTable, actor: &Actor, action: Action, chain: &[Cow<'_, Resource>]) -> AppResult<Decision> {
    for rule in table.rules_for(action) {
        if rule.predicate.evaluate(actor, chain, 0)? {
            return Ok(Decision::allow(rule.id));
        }
    }
    Ok(Decision::deny(DenyReason::NoMatchingRule))
}

/// Walks `depth` parent links up from `resource`, borrowing eagerly joined
/// parents and asking `parents` for references. Every hop must land on the
/// kind [`ResourceKind::parent_kind`] names for the child.
fn resolve_chain<'r>(
    resource: &'r Resource,
    depth: usize,
    parents: &dyn ParentResolver,
) -> AppResult<Vec<Cow<'r, Resource>>> {
    let mut chain: Vec<Cow<'r, Resource>> = Vec::with_capacity(depth + 1);
    chain.push(Cow::Borrowed(resource));

    while chain.len() <= depth {
        let Some(current) = chain.last() else { break };
        let expected = current
            .kind
            .parent_kind()
            .ok_or_else(|| AppError::malformed(format!("{} cannot have a parent", current.label())))?;
        let next: Cow<'r, Resource> = match current {
            Cow::Borrowed(node) => {
                let node: &'r Resource = *node;
                match &node.parent {
                    Some(Parent::Loaded(parent)) => Cow::Borrowed(parent.as_ref()),
                    Some(Parent::Reference(link)) => Cow::Owned(fetch_parent(link, expected, parents)?),
                    None => return Err(missing_parent(node)),
                }
            }
            Cow::Owned(node) => match &node.parent {
                Some(Parent::Loaded(parent)) => Cow::Owned(parent.as_ref().clone()),
                Some(Parent::Reference(link)) => Cow::Owned(fetch_parent(link, expected, parents)?),
                None => return Err(missing_parent(node)),
            },
        };
        if next.kind != expected {
            return Err(AppError::malformed(format!(
                "parent of {} is a {}, expected a {expected}",
                current.label(),
                next.kind
            )));
        }
        chain.push(next);
    }

    Ok(chain)
}

fn fetch_parent(link: &ResourceRef, expected: ResourceKind, parents: &dyn ParentResolver) -> AppResult<Resource> {
    if link.kind != expected {
        return Err(AppError::malformed(format!("parent {link} should be a {expected}")));
    }
    match parents.resolve(link) {
        Ok(Some(parent)) if parent.kind == link.kind => Ok(parent),
        Ok(Some(parent)) => Err(AppError::malformed(format!(
            "parent {link} resolved to a {}",
            parent.kind
        ))),
        Ok(None) => Err(AppError::unresolved_parent(format!("{link} could not be resolved"))),
        Err(err) => Err(AppError::unresolved_parent(format!("{link}: {err}"))),
    }
}

fn missing_parent(node: &Resource) -> AppError {
    AppError::malformed(format!("{} has no parent link", node.label()))
}

/// Every resolved or eagerly joined ancestor must sit in the actor's tenant.
fn ancestors_in_tenant(actor: &Actor, chain: &[Cow<'_, Resource>]) -> bool {
    let Some(tenant) = actor.tenant_id else {
        return false;
    };
    if chain.iter().skip(1).any(|node| node.tenant_id != Some(tenant)) {
        return false;
    }

    let mut cursor = chain.last().and_then(|node| loaded_parent(node));
    while let Some(node) = cursor {
        if node.tenant_id != Some(tenant) {
            return false;
        }
        cursor = loaded_parent(node);
    }
    true
}

fn loaded_parent(node: &Resource) -> Option<&Resource> {
    match &node.parent {
        Some(Parent::Loaded(parent)) => Some(parent.as_ref()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::actor::{ActorId, Role, TenantId};
    use crate::authz::resource::Status;
    use std::collections::HashMap;
    use uuid::Uuid;

    struct MapResolver(HashMap<Uuid, Resource>);

    impl ParentResolver for MapResolver {
        fn resolve(&self, parent: &ResourceRef) -> AppResult<Option<Resource>> {
            Ok(self.0.get(&parent.id).cloned())
        }
    }

    struct FailingResolver;

    impl ParentResolver for FailingResolver {
        fn resolve(&self, _parent: &ResourceRef) -> AppResult<Option<Resource>> {
            Err(AppError::internal("store offline"))
        }
    }

    fn member(tenant: TenantId) -> Actor {
        Actor::new(ActorId::new(), Some(tenant)).with_roles([Role::Member])
    }

    fn inspection_under(plan: Resource, tenant: TenantId) -> Resource {
        Resource::new(ResourceKind::QcInspection, Some(tenant))
            .with_status(Status::InProgress)
            .with_parent(plan)
    }

    fn plan_under_project(tenant: TenantId, project_tenant: TenantId) -> Resource {
        let project = Resource::new(ResourceKind::Project, Some(project_tenant)).with_id(Uuid::new_v4());
        Resource::new(ResourceKind::QcPlan, Some(tenant)).with_id(Uuid::new_v4()).with_parent(project)
    }

    #[test]
    fn tenant_gate_reasons() {
        let engine = PolicyEngine::default();
        let tenant = TenantId::new();
        let task = Resource::new(ResourceKind::Task, Some(tenant));

        let homeless = Actor::new(ActorId::new(), None).with_roles([Role::SuperAdmin]);
        assert_eq!(engine.decide(&homeless, Action::View, &task).reason, Some(DenyReason::NoTenant));

        let orphan = Resource::new(ResourceKind::Task, None);
        assert_eq!(
            engine.decide(&member(tenant), Action::View, &orphan).reason,
            Some(DenyReason::ResourceNoTenant)
        );

        let outsider = Actor::new(ActorId::new(), Some(TenantId::new())).with_roles([Role::SuperAdmin]);
        assert_eq!(
            engine.decide(&outsider, Action::View, &task).reason,
            Some(DenyReason::TenantMismatch)
        );
    }

    #[test]
    fn undefined_action_is_a_contract_error() {
        let engine = PolicyEngine::default();
        let tenant = TenantId::new();
        let notification = Resource::new(ResourceKind::Notification, Some(tenant));

        let err = engine.try_decide(&member(tenant), Action::Approve, &notification).unwrap_err();
        assert!(matches!(err, AppError::MalformedResource(_)));

        let decision = engine.decide(&member(tenant), Action::Approve, &notification);
        assert_eq!(decision.reason, Some(DenyReason::ContractViolation));
    }

    #[test]
    fn decide_kind_rejects_instance_actions() {
        let engine = PolicyEngine::default();
        let err = engine
            .try_decide_kind(&member(TenantId::new()), Action::Update, ResourceKind::Task)
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedResource(_)));
    }

    #[test]
    fn decide_kind_requires_a_tenant() {
        let engine = PolicyEngine::default();
        let actor = Actor::new(ActorId::new(), None);
        let decision = engine.decide_kind(&actor, Action::Create, ResourceKind::Task);
        assert_eq!(decision.reason, Some(DenyReason::NoTenant));
    }

    #[test]
    fn eager_parent_chain_is_gated_by_tenant() {
        let engine = PolicyEngine::default();
        let tenant = TenantId::new();
        let inspection = inspection_under(plan_under_project(tenant, tenant), tenant);
        assert!(engine.decide(&member(tenant), Action::View, &inspection).is_allowed());

        let foreign_project = inspection_under(plan_under_project(tenant, TenantId::new()), tenant);
        assert_eq!(
            engine.decide(&member(tenant), Action::View, &foreign_project).reason,
            Some(DenyReason::ParentTenantMismatch)
        );
    }

    #[test]
    fn lazy_parent_is_resolved_through_the_accessor() {
        let engine = PolicyEngine::default();
        let tenant = TenantId::new();
        let plan = plan_under_project(tenant, tenant);
        let plan_id = plan.id.unwrap();
        let resolver = MapResolver(HashMap::from([(plan_id, plan)]));

        let inspection = Resource::new(ResourceKind::QcInspection, Some(tenant))
            .with_status(Status::InProgress)
            .with_parent_ref(ResourceKind::QcPlan, plan_id);

        let decision = engine.try_decide_with(&member(tenant), Action::View, &inspection, &resolver).unwrap();
        assert!(decision.is_allowed());
    }

    #[test]
    fn unresolved_parent_never_allows() {
        let engine = PolicyEngine::default();
        let tenant = TenantId::new();
        let creator = member(tenant);
        let inspection = Resource::new(ResourceKind::QcInspection, Some(tenant))
            .with_creator(creator.actor_id)
            .with_status(Status::InProgress)
            .with_parent_ref(ResourceKind::QcPlan, Uuid::new_v4());

        let err = engine.try_decide(&creator, Action::View, &inspection).unwrap_err();
        assert!(matches!(err, AppError::UnresolvedParent(_)));

        let err = engine
            .try_decide_with(&creator, Action::View, &inspection, &FailingResolver)
            .unwrap_err();
        assert!(err.to_string().contains("store offline"));

        let decision = engine.decide(&creator, Action::View, &inspection);
        assert!(decision.is_denied());
        assert_eq!(decision.reason, Some(DenyReason::ContractViolation));
    }

    #[test]
    fn parent_of_the_wrong_kind_is_malformed() {
        let engine = PolicyEngine::default();
        let tenant = TenantId::new();
        let not_a_plan = Resource::new(ResourceKind::Task, Some(tenant)).with_id(Uuid::new_v4());
        let id = not_a_plan.id.unwrap();
        let resolver = MapResolver(HashMap::from([(id, not_a_plan)]));
        let inspection = Resource::new(ResourceKind::QcInspection, Some(tenant))
            .with_status(Status::InProgress)
            .with_parent_ref(ResourceKind::QcPlan, id);

        let err = engine.try_decide_with(&member(tenant), Action::View, &inspection, &resolver).unwrap_err();
        assert!(matches!(err, AppError::MalformedResource(_)));
    }

    #[test]
    fn eager_parents_of_the_wrong_kind_are_malformed() {
        let engine = PolicyEngine::default();
        let tenant = TenantId::new();
        let actor = Actor::new(ActorId::new(), Some(tenant)).with_roles([Role::QcInspector]);
        let team = Resource::new(ResourceKind::Team, Some(tenant)).with_members([actor.actor_id]);
        let notification = Resource::new(ResourceKind::Notification, Some(tenant)).with_parent(team);
        let inspection = inspection_under(notification, tenant);

        let err = engine.try_decide(&actor, Action::Update, &inspection).unwrap_err();
        assert!(matches!(err, AppError::MalformedResource(_)));
        assert!(engine.decide(&actor, Action::Update, &inspection).is_denied());

        let link = Resource::new(ResourceKind::QcInspection, Some(tenant))
            .with_status(Status::InProgress)
            .with_parent_ref(ResourceKind::Notification, Uuid::new_v4());
        let err = engine.try_decide(&actor, Action::Update, &link).unwrap_err();
        assert!(matches!(err, AppError::MalformedResource(_)));
    }

    #[test]
    fn foreign_tenant_is_denied_before_the_action_is_looked_up() {
        let engine = PolicyEngine::new(AuthzConfig::default().with_contract_mode(ContractMode::Fatal));
        let notification = Resource::new(ResourceKind::Notification, Some(TenantId::new()));
        let outsider = member(TenantId::new());

        let decision = engine.decide(&outsider, Action::Approve, &notification);
        assert_eq!(decision.reason, Some(DenyReason::TenantMismatch));

        let homeless = Actor::new(ActorId::new(), None);
        let decision = engine.decide_kind(&homeless, Action::Update, ResourceKind::Task);
        assert_eq!(decision.reason, Some(DenyReason::NoTenant));
    }

    #[test]
    fn missing_status_is_malformed_when_a_rule_reads_it() {
        let engine = PolicyEngine::default();
        let tenant = TenantId::new();
        let actor = member(tenant);
        let change_request = Resource::new(ResourceKind::ChangeRequest, Some(tenant)).with_creator(actor.actor_id);

        let err = engine.try_decide(&actor, Action::Update, &change_request).unwrap_err();
        assert!(matches!(err, AppError::MalformedResource(_)));
        // view does not read the status, so the same record is fine there
        assert!(engine.try_decide(&actor, Action::View, &change_request).unwrap().is_allowed());
    }

    #[test]
    #[should_panic(expected = "authorization contract violation")]
    fn fatal_mode_panics_on_contract_violation() {
        let engine = PolicyEngine::new(AuthzConfig::default().with_contract_mode(ContractMode::Fatal));
        let tenant = TenantId::new();
        let notification = Resource::new(ResourceKind::Notification, Some(tenant));
        engine.decide(&member(tenant), Action::Answer, &notification);
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PolicyEngine>();
    }
}
