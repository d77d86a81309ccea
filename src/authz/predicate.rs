//! Predicate trees evaluated against an actor and a resource chain.
//!
//! Level 0 of the chain is the resource itself, level 1 its parent, and so on.
//! `OnParent` moves one level up. Collection-level checks evaluate with an
//! empty chain, so only actor-level predicates may appear in those rules.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::actor::{Actor, Permission, Role};
use super::resource::{Resource, Status};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "args")]
pub enum Predicate {
    /// Actor belongs to some tenant. For instance checks the tenant gate has
    /// already proven it is the resource's tenant.
    TenantMember,
    /// The resource at this level is in the actor's tenant.
    TenantMatch,
    HasAnyRole(Vec<Role>),
    HasPermission(Permission),
    IsCreator,
    IsOwner,
    IsAssignee,
    IsLeader,
    IsMember,
    /// Invited email equals the actor's email (ASCII case-insensitive).
    IsInvitee,
    IsPublic,
    StatusIn(Vec<Status>),
    StatusNotIn(Vec<Status>),
    OnParent(Box<Predicate>),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn any_role(roles: &[Role]) -> Self {
        Predicate::HasAnyRole(roles.to_vec())
    }

    pub fn permission(permission: Permission) -> Self {
        Predicate::HasPermission(permission)
    }

    pub fn status_in(statuses: &[Status]) -> Self {
        Predicate::StatusIn(statuses.to_vec())
    }

    pub fn status_not_in(statuses: &[Status]) -> Self {
        Predicate::StatusNotIn(statuses.to_vec())
    }

    pub fn on_parent(inner: Predicate) -> Self {
        Predicate::OnParent(Box::new(inner))
    }

    pub fn all(preds: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::All(preds.into_iter().collect())
    }

    pub fn any(preds: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Any(preds.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// True when the predicate reads anything from a resource instance.
    pub fn needs_instance(&self) -> bool {
        match self {
            Predicate::TenantMember | Predicate::HasAnyRole(_) | Predicate::HasPermission(_) => false,
            Predicate::All(preds) | Predicate::Any(preds) => preds.iter().any(Predicate::needs_instance),
            Predicate::Not(inner) => inner.needs_instance(),
            _ => true,
        }
    }

    /// How many parent hops the predicate walks.
    pub fn parent_depth(&self) -> usize {
        match self {
            Predicate::OnParent(inner) => 1 + inner.parent_depth(),
            Predicate::All(preds) | Predicate::Any(preds) => {
                preds.iter().map(Predicate::parent_depth).max().unwrap_or(0)
            }
            Predicate::Not(inner) => inner.parent_depth(),
            _ => 0,
        }
    }

    /// Chain levels whose `status` this predicate reads.
    pub fn status_levels(&self, level: usize, out: &mut BTreeSet<usize>) {
        match self {
            Predicate::StatusIn(_) | Predicate::StatusNotIn(_) => {
                out.insert(level);
            }
            Predicate::OnParent(inner) => inner.status_levels(level + 1, out),
            Predicate::All(preds) | Predicate::Any(preds) => {
                for pred in preds {
                    pred.status_levels(level, out);
                }
            }
            Predicate::Not(inner) => inner.status_levels(level, out),
            _ => {}
        }
    }

    /// Whether any role-dependent clause sits under a status gate. Used to
    /// tell state-gated rules apart when reasoning about monotonicity.
    pub fn is_state_gated(&self) -> bool {
        let mut levels = BTreeSet::new();
        self.status_levels(0, &mut levels);
        !levels.is_empty()
    }

    pub fn evaluate(&self, actor: &Actor, chain: &[Cow<'_, Resource>], level: usize) -> AppResult<bool> {
        match self {
            Predicate::TenantMember => Ok(actor.tenant_id.is_some()),
            Predicate::HasAnyRole(roles) => Ok(actor.has_any_role(roles)),
            Predicate::HasPermission(perm) => Ok(actor.has_permission(*perm)),
            Predicate::TenantMatch => {
                let node = node_at(chain, level)?;
                Ok(node.tenant_id.is_some() && node.tenant_id == actor.tenant_id)
            }
            Predicate::IsCreator => Ok(node_at(chain, level)?.creator_id == Some(actor.actor_id)),
            Predicate::IsOwner => Ok(node_at(chain, level)?.owner_id == Some(actor.actor_id)),
            Predicate::IsAssignee => Ok(node_at(chain, level)?.assignee_id == Some(actor.actor_id)),
            Predicate::IsLeader => Ok(node_at(chain, level)?.leader_id == Some(actor.actor_id)),
            Predicate::IsMember => Ok(node_at(chain, level)?.members.contains(&actor.actor_id)),
            Predicate::IsPublic => Ok(node_at(chain, level)?.is_public),
            Predicate::IsInvitee => {
                let node = node_at(chain, level)?;
                Ok(emails_match(node.invitee_email.as_deref(), actor.email.as_deref()))
            }
            Predicate::StatusIn(allowed) => {
                let status = status_at(chain, level)?;
                Ok(allowed.contains(&status))
            }
            Predicate::StatusNotIn(blocked) => {
                let status = status_at(chain, level)?;
                Ok(!blocked.contains(&status))
            }
            Predicate::OnParent(inner) => inner.evaluate(actor, chain, level + 1),
            Predicate::All(preds) => {
                for pred in preds {
                    if !pred.evaluate(actor, chain, level)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Any(preds) => {
                for pred in preds {
                    if pred.evaluate(actor, chain, level)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::Not(inner) => {
                // Negating a relation that is absent would turn "unknown" into a grant.
                if let Some(field) = inner.missing_relation(chain, level)? {
                    return Err(AppError::malformed(format!(
                        "{} has no {} to negate",
                        node_at(chain, level)?.label(),
                        field
                    )));
                }
                Ok(!inner.evaluate(actor, chain, level)?)
            }
        }
    }

    fn missing_relation(&self, chain: &[Cow<'_, Resource>], level: usize) -> AppResult<Option<&'static str>> {
        let missing = match self {
            Predicate::IsCreator => node_at(chain, level)?.creator_id.is_none().then_some("creator_id"),
            Predicate::IsOwner => node_at(chain, level)?.owner_id.is_none().then_some("owner_id"),
            Predicate::IsAssignee => node_at(chain, level)?.assignee_id.is_none().then_some("assignee_id"),
            Predicate::IsLeader => node_at(chain, level)?.leader_id.is_none().then_some("leader_id"),
            Predicate::IsInvitee => node_at(chain, level)?.invitee_email.is_none().then_some("invitee_email"),
            Predicate::OnParent(inner) => inner.missing_relation(chain, level + 1)?,
            Predicate::All(preds) | Predicate::Any(preds) => {
                for pred in preds {
                    if let Some(field) = pred.missing_relation(chain, level)? {
                        return Ok(Some(field));
                    }
                }
                None
            }
            Predicate::Not(inner) => inner.missing_relation(chain, level)?,
            _ => None,
        };
        Ok(missing)
    }
}

fn node_at<'c>(chain: &'c [Cow<'_, Resource>], level: usize) -> AppResult<&'c Resource> {
    match chain.get(level) {
        Some(node) => Ok(node.as_ref()),
        None if level == 0 => Err(AppError::malformed("rule reads a resource instance but none was given")),
        None => Err(AppError::unresolved_parent(format!("parent at depth {level} was not resolved"))),
    }
}

fn status_at(chain: &[Cow<'_, Resource>], level: usize) -> AppResult<Status> {
    let node = node_at(chain, level)?;
    node.status
        .ok_or_else(|| AppError::malformed(format!("{} has no status", node.label())))
}

fn emails_match(invited: Option<&str>, actor: Option<&str>) -> bool {
    match (invited.map(str::trim), actor.map(str::trim)) {
        (Some(invited), Some(actor)) if !invited.is_empty() => invited.eq_ignore_ascii_case(actor),
        _ => false,
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, name: &str, items: &[T]) -> fmt::Result {
            write!(f, "{name}(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            f.write_str(")")
        }

        match self {
            Predicate::TenantMember => f.write_str("tenant_member"),
            Predicate::TenantMatch => f.write_str("tenant_match"),
            Predicate::HasAnyRole(roles) => list(f, "has_any_role", roles),
            Predicate::HasPermission(perm) => write!(f, "has_permission({perm})"),
            Predicate::IsCreator => f.write_str("is_creator"),
            Predicate::IsOwner => f.write_str("is_owner"),
            Predicate::IsAssignee => f.write_str("is_assignee"),
            Predicate::IsLeader => f.write_str("is_leader"),
            Predicate::IsMember => f.write_str("is_member"),
            Predicate::IsInvitee => f.write_str("is_invitee"),
            Predicate::IsPublic => f.write_str("is_public"),
            Predicate::StatusIn(statuses) => {
                let names: Vec<String> = statuses.iter().map(status_name).collect();
                list(f, "status_in", &names)
            }
            Predicate::StatusNotIn(statuses) => {
                let names: Vec<String> = statuses.iter().map(status_name).collect();
                list(f, "status_not_in", &names)
            }
            Predicate::OnParent(inner) => write!(f, "parent.{inner}"),
            Predicate::All(preds) => list(f, "all", preds),
            Predicate::Any(preds) => list(f, "any", preds),
            Predicate::Not(inner) => write!(f, "not({inner})"),
        }
    }
}

fn status_name(status: &Status) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_else(|| format!("{status:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::actor::{ActorId, TenantId};
    use crate::authz::resource::ResourceKind;

    fn chain_of(resource: &Resource) -> Vec<Cow<'_, Resource>> {
        vec![Cow::Borrowed(resource)]
    }

    #[test]
    fn null_creator_never_matches() {
        let tenant = TenantId::new();
        let actor = Actor::new(ActorId::new(), Some(tenant));
        let resource = Resource::new(ResourceKind::Task, Some(tenant));

        assert!(!Predicate::IsCreator.evaluate(&actor, &chain_of(&resource), 0).unwrap());
        assert!(!Predicate::IsAssignee.evaluate(&actor, &chain_of(&resource), 0).unwrap());
        assert!(!Predicate::IsOwner.evaluate(&actor, &chain_of(&resource), 0).unwrap());
    }

    #[test]
    fn status_predicate_without_status_is_malformed() {
        let tenant = TenantId::new();
        let actor = Actor::new(ActorId::new(), Some(tenant));
        let resource = Resource::new(ResourceKind::ChangeRequest, Some(tenant));

        let err = Predicate::status_not_in(&[Status::Approved])
            .evaluate(&actor, &chain_of(&resource), 0)
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedResource(_)));
    }

    #[test]
    fn negating_absent_owner_is_malformed() {
        let tenant = TenantId::new();
        let actor = Actor::new(ActorId::new(), Some(tenant));
        let resource = Resource::new(ResourceKind::User, Some(tenant));

        let err = Predicate::not(Predicate::IsOwner)
            .evaluate(&actor, &chain_of(&resource), 0)
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedResource(_)));

        let owned = resource.with_owner(ActorId::new());
        assert!(Predicate::not(Predicate::IsOwner).evaluate(&actor, &chain_of(&owned), 0).unwrap());
    }

    #[test]
    fn on_parent_past_chain_end_is_unresolved() {
        let tenant = TenantId::new();
        let actor = Actor::new(ActorId::new(), Some(tenant));
        let resource = Resource::new(ResourceKind::QcInspection, Some(tenant));

        let err = Predicate::on_parent(Predicate::TenantMatch)
            .evaluate(&actor, &chain_of(&resource), 0)
            .unwrap_err();
        assert!(matches!(err, AppError::UnresolvedParent(_)));
    }

    #[test]
    fn instance_predicate_without_instance_is_malformed() {
        let actor = Actor::new(ActorId::new(), Some(TenantId::new()));
        let err = Predicate::IsCreator.evaluate(&actor, &[], 0).unwrap_err();
        assert!(matches!(err, AppError::MalformedResource(_)));
        assert!(Predicate::TenantMember.evaluate(&actor, &[], 0).unwrap());
    }

    #[test]
    fn invitee_email_matches_case_insensitively() {
        let tenant = TenantId::new();
        let actor = Actor::new(ActorId::new(), Some(tenant)).with_email("Ada@Example.com ");
        let invitation = Resource::new(ResourceKind::Invitation, Some(tenant)).with_invitee_email("ada@example.com");
        let other = Resource::new(ResourceKind::Invitation, Some(tenant)).with_invitee_email("bob@example.com");
        let blank = Resource::new(ResourceKind::Invitation, Some(tenant)).with_invitee_email("");

        assert!(Predicate::IsInvitee.evaluate(&actor, &chain_of(&invitation), 0).unwrap());
        assert!(!Predicate::IsInvitee.evaluate(&actor, &chain_of(&other), 0).unwrap());
        assert!(!Predicate::IsInvitee.evaluate(&actor, &chain_of(&blank), 0).unwrap());

        let no_email = Actor::new(ActorId::new(), Some(tenant));
        assert!(!Predicate::IsInvitee.evaluate(&no_email, &chain_of(&invitation), 0).unwrap());
    }

    #[test]
    fn structure_queries() {
        let pred = Predicate::any([
            Predicate::all([Predicate::IsCreator, Predicate::status_not_in(&[Status::Approved])]),
            Predicate::on_parent(Predicate::on_parent(Predicate::IsMember)),
            Predicate::any_role(&[Role::Admin]),
        ]);

        assert!(pred.needs_instance());
        assert_eq!(pred.parent_depth(), 2);
        assert!(pred.is_state_gated());
        assert!(!Predicate::any_role(&[Role::Admin]).needs_instance());
        assert_eq!(
            pred.to_string(),
            "any(all(is_creator, status_not_in(approved)), parent.parent.is_member, has_any_role(admin))"
        );
    }
}
