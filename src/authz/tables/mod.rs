//! Compiled-in rule tables, one module per resource kind.
//!
//! Tables only list allow rules. The engine applies the tenant gate before
//! any of them and denies when none match.

mod change_request;
mod component;
mod document;
mod invitation;
mod ncr;
mod notification;
mod project;
mod qc_inspection;
mod qc_plan;
mod rfi;
mod task;
mod team;
mod template;
mod user;

use super::actor::Role;
use super::rule::RuleBook;
use crate::config::StateGateMode;

/// Tenant administrators.
pub(crate) const ADMINS: &[Role] = &[Role::SuperAdmin, Role::Admin];
/// Roles allowed to manage project-scoped records.
pub(crate) const MANAGERS: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::ProjectManager];
/// Roles allowed to author design artifacts.
pub(crate) const AUTHORS: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::ProjectManager, Role::Designer];

pub fn standard(mode: StateGateMode) -> RuleBook {
    RuleBook::new()
        .with_table(project::table())
        .with_table(task::table())
        .with_table(document::table())
        .with_table(component::table())
        .with_table(team::table())
        .with_table(template::table())
        .with_table(change_request::table(mode))
        .with_table(rfi::table(mode))
        .with_table(ncr::table(mode))
        .with_table(qc_plan::table())
        .with_table(qc_inspection::table())
        .with_table(invitation::table())
        .with_table(notification::table())
        .with_table(user::table())
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared setup for the per-table tests.

    use crate::authz::action::Action;
    use crate::authz::actor::{Actor, ActorId, Role, TenantId};
    use crate::authz::decision::Decision;
    use crate::authz::engine::PolicyEngine;
    use crate::authz::resource::{Resource, ResourceKind};
    use crate::config::{AuthzConfig, ContractMode, StateGateMode};

    pub struct World {
        pub engine: PolicyEngine,
        pub tenant: TenantId,
    }

    impl World {
        pub fn new() -> Self {
            Self::with_mode(StateGateMode::Strict)
        }

        pub fn with_mode(mode: StateGateMode) -> Self {
            let config = AuthzConfig::default()
                .with_state_gate(mode)
                .with_contract_mode(ContractMode::Fatal);
            Self { engine: PolicyEngine::new(config), tenant: TenantId::new() }
        }

        pub fn actor(&self, roles: &[Role]) -> Actor {
            Actor::new(ActorId::new(), Some(self.tenant)).with_roles(roles.iter().copied())
        }

        pub fn resource(&self, kind: ResourceKind) -> Resource {
            Resource::new(kind, Some(self.tenant))
        }

        pub fn check(&self, actor: &Actor, action: Action, resource: &Resource) -> Decision {
            self.engine.decide(actor, action, resource)
        }

        pub fn allows(&self, actor: &Actor, action: Action, resource: &Resource) -> bool {
            self.check(actor, action, resource).is_allowed()
        }

        pub fn allows_kind(&self, actor: &Actor, action: Action, kind: ResourceKind) -> bool {
            self.engine.decide_kind(actor, action, kind).is_allowed()
        }
    }
}
