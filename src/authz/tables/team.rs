use super::{ADMINS, AUTHORS, MANAGERS};
use crate::authz::action::Action;
use crate::authz::actor::Permission;
use crate::authz::predicate::Predicate;
use crate::authz::resource::ResourceKind;
use crate::authz::rule::RuleTable;

pub(super) fn table() -> RuleTable {
    RuleTable::new(ResourceKind::Team)
        .allow(Action::ViewAny, "team.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "team.create.author", Predicate::any_role(AUTHORS))
        .allow(Action::Create, "team.create.permission", Predicate::permission(Permission::TeamCreate))
        .allow(Action::View, "team.view.owner", Predicate::IsOwner)
        .allow(Action::View, "team.view.leader", Predicate::IsLeader)
        .allow(Action::View, "team.view.member", Predicate::IsMember)
        .allow(Action::View, "team.view.manager", Predicate::any_role(MANAGERS))
        .allow(Action::Update, "team.update.owner", Predicate::IsOwner)
        .allow(Action::Update, "team.update.leader", Predicate::IsLeader)
        .allow(Action::Update, "team.update.manager", Predicate::any_role(MANAGERS))
        .allow(Action::Update, "team.update.permission", Predicate::permission(Permission::TeamManage))
        .allow(Action::Delete, "team.delete.owner", Predicate::IsOwner)
        .allow(Action::Delete, "team.delete.leader", Predicate::IsLeader)
        .allow(Action::Delete, "team.delete.admin", Predicate::any_role(ADMINS))
}
