use super::{ADMINS, AUTHORS, MANAGERS};
use crate::authz::action::Action;
use crate::authz::actor::Permission;
use crate::authz::predicate::Predicate;
use crate::authz::resource::ResourceKind;
use crate::authz::rule::RuleTable;

/// Components are owned design artifacts; plain members do not browse them.
pub(super) fn table() -> RuleTable {
    RuleTable::new(ResourceKind::Component)
        .allow(Action::ViewAny, "component.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "component.create.author", Predicate::any_role(AUTHORS))
        .allow(Action::Create, "component.create.permission", Predicate::permission(Permission::ComponentCreate))
        .allow(Action::View, "component.view.owner", Predicate::IsOwner)
        .allow(Action::View, "component.view.creator", Predicate::IsCreator)
        .allow(Action::View, "component.view.author", Predicate::any_role(AUTHORS))
        .allow(Action::View, "component.view.permission", Predicate::permission(Permission::ComponentView))
        .allow(Action::Update, "component.update.owner", Predicate::IsOwner)
        .allow(Action::Update, "component.update.creator", Predicate::IsCreator)
        .allow(Action::Update, "component.update.manager", Predicate::any_role(MANAGERS))
        .allow(Action::Update, "component.update.permission", Predicate::permission(Permission::ComponentUpdate))
        .allow(Action::Delete, "component.delete.owner", Predicate::IsOwner)
        .allow(Action::Delete, "component.delete.admin", Predicate::any_role(ADMINS))
}
