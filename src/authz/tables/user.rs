use super::ADMINS;
use crate::authz::action::Action;
use crate::authz::actor::Permission;
use crate::authz::predicate::Predicate;
use crate::authz::resource::ResourceKind;
use crate::authz::rule::RuleTable;

/// User management. The record's `owner_id` is the user's own id.
pub(super) fn table() -> RuleTable {
    RuleTable::new(ResourceKind::User)
        .allow(Action::ViewAny, "user.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "user.create.admin", Predicate::any_role(ADMINS))
        .allow(Action::Create, "user.create.permission", Predicate::permission(Permission::UserManage))
        .allow(Action::View, "user.view.self", Predicate::IsOwner)
        .allow(Action::View, "user.view.member", Predicate::TenantMember)
        .allow(Action::Update, "user.update.self", Predicate::IsOwner)
        .allow(Action::Update, "user.update.admin", Predicate::any_role(ADMINS))
        .allow(Action::Update, "user.update.permission", Predicate::permission(Permission::UserManage))
        .allow(
            Action::Delete,
            "user.delete.admin",
            Predicate::all([Predicate::any_role(ADMINS), Predicate::not(Predicate::IsOwner)]),
        )
        .allow(
            Action::Delete,
            "user.delete.permission",
            Predicate::all([Predicate::permission(Permission::UserManage), Predicate::not(Predicate::IsOwner)]),
        )
}
