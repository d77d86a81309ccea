use super::{ADMINS, AUTHORS, MANAGERS};
use crate::authz::action::Action;
use crate::authz::actor::Permission;
use crate::authz::predicate::Predicate;
use crate::authz::resource::ResourceKind;
use crate::authz::rule::RuleTable;

pub(super) fn table() -> RuleTable {
    RuleTable::new(ResourceKind::Document)
        .allow(Action::ViewAny, "document.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "document.create.author", Predicate::any_role(AUTHORS))
        .allow(Action::Create, "document.create.permission", Predicate::permission(Permission::DocumentCreate))
        .allow(Action::View, "document.view.creator", Predicate::IsCreator)
        .allow(Action::View, "document.view.member", Predicate::TenantMember)
        .allow(Action::Download, "document.download.creator", Predicate::IsCreator)
        .allow(Action::Download, "document.download.member", Predicate::TenantMember)
        .allow(Action::Share, "document.share.creator", Predicate::IsCreator)
        .allow(Action::Share, "document.share.manager", Predicate::any_role(MANAGERS))
        .allow(Action::Update, "document.update.creator", Predicate::IsCreator)
        .allow(Action::Update, "document.update.manager", Predicate::any_role(MANAGERS))
        .allow(Action::Update, "document.update.permission", Predicate::permission(Permission::DocumentUpdate))
        .allow(Action::Delete, "document.delete.creator", Predicate::IsCreator)
        .allow(Action::Delete, "document.delete.admin", Predicate::any_role(ADMINS))
        .allow(
            Action::Delete,
            "document.delete.permission",
            Predicate::all([Predicate::permission(Permission::DocumentDelete), Predicate::permission(Permission::DocumentUpdate)]),
        )
        .allow(Action::Restore, "document.restore.creator", Predicate::IsCreator)
        .allow(Action::Restore, "document.restore.admin", Predicate::any_role(ADMINS))
        .allow(Action::ForceDelete, "document.force_delete.admin", Predicate::any_role(ADMINS))
}
