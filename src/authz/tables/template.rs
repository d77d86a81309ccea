use super::{ADMINS, AUTHORS, MANAGERS};
use crate::authz::action::Action;
use crate::authz::actor::Permission;
use crate::authz::predicate::Predicate;
use crate::authz::resource::ResourceKind;
use crate::authz::rule::RuleTable;

/// `is_public` opens a template to the whole tenant, never beyond it: the
/// tenant gate runs before `template.view.public` is reached.
pub(super) fn table() -> RuleTable {
    RuleTable::new(ResourceKind::Template)
        .allow(Action::ViewAny, "template.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "template.create.author", Predicate::any_role(AUTHORS))
        .allow(Action::Create, "template.create.permission", Predicate::permission(Permission::TemplateCreate))
        .allow(Action::View, "template.view.creator", Predicate::IsCreator)
        .allow(Action::View, "template.view.public", Predicate::IsPublic)
        .allow(Action::View, "template.view.manager", Predicate::any_role(MANAGERS))
        .allow(Action::Update, "template.update.creator", Predicate::IsCreator)
        .allow(Action::Update, "template.update.admin", Predicate::any_role(ADMINS))
        .allow(Action::Delete, "template.delete.creator", Predicate::IsCreator)
        .allow(Action::Delete, "template.delete.admin", Predicate::any_role(ADMINS))
}
