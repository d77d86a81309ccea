use crate::authz::action::Action;
use crate::authz::predicate::Predicate;
use crate::authz::resource::ResourceKind;
use crate::authz::rule::RuleTable;

/// Notifications belong to their recipient alone. No role reaches them.
pub(super) fn table() -> RuleTable {
    RuleTable::new(ResourceKind::Notification)
        .allow(Action::ViewAny, "notification.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "notification.create.member", Predicate::TenantMember)
        .allow(Action::View, "notification.view.recipient", Predicate::IsOwner)
        .allow(Action::MarkAsRead, "notification.mark_as_read.recipient", Predicate::IsOwner)
        .allow(Action::Delete, "notification.delete.recipient", Predicate::IsOwner)
}
