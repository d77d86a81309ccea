use super::{ADMINS, MANAGERS};
use crate::authz::action::Action;
use crate::authz::actor::{Permission, Role};
use crate::authz::predicate::Predicate;
use crate::authz::resource::{ResourceKind, Status};
use crate::authz::rule::RuleTable;
use crate::config::StateGateMode;

const CLOSED: &[Status] = &[Status::Closed];

/// Non-conformance reports. `approve` signs off the corrective action and
/// closes the report.
pub(super) fn table(mode: StateGateMode) -> RuleTable {
    let table = RuleTable::new(ResourceKind::Ncr)
        .allow(Action::ViewAny, "ncr.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "ncr.create.member", Predicate::TenantMember)
        .allow(Action::View, "ncr.view.creator", Predicate::IsCreator)
        .allow(Action::View, "ncr.view.assignee", Predicate::IsAssignee)
        .allow(Action::View, "ncr.view.member", Predicate::TenantMember)
        .allow(
            Action::Update,
            "ncr.update.creator_open",
            Predicate::all([Predicate::IsCreator, Predicate::status_not_in(CLOSED)]),
        );

    let table = match mode {
        StateGateMode::Strict => table.allow(
            Action::Update,
            "ncr.update.manager_open",
            Predicate::all([Predicate::any_role(&[Role::ProjectManager]), Predicate::status_not_in(CLOSED)]),
        ),
        StateGateMode::Permissive => table
            .allow(Action::Update, "ncr.update.manager", Predicate::any_role(&[Role::ProjectManager]))
            .allow(
                Action::Update,
                "ncr.update.project_permission",
                Predicate::permission(Permission::ProjectUpdate),
            ),
    };

    table
        .allow(Action::Update, "ncr.update.admin", Predicate::any_role(ADMINS))
        .allow(
            Action::Approve,
            "ncr.approve.manager",
            Predicate::all([Predicate::any_role(MANAGERS), Predicate::status_not_in(CLOSED)]),
        )
        .allow(
            Action::Approve,
            "ncr.approve.permission",
            Predicate::all([Predicate::permission(Permission::NcrApprove), Predicate::status_not_in(CLOSED)]),
        )
        .allow(
            Action::Delete,
            "ncr.delete.creator_open",
            Predicate::all([Predicate::IsCreator, Predicate::status_in(&[Status::Draft, Status::Open])]),
        )
        .allow(Action::Delete, "ncr.delete.admin", Predicate::any_role(ADMINS))
}
