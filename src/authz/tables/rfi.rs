use super::{ADMINS, MANAGERS};
use crate::authz::action::Action;
use crate::authz::actor::{Permission, Role};
use crate::authz::predicate::Predicate;
use crate::authz::resource::{ResourceKind, Status};
use crate::authz::rule::RuleTable;
use crate::config::StateGateMode;

const SETTLED: &[Status] = &[Status::Answered, Status::Closed];

pub(super) fn table(mode: StateGateMode) -> RuleTable {
    let table = RuleTable::new(ResourceKind::Rfi)
        .allow(Action::ViewAny, "rfi.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "rfi.create.member", Predicate::TenantMember)
        .allow(Action::View, "rfi.view.creator", Predicate::IsCreator)
        .allow(Action::View, "rfi.view.assignee", Predicate::IsAssignee)
        .allow(Action::View, "rfi.view.member", Predicate::TenantMember)
        .allow(
            Action::Update,
            "rfi.update.creator_open",
            Predicate::all([Predicate::IsCreator, Predicate::status_not_in(SETTLED)]),
        );

    let table = match mode {
        StateGateMode::Strict => table.allow(
            Action::Update,
            "rfi.update.manager_open",
            Predicate::all([Predicate::any_role(&[Role::ProjectManager]), Predicate::status_not_in(SETTLED)]),
        ),
        StateGateMode::Permissive => table
            .allow(Action::Update, "rfi.update.manager", Predicate::any_role(&[Role::ProjectManager]))
            .allow(
                Action::Update,
                "rfi.update.project_permission",
                Predicate::permission(Permission::ProjectUpdate),
            ),
    };

    table
        .allow(Action::Update, "rfi.update.admin", Predicate::any_role(ADMINS))
        .allow(
            Action::Answer,
            "rfi.answer.manager",
            Predicate::all([Predicate::any_role(MANAGERS), Predicate::status_not_in(SETTLED)]),
        )
        .allow(
            Action::Answer,
            "rfi.answer.permission",
            Predicate::all([Predicate::permission(Permission::RfiAnswer), Predicate::status_not_in(SETTLED)]),
        )
        .allow(
            Action::Delete,
            "rfi.delete.creator_open",
            Predicate::all([Predicate::IsCreator, Predicate::status_in(&[Status::Draft, Status::Open])]),
        )
        .allow(Action::Delete, "rfi.delete.admin", Predicate::any_role(ADMINS))
}
