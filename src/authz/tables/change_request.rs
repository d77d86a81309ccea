use super::{ADMINS, MANAGERS};
use crate::authz::action::Action;
use crate::authz::actor::{Permission, Role};
use crate::authz::predicate::Predicate;
use crate::authz::resource::{ResourceKind, Status};
use crate::authz::rule::RuleTable;
use crate::config::StateGateMode;

/// Once decided, a change request is frozen for its creator.
const DECIDED: &[Status] = &[Status::Approved, Status::Rejected];
const AWAITING_DECISION: &[Status] = &[Status::Submitted, Status::Pending, Status::UnderReview];

pub(super) fn table(mode: StateGateMode) -> RuleTable {
    let table = RuleTable::new(ResourceKind::ChangeRequest)
        .allow(Action::ViewAny, "change_request.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "change_request.create.member", Predicate::TenantMember)
        .allow(Action::View, "change_request.view.creator", Predicate::IsCreator)
        .allow(Action::View, "change_request.view.member", Predicate::TenantMember)
        .allow(
            Action::Update,
            "change_request.update.creator_open",
            Predicate::all([Predicate::IsCreator, Predicate::status_not_in(DECIDED)]),
        );

    let table = match mode {
        StateGateMode::Strict => table.allow(
            Action::Update,
            "change_request.update.manager_open",
            Predicate::all([Predicate::any_role(&[Role::ProjectManager]), Predicate::status_not_in(DECIDED)]),
        ),
        StateGateMode::Permissive => table
            .allow(
                Action::Update,
                "change_request.update.manager",
                Predicate::any_role(&[Role::ProjectManager]),
            )
            .allow(
                Action::Update,
                "change_request.update.project_permission",
                Predicate::permission(Permission::ProjectUpdate),
            ),
    };

    table
        .allow(Action::Update, "change_request.update.admin", Predicate::any_role(ADMINS))
        .allow(
            Action::Delete,
            "change_request.delete.creator_draft",
            Predicate::all([Predicate::IsCreator, Predicate::status_in(&[Status::Draft, Status::Pending])]),
        )
        .allow(Action::Delete, "change_request.delete.admin", Predicate::any_role(ADMINS))
        .allow(
            Action::Approve,
            "change_request.approve.manager",
            Predicate::all([Predicate::any_role(MANAGERS), Predicate::status_in(AWAITING_DECISION)]),
        )
        .allow(
            Action::Approve,
            "change_request.approve.permission",
            Predicate::all([
                Predicate::permission(Permission::ChangeRequestApprove),
                Predicate::status_in(AWAITING_DECISION),
            ]),
        )
        .allow(
            Action::Reject,
            "change_request.reject.manager",
            Predicate::all([Predicate::any_role(MANAGERS), Predicate::status_in(AWAITING_DECISION)]),
        )
        .allow(
            Action::Reject,
            "change_request.reject.permission",
            Predicate::all([
                Predicate::permission(Permission::ChangeRequestApprove),
                Predicate::status_in(AWAITING_DECISION),
            ]),
        )
}
