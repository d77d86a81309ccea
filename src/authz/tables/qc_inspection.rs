use super::{ADMINS, MANAGERS};
use crate::authz::action::Action;
use crate::authz::actor::{Permission, Role};
use crate::authz::predicate::Predicate;
use crate::authz::resource::{ResourceKind, Status};
use crate::authz::rule::RuleTable;

/// Inspections hang off a QC plan, which hangs off a project.
const FINISHED: &[Status] = &[Status::Completed, Status::Approved];

pub(super) fn table() -> RuleTable {
    RuleTable::new(ResourceKind::QcInspection)
        .allow(Action::ViewAny, "qc_inspection.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "qc_inspection.create.member", Predicate::TenantMember)
        .allow(Action::View, "qc_inspection.view.creator", Predicate::IsCreator)
        .allow(Action::View, "qc_inspection.view.assignee", Predicate::IsAssignee)
        .allow(
            Action::View,
            "qc_inspection.view.project_member",
            Predicate::on_parent(Predicate::on_parent(Predicate::IsMember)),
        )
        .allow(Action::View, "qc_inspection.view.member", Predicate::TenantMember)
        .allow(
            Action::Update,
            "qc_inspection.update.creator_open",
            Predicate::all([Predicate::IsCreator, Predicate::status_not_in(FINISHED)]),
        )
        .allow(
            Action::Update,
            "qc_inspection.update.project_inspector",
            Predicate::all([
                Predicate::any_role(&[Role::QcInspector]),
                Predicate::on_parent(Predicate::on_parent(Predicate::IsMember)),
                Predicate::status_not_in(FINISHED),
            ]),
        )
        .allow(Action::Update, "qc_inspection.update.manager", Predicate::any_role(MANAGERS))
        .allow(
            Action::Approve,
            "qc_inspection.approve.manager",
            Predicate::all([Predicate::any_role(MANAGERS), Predicate::status_in(&[Status::Completed])]),
        )
        .allow(
            Action::Approve,
            "qc_inspection.approve.permission",
            Predicate::all([
                Predicate::permission(Permission::QcInspectionApprove),
                Predicate::status_in(&[Status::Completed]),
            ]),
        )
        .allow(
            Action::Delete,
            "qc_inspection.delete.creator_draft",
            Predicate::all([Predicate::IsCreator, Predicate::status_in(&[Status::Draft, Status::Pending])]),
        )
        .allow(Action::Delete, "qc_inspection.delete.admin", Predicate::any_role(ADMINS))
}
