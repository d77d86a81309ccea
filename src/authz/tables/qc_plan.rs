use super::{ADMINS, MANAGERS};
use crate::authz::action::Action;
use crate::authz::actor::Permission;
use crate::authz::predicate::Predicate;
use crate::authz::resource::{ResourceKind, Status};
use crate::authz::rule::RuleTable;

const APPROVED: &[Status] = &[Status::Approved];

pub(super) fn table() -> RuleTable {
    RuleTable::new(ResourceKind::QcPlan)
        .allow(Action::ViewAny, "qc_plan.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "qc_plan.create.member", Predicate::TenantMember)
        .allow(Action::View, "qc_plan.view.creator", Predicate::IsCreator)
        .allow(Action::View, "qc_plan.view.member", Predicate::TenantMember)
        .allow(
            Action::Update,
            "qc_plan.update.creator_unapproved",
            Predicate::all([Predicate::IsCreator, Predicate::status_not_in(APPROVED)]),
        )
        .allow(Action::Update, "qc_plan.update.manager", Predicate::any_role(MANAGERS))
        .allow(
            Action::Approve,
            "qc_plan.approve.manager",
            Predicate::all([Predicate::any_role(MANAGERS), Predicate::status_not_in(APPROVED)]),
        )
        .allow(
            Action::Approve,
            "qc_plan.approve.permission",
            Predicate::all([Predicate::permission(Permission::QcPlanApprove), Predicate::status_not_in(APPROVED)]),
        )
        .allow(
            Action::Delete,
            "qc_plan.delete.creator_draft",
            Predicate::all([Predicate::IsCreator, Predicate::status_in(&[Status::Draft])]),
        )
        .allow(Action::Delete, "qc_plan.delete.admin", Predicate::any_role(ADMINS))
}

#[cfg(test)]
mod tests {
    use crate::authz::action::Action;
    use crate::authz::actor::{Permission, Role};
    use crate::authz::resource::{ResourceKind, Status};
    use crate::authz::tables::fixtures::World;

    #[test]
    fn approved_plan_is_locked_for_its_author() {
        let world = World::new();
        let author = world.actor(&[Role::QcInspector]);
        let plan = world.resource(ResourceKind::QcPlan).with_creator(author.actor_id).with_status(Status::Draft);

        assert!(world.allows(&author, Action::Update, &plan));
        assert!(world.allows(&author, Action::Delete, &plan));

        let approved = plan.with_status(Status::Approved);
        assert!(!world.allows(&author, Action::Update, &approved));
        assert!(!world.allows(&author, Action::Delete, &approved));
        assert!(world.allows(&world.actor(&[Role::ProjectManager]), Action::Update, &approved));
    }

    #[test]
    fn approval_is_one_shot() {
        let world = World::new();
        let approver = world.actor(&[Role::Member]).with_permissions([Permission::QcPlanApprove]);
        let plan = world.resource(ResourceKind::QcPlan).with_status(Status::Submitted);

        assert!(world.allows(&approver, Action::Approve, &plan));
        assert!(!world.allows(&approver, Action::Approve, &plan.with_status(Status::Approved)));
    }
}
