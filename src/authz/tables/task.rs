use super::{ADMINS, MANAGERS};
use crate::authz::action::Action;
use crate::authz::actor::Permission;
use crate::authz::predicate::Predicate;
use crate::authz::resource::ResourceKind;
use crate::authz::rule::RuleTable;

pub(super) fn table() -> RuleTable {
    RuleTable::new(ResourceKind::Task)
        .allow(Action::ViewAny, "task.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "task.create.member", Predicate::TenantMember)
        .allow(Action::View, "task.view.creator", Predicate::IsCreator)
        .allow(Action::View, "task.view.assignee", Predicate::IsAssignee)
        .allow(Action::View, "task.view.member", Predicate::TenantMember)
        .allow(Action::Update, "task.update.creator", Predicate::IsCreator)
        .allow(Action::Update, "task.update.assignee", Predicate::IsAssignee)
        .allow(Action::Update, "task.update.manager", Predicate::any_role(MANAGERS))
        .allow(Action::Update, "task.update.permission", Predicate::permission(Permission::TaskUpdate))
        .allow(Action::Delete, "task.delete.creator", Predicate::IsCreator)
        .allow(Action::Delete, "task.delete.admin", Predicate::any_role(ADMINS))
        .allow(
            Action::Delete,
            "task.delete.permission",
            Predicate::all([Predicate::permission(Permission::TaskDelete), Predicate::permission(Permission::TaskUpdate)]),
        )
        .allow(Action::Restore, "task.restore.creator", Predicate::IsCreator)
        .allow(Action::Restore, "task.restore.admin", Predicate::any_role(ADMINS))
        .allow(Action::ForceDelete, "task.force_delete.admin", Predicate::any_role(ADMINS))
}

#[cfg(test)]
mod tests {
    use crate::authz::action::Action;
    use crate::authz::actor::{Permission, Role};
    use crate::authz::resource::ResourceKind;
    use crate::authz::tables::fixtures::World;

    #[test]
    fn assignee_can_update_but_not_delete() {
        let world = World::new();
        let creator = world.actor(&[Role::Member]);
        let assignee = world.actor(&[Role::Member]);
        let task = world
            .resource(ResourceKind::Task)
            .with_creator(creator.actor_id)
            .with_assignee(assignee.actor_id);

        assert_eq!(
            world.check(&assignee, Action::Update, &task).matched_rule.map(|r| r.as_str()),
            Some("task.update.assignee")
        );
        assert!(!world.allows(&assignee, Action::Delete, &task));
        assert!(world.allows(&creator, Action::Delete, &task));
    }

    #[test]
    fn tenant_members_view_every_task() {
        let world = World::new();
        let bystander = world.actor(&[Role::Viewer]);
        let task = world.resource(ResourceKind::Task);

        assert_eq!(
            world.check(&bystander, Action::View, &task).matched_rule.map(|r| r.as_str()),
            Some("task.view.member")
        );
        assert!(!world.allows(&bystander, Action::Update, &task));
    }

    #[test]
    fn unowned_task_falls_through_to_roles() {
        let world = World::new();
        let member = world.actor(&[Role::Member]);
        let manager = world.actor(&[Role::ProjectManager]);
        let task = world.resource(ResourceKind::Task);

        assert!(!world.allows(&member, Action::Update, &task));
        assert!(world.allows(&manager, Action::Update, &task));
        assert!(!world.allows(&manager, Action::Delete, &task));
    }

    #[test]
    fn any_tenant_member_can_create() {
        let world = World::new();
        assert!(world.allows_kind(&world.actor(&[]), Action::Create, ResourceKind::Task));
    }

    #[test]
    fn delete_grant_alone_does_not_open_deletion() {
        let world = World::new();
        let task = world.resource(ResourceKind::Task).with_creator(world.actor(&[]).actor_id);
        let deleter = world.actor(&[Role::Member]).with_permissions([Permission::TaskDelete]);
        let maintainer = world
            .actor(&[Role::Member])
            .with_permissions([Permission::TaskDelete, Permission::TaskUpdate]);

        assert!(!world.allows(&deleter, Action::Update, &task));
        assert!(!world.allows(&deleter, Action::Delete, &task));
        assert_eq!(
            world.check(&maintainer, Action::Delete, &task).matched_rule.map(|r| r.as_str()),
            Some("task.delete.permission")
        );
    }
}
