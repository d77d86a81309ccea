use super::{ADMINS, MANAGERS};
use crate::authz::action::Action;
use crate::authz::actor::Permission;
use crate::authz::predicate::Predicate;
use crate::authz::resource::ResourceKind;
use crate::authz::rule::RuleTable;

/// Projects are the parent scope of tasks, QC plans and their inspections.
pub(super) fn table() -> RuleTable {
    RuleTable::new(ResourceKind::Project)
        .allow(Action::ViewAny, "project.view_any.member", Predicate::TenantMember)
        .allow(Action::Create, "project.create.manager", Predicate::any_role(MANAGERS))
        .allow(Action::Create, "project.create.permission", Predicate::permission(Permission::ProjectCreate))
        .allow(Action::View, "project.view.owner", Predicate::IsOwner)
        .allow(Action::View, "project.view.member", Predicate::IsMember)
        .allow(Action::View, "project.view.manager", Predicate::any_role(MANAGERS))
        .allow(Action::Update, "project.update.owner", Predicate::IsOwner)
        .allow(Action::Update, "project.update.manager", Predicate::any_role(MANAGERS))
        .allow(Action::Update, "project.update.permission", Predicate::permission(Permission::ProjectUpdate))
        .allow(Action::Delete, "project.delete.owner", Predicate::IsOwner)
        .allow(Action::Delete, "project.delete.admin", Predicate::any_role(ADMINS))
        .allow(
            Action::Delete,
            "project.delete.permission",
            Predicate::all([Predicate::permission(Permission::ProjectDelete), Predicate::permission(Permission::ProjectUpdate)]),
        )
        .allow(Action::Restore, "project.restore.owner", Predicate::IsOwner)
        .allow(Action::Restore, "project.restore.admin", Predicate::any_role(ADMINS))
        .allow(Action::ForceDelete, "project.force_delete.admin", Predicate::any_role(ADMINS))
}

#[cfg(test)]
mod tests {
    use crate::authz::action::Action;
    use crate::authz::actor::{Permission, Role};
    use crate::authz::resource::ResourceKind;
    use crate::authz::tables::fixtures::World;

    #[test]
    fn members_see_projects_they_belong_to() {
        let world = World::new();
        let owner = world.actor(&[Role::Member]);
        let crew = world.actor(&[Role::Member]);
        let stranger = world.actor(&[Role::Member]);
        let project = world
            .resource(ResourceKind::Project)
            .with_owner(owner.actor_id)
            .with_members([crew.actor_id]);

        assert!(world.allows(&owner, Action::View, &project));
        assert!(world.allows(&crew, Action::View, &project));
        assert!(!world.allows(&stranger, Action::View, &project));
        assert!(!world.allows(&crew, Action::Update, &project));
    }

    #[test]
    fn project_update_permission_covers_the_project_itself() {
        let world = World::new();
        let delegate = world.actor(&[Role::Member]).with_permissions([Permission::ProjectUpdate]);
        let project = world.resource(ResourceKind::Project).with_owner(world.actor(&[]).actor_id);

        assert_eq!(
            world.check(&delegate, Action::Update, &project).matched_rule.map(|r| r.as_str()),
            Some("project.update.permission")
        );
        assert!(!world.allows(&delegate, Action::Delete, &project));

        let remover = world.actor(&[Role::Member]).with_permissions([Permission::ProjectDelete]);
        assert!(!world.allows(&remover, Action::Update, &project));
        assert!(!world.allows(&remover, Action::Delete, &project));
    }

    #[test]
    fn only_admins_force_delete() {
        let world = World::new();
        let owner = world.actor(&[Role::ProjectManager]);
        let admin = world.actor(&[Role::Admin]);
        let project = world.resource(ResourceKind::Project).with_owner(owner.actor_id);

        assert!(world.allows(&owner, Action::Delete, &project));
        assert!(!world.allows(&owner, Action::ForceDelete, &project));
        assert!(world.allows(&admin, Action::ForceDelete, &project));
    }

    #[test]
    fn creating_projects_needs_a_manager_role() {
        let world = World::new();
        assert!(world.allows_kind(&world.actor(&[Role::ProjectManager]), Action::Create, ResourceKind::Project));
        assert!(!world.allows_kind(&world.actor(&[Role::Designer]), Action::Create, ResourceKind::Project));
        assert!(world.allows_kind(&world.actor(&[Role::Viewer]), Action::ViewAny, ResourceKind::Project));
    }
}
