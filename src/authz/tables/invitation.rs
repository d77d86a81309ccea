use super::{ADMINS, MANAGERS};
use crate::authz::action::Action;
use crate::authz::actor::Permission;
use crate::authz::predicate::Predicate;
use crate::authz::resource::{ResourceKind, Status};
use crate::authz::rule::RuleTable;

const PENDING: &[Status] = &[Status::Pending];

/// The invitee is matched by email: they have no stake in the record until
/// they accept.
pub(super) fn table() -> RuleTable {
    RuleTable::new(ResourceKind::Invitation)
        .allow(Action::ViewAny, "invitation.view_any.admin", Predicate::any_role(ADMINS))
        .allow(
            Action::ViewAny,
            "invitation.view_any.permission",
            Predicate::permission(Permission::InvitationManage),
        )
        .allow(Action::Create, "invitation.create.manager", Predicate::any_role(MANAGERS))
        .allow(
            Action::Create,
            "invitation.create.permission",
            Predicate::permission(Permission::InvitationManage),
        )
        .allow(Action::View, "invitation.view.inviter", Predicate::IsCreator)
        .allow(Action::View, "invitation.view.invitee", Predicate::IsInvitee)
        .allow(Action::View, "invitation.view.admin", Predicate::any_role(ADMINS))
        .allow(Action::View, "invitation.view.permission", Predicate::permission(Permission::InvitationManage))
        .allow(
            Action::Accept,
            "invitation.accept.invitee",
            Predicate::all([Predicate::IsInvitee, Predicate::status_in(PENDING)]),
        )
        .allow(
            Action::Decline,
            "invitation.decline.invitee",
            Predicate::all([Predicate::IsInvitee, Predicate::status_in(PENDING)]),
        )
        .allow(
            Action::Delete,
            "invitation.delete.inviter",
            Predicate::all([Predicate::IsCreator, Predicate::status_in(PENDING)]),
        )
        .allow(Action::Delete, "invitation.delete.admin", Predicate::any_role(ADMINS))
        .allow(
            Action::Delete,
            "invitation.delete.permission",
            Predicate::permission(Permission::InvitationManage),
        )
}

#[cfg(test)]
mod tests {
    use crate::authz::action::Action;
    use crate::authz::actor::Role;
    use crate::authz::resource::{ResourceKind, Status};
    use crate::authz::tables::fixtures::World;

    #[test]
    fn invitee_answers_by_email() {
        let world = World::new();
        let inviter = world.actor(&[Role::Admin]);
        let invitee = world.actor(&[Role::Viewer]).with_email("New.Hire@example.com");
        let someone_else = world.actor(&[Role::Member]).with_email("other@example.com");
        let invitation = world
            .resource(ResourceKind::Invitation)
            .with_creator(inviter.actor_id)
            .with_invitee_email("new.hire@example.com")
            .with_status(Status::Pending);

        assert!(world.allows(&invitee, Action::View, &invitation));
        assert!(world.allows(&invitee, Action::Accept, &invitation));
        assert!(world.allows(&invitee, Action::Decline, &invitation));
        assert!(!world.allows(&someone_else, Action::Decline, &invitation));
        assert!(!world.allows(&invitee, Action::Decline, &invitation.with_status(Status::Accepted)));
    }

    #[test]
    fn inviter_can_only_withdraw_pending_invitations() {
        let world = World::new();
        let inviter = world.actor(&[Role::ProjectManager]);
        let invitation = world
            .resource(ResourceKind::Invitation)
            .with_creator(inviter.actor_id)
            .with_invitee_email("x@example.com")
            .with_status(Status::Pending);

        assert!(world.allows(&inviter, Action::Delete, &invitation));
        assert!(!world.allows(&inviter, Action::Delete, &invitation.with_status(Status::Expired)));
    }

    #[test]
    fn listing_is_for_administrators() {
        let world = World::new();
        assert!(!world.allows_kind(&world.actor(&[Role::Member]), Action::ViewAny, ResourceKind::Invitation));
        assert!(world.allows_kind(&world.actor(&[Role::Admin]), Action::ViewAny, ResourceKind::Invitation));
        assert!(world.allows_kind(&world.actor(&[Role::ProjectManager]), Action::Create, ResourceKind::Invitation));
    }
}
