use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant identifier. Every actor and resource belongs to at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Well-known role names. Anything else coming out of the role store is
/// dropped by the resolver instead of being matched as a free string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    ProjectManager,
    Designer,
    QcInspector,
    Member,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::ProjectManager,
        Role::Designer,
        Role::QcInspector,
        Role::Member,
        Role::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::ProjectManager => "project_manager",
            Role::Designer => "designer",
            Role::QcInspector => "qc_inspector",
            Role::Member => "member",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} name: {value}")]
pub struct UnknownName {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Role {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownName { kind: "role", value: s.to_string() })
    }
}

/// Well-known permission names, stored as dotted strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "project.create")]
    ProjectCreate,
    /// Grants update on the project and, in permissive state-gate mode, on
    /// every record that belongs to it.
    #[serde(rename = "project.update")]
    ProjectUpdate,
    #[serde(rename = "project.delete")]
    ProjectDelete,
    #[serde(rename = "task.update")]
    TaskUpdate,
    #[serde(rename = "task.delete")]
    TaskDelete,
    #[serde(rename = "document.create")]
    DocumentCreate,
    #[serde(rename = "document.update")]
    DocumentUpdate,
    #[serde(rename = "document.delete")]
    DocumentDelete,
    #[serde(rename = "component.create")]
    ComponentCreate,
    #[serde(rename = "component.view")]
    ComponentView,
    #[serde(rename = "component.update")]
    ComponentUpdate,
    #[serde(rename = "team.create")]
    TeamCreate,
    #[serde(rename = "team.manage")]
    TeamManage,
    #[serde(rename = "template.create")]
    TemplateCreate,
    #[serde(rename = "change_request.approve")]
    ChangeRequestApprove,
    #[serde(rename = "rfi.answer")]
    RfiAnswer,
    #[serde(rename = "ncr.approve")]
    NcrApprove,
    #[serde(rename = "qc_plan.approve")]
    QcPlanApprove,
    #[serde(rename = "qc_inspection.approve")]
    QcInspectionApprove,
    #[serde(rename = "invitation.manage")]
    InvitationManage,
    #[serde(rename = "user.manage")]
    UserManage,
}

impl Permission {
    pub const ALL: [Permission; 21] = [
        Permission::ProjectCreate,
        Permission::ProjectUpdate,
        Permission::ProjectDelete,
        Permission::TaskUpdate,
        Permission::TaskDelete,
        Permission::DocumentCreate,
        Permission::DocumentUpdate,
        Permission::DocumentDelete,
        Permission::ComponentCreate,
        Permission::ComponentView,
        Permission::ComponentUpdate,
        Permission::TeamCreate,
        Permission::TeamManage,
        Permission::TemplateCreate,
        Permission::ChangeRequestApprove,
        Permission::RfiAnswer,
        Permission::NcrApprove,
        Permission::QcPlanApprove,
        Permission::QcInspectionApprove,
        Permission::InvitationManage,
        Permission::UserManage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ProjectCreate => "project.create",
            Permission::ProjectUpdate => "project.update",
            Permission::ProjectDelete => "project.delete",
            Permission::TaskUpdate => "task.update",
            Permission::TaskDelete => "task.delete",
            Permission::DocumentCreate => "document.create",
            Permission::DocumentUpdate => "document.update",
            Permission::DocumentDelete => "document.delete",
            Permission::ComponentCreate => "component.create",
            Permission::ComponentView => "component.view",
            Permission::ComponentUpdate => "component.update",
            Permission::TeamCreate => "team.create",
            Permission::TeamManage => "team.manage",
            Permission::TemplateCreate => "template.create",
            Permission::ChangeRequestApprove => "change_request.approve",
            Permission::RfiAnswer => "rfi.answer",
            Permission::NcrApprove => "ncr.approve",
            Permission::QcPlanApprove => "qc_plan.approve",
            Permission::QcInspectionApprove => "qc_inspection.approve",
            Permission::InvitationManage => "invitation.manage",
            Permission::UserManage => "user.manage",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|perm| perm.as_str() == s)
            .ok_or_else(|| UnknownName { kind: "permission", value: s.to_string() })
    }
}

/// Actor represents the authenticated principal for one request.
///
/// Built once per request by an [`ActorResolver`](super::resolver::ActorResolver)
/// and never mutated by the engine. `tenant_id = None` is a valid state that
/// fails every tenant-scoped check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub tenant_id: Option<TenantId>,
    pub actor_id: ActorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: BTreeSet<Role>,
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
}

impl Actor {
    pub fn new(actor_id: ActorId, tenant_id: Option<TenantId>) -> Self {
        Self {
            tenant_id,
            actor_id,
            email: None,
            roles: BTreeSet::new(),
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    pub fn with_permissions(mut self, perms: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions = perms.into_iter().collect();
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.roles.contains(role))
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}
