use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actor::{ActorId, TenantId, UnknownName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Project,
    Task,
    Document,
    Component,
    Team,
    Template,
    ChangeRequest,
    Rfi,
    Ncr,
    QcPlan,
    QcInspection,
    Invitation,
    Notification,
    User,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 14] = [
        ResourceKind::Project,
        ResourceKind::Task,
        ResourceKind::Document,
        ResourceKind::Component,
        ResourceKind::Team,
        ResourceKind::Template,
        ResourceKind::ChangeRequest,
        ResourceKind::Rfi,
        ResourceKind::Ncr,
        ResourceKind::QcPlan,
        ResourceKind::QcInspection,
        ResourceKind::Invitation,
        ResourceKind::Notification,
        ResourceKind::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Task => "task",
            ResourceKind::Document => "document",
            ResourceKind::Component => "component",
            ResourceKind::Team => "team",
            ResourceKind::Template => "template",
            ResourceKind::ChangeRequest => "change_request",
            ResourceKind::Rfi => "rfi",
            ResourceKind::Ncr => "ncr",
            ResourceKind::QcPlan => "qc_plan",
            ResourceKind::QcInspection => "qc_inspection",
            ResourceKind::Invitation => "invitation",
            ResourceKind::Notification => "notification",
            ResourceKind::User => "user",
        }
    }

    /// Kind of the record this kind hangs off, if any.
    pub fn parent_kind(&self) -> Option<ResourceKind> {
        match self {
            ResourceKind::QcInspection => Some(ResourceKind::QcPlan),
            ResourceKind::Task
            | ResourceKind::Document
            | ResourceKind::ChangeRequest
            | ResourceKind::Rfi
            | ResourceKind::Ncr
            | ResourceKind::QcPlan => Some(ResourceKind::Project),
            ResourceKind::Project
            | ResourceKind::Component
            | ResourceKind::Team
            | ResourceKind::Template
            | ResourceKind::Invitation
            | ResourceKind::Notification
            | ResourceKind::User => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownName { kind: "resource kind", value: s.to_string() })
    }
}

/// Lifecycle states shared by the guarded records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Draft,
    Pending,
    Submitted,
    Open,
    InProgress,
    UnderReview,
    Approved,
    Rejected,
    Answered,
    Completed,
    Closed,
    Cancelled,
    Accepted,
    Declined,
    Expired,
}

impl Status {
    pub const ALL: [Status; 15] = [
        Status::Draft,
        Status::Pending,
        Status::Submitted,
        Status::Open,
        Status::InProgress,
        Status::UnderReview,
        Status::Approved,
        Status::Rejected,
        Status::Answered,
        Status::Completed,
        Status::Closed,
        Status::Cancelled,
        Status::Accepted,
        Status::Declined,
        Status::Expired,
    ];
}

/// Reference to a parent that has not been loaded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: Uuid,
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// The parent link of a project-scoped record: either joined by the caller
/// or left for a [`ParentResolver`](super::engine::ParentResolver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parent {
    Loaded(Box<Resource>),
    Reference(ResourceRef),
}

/// Generalized view of a guarded record, already materialized by the caller.
///
/// Ownership relations are optional and distinct: a missing creator, owner,
/// assignee or leader never matches anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub kind: ResourceKind,
    pub tenant_id: Option<TenantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<ActorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<ActorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<ActorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<ActorId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub members: BTreeSet<ActorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitee_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Parent>,
}

impl Resource {
    pub fn new(kind: ResourceKind, tenant_id: Option<TenantId>) -> Self {
        Self {
            id: None,
            kind,
            tenant_id,
            owner_id: None,
            creator_id: None,
            assignee_id: None,
            leader_id: None,
            members: BTreeSet::new(),
            status: None,
            is_public: false,
            invitee_email: None,
            parent: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_owner(mut self, owner: ActorId) -> Self {
        self.owner_id = Some(owner);
        self
    }

    pub fn with_creator(mut self, creator: ActorId) -> Self {
        self.creator_id = Some(creator);
        self
    }

    pub fn with_assignee(mut self, assignee: ActorId) -> Self {
        self.assignee_id = Some(assignee);
        self
    }

    pub fn with_leader(mut self, leader: ActorId) -> Self {
        self.leader_id = Some(leader);
        self
    }

    pub fn with_members(mut self, members: impl IntoIterator<Item = ActorId>) -> Self {
        self.members = members.into_iter().collect();
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    pub fn with_invitee_email(mut self, email: impl Into<String>) -> Self {
        self.invitee_email = Some(email.into());
        self
    }

    pub fn with_parent(mut self, parent: Resource) -> Self {
        self.parent = Some(Parent::Loaded(Box::new(parent)));
        self
    }

    pub fn with_parent_ref(mut self, kind: ResourceKind, id: Uuid) -> Self {
        self.parent = Some(Parent::Reference(ResourceRef { kind, id }));
        self
    }

    /// Short label for logs, e.g. `change_request 5f0c...` or `change_request (unsaved)`.
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => format!("{} {}", self.kind, id),
            None => format!("{} (unsaved)", self.kind),
        }
    }
}
