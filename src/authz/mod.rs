//! Authorization module - policy engine, rule tables and actor resolution
//!
//! Every check runs in a fixed order:
//! - tenant gate (actor, resource, loaded parents)
//! - ordered allow rules of the resource kind for the action
//! - default deny
//!
//! Rules are data (`Predicate` trees) so a new resource kind is a new table,
//! not a new evaluator.

mod action;
mod actor;
mod decision;
mod engine;
mod predicate;
mod resolver;
mod resource;
mod rule;
pub mod tables;

pub use action::Action;
pub use actor::{Actor, ActorId, Permission, Role, TenantId, UnknownName};
pub use decision::{Decision, DenyReason};
pub use engine::{NoParentResolver, ParentResolver, PolicyEngine};
pub use predicate::Predicate;
pub use resolver::{ActorResolver, Principal, SqliteActorResolver, StaticActorResolver, TokenResolver};
pub use resource::{Parent, Resource, ResourceKind, ResourceRef, Status};
pub use rule::{Rule, RuleBook, RuleId, RuleTable};
