pub mod audit;
pub mod authz;
pub mod check;
pub mod config;
pub mod db;
pub mod errors;
pub mod jwt;

// Re-export commonly used items for tests
pub use authz::{Action, Actor, Decision, PolicyEngine, Resource, ResourceKind};
pub use config::AuthzConfig;
pub use errors::{AppError, AppResult};
