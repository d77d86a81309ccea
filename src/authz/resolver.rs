//! Actor context resolution: principal -> [`Actor`].
//!
//! Resolvers perform a single read per request and never cache. A principal
//! that cannot be resolved is `Unauthenticated`, which callers must keep
//! apart from an authorization `Deny`.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::actor::{Actor, ActorId, Permission, Role, TenantId};
use crate::db::row_parsers::{identity_row_from_row, Grant};
use crate::errors::{AppError, AppResult};
use crate::jwt::{bearer_token, JwtConfig};

/// The authenticated identity handed over by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
}

impl Principal {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Builds the immutable actor for one request.
#[async_trait]
pub trait ActorResolver: Send + Sync {
    async fn resolve(&self, principal: &Principal) -> AppResult<Actor>;
}

/// Reads the user, their roles, role permissions and direct permissions in
/// one query against the SQLite identity store.
#[derive(Debug, Clone)]
pub struct SqliteActorResolver {
    pool: SqlitePool,
}

const IDENTITY_QUERY: &str = r#"
    SELECT u.email, u.tenant_id, u.is_active, g.grant_kind, g.grant_name
    FROM users u
    LEFT JOIN (
        SELECT ur.user_id AS user_id, 'role' AS grant_kind, r.name AS grant_name
        FROM user_roles ur
        INNER JOIN roles r ON r.id = ur.role_id
        UNION ALL
        SELECT ur.user_id, 'permission', p.name
        FROM user_roles ur
        INNER JOIN role_permissions rp ON rp.role_id = ur.role_id
        INNER JOIN permissions p ON p.id = rp.permission_id
        UNION ALL
        SELECT up.user_id, 'permission', p.name
        FROM user_permissions up
        INNER JOIN permissions p ON p.id = up.permission_id
    ) g ON g.user_id = u.id
    WHERE u.id = ?
"#;

impl SqliteActorResolver {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActorResolver for SqliteActorResolver {
    async fn resolve(&self, principal: &Principal) -> AppResult<Actor> {
        let rows = sqlx::query(IDENTITY_QUERY)
            .bind(principal.user_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        let Some(first) = rows.first() else {
            return Err(AppError::unauthenticated(format!("unknown user {}", principal.user_id)));
        };
        let user = identity_row_from_row(first)?;

        let mut roles = BTreeSet::new();
        let mut permissions = BTreeSet::new();
        for row in &rows {
            match identity_row_from_row(row)?.grant {
                Some(Grant::Role(name)) => match name.parse::<Role>() {
                    Ok(role) => {
                        roles.insert(role);
                    }
                    Err(err) => tracing::warn!(user_id = %principal.user_id, error = %err, "dropping role"),
                },
                Some(Grant::Permission(name)) => match name.parse::<Permission>() {
                    Ok(permission) => {
                        permissions.insert(permission);
                    }
                    Err(err) => tracing::warn!(user_id = %principal.user_id, error = %err, "dropping permission"),
                },
                None => {}
            }
        }

        // A deactivated account keeps its identity but loses its tenant, so
        // every tenant-scoped check denies.
        let tenant_id = if user.is_active { user.tenant_id.map(TenantId) } else { None };
        if !user.is_active {
            tracing::info!(user_id = %principal.user_id, "resolved deactivated user without tenant");
        }

        Ok(Actor::new(ActorId(principal.user_id), tenant_id)
            .with_email(user.email)
            .with_roles(roles)
            .with_permissions(permissions))
    }
}

/// Decodes a bearer token into a [`Principal`] and delegates to `R`.
#[derive(Debug, Clone)]
pub struct TokenResolver<R> {
    jwt: JwtConfig,
    inner: R,
}

impl<R: ActorResolver> TokenResolver<R> {
    pub fn new(jwt: JwtConfig, inner: R) -> Self {
        Self { jwt, inner }
    }

    pub fn principal(&self, authorization: &str) -> AppResult<Principal> {
        let token = bearer_token(authorization).ok_or_else(|| AppError::unauthenticated("missing bearer token"))?;
        let claims = self
            .jwt
            .decode(token)
            .map_err(|err| AppError::unauthenticated(format!("invalid token: {err}")))?;
        Ok(Principal::new(claims.sub))
    }

    pub async fn resolve_token(&self, authorization: &str) -> AppResult<Actor> {
        let principal = self.principal(authorization)?;
        self.inner.resolve(&principal).await
    }
}

#[async_trait]
impl<R: ActorResolver> ActorResolver for TokenResolver<R> {
    async fn resolve(&self, principal: &Principal) -> AppResult<Actor> {
        self.inner.resolve(principal).await
    }
}

/// Fixed set of actors keyed by user id.
#[derive(Debug, Clone, Default)]
pub struct StaticActorResolver {
    actors: HashMap<Uuid, Actor>,
}

impl StaticActorResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actors.insert(actor.actor_id.0, actor);
        self
    }
}

#[async_trait]
impl ActorResolver for StaticActorResolver {
    async fn resolve(&self, principal: &Principal) -> AppResult<Actor> {
        self.actors
            .get(&principal.user_id)
            .cloned()
            .ok_or_else(|| AppError::unauthenticated(format!("unknown user {}", principal.user_id)))
    }
}
