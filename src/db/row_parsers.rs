use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::errors::AppError;

/// One row of the resolver's identity query: the user's columns repeated
/// alongside at most one role or permission grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRow {
    pub email: String,
    pub tenant_id: Option<Uuid>,
    pub is_active: bool,
    pub grant: Option<Grant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    Role(String),
    Permission(String),
}

pub fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s.trim()).map_err(|e| AppError::internal(format!("invalid uuid '{}': {}", s, e)))
}

/// Empty strings are treated like NULL.
pub fn parse_opt_uuid(s: Option<String>) -> Result<Option<Uuid>, AppError> {
    match s {
        Some(s) if !s.trim().is_empty() => Ok(Some(parse_uuid(&s)?)),
        _ => Ok(None),
    }
}

pub fn identity_row_from_row(row: &SqliteRow) -> Result<IdentityRow, AppError> {
    let email: String = row.try_get("email").map_err(|e| AppError::internal(format!("missing email: {}", e)))?;
    let tenant_id_s: Option<String> = row.try_get("tenant_id").map_err(|e| AppError::internal(format!("missing tenant_id: {}", e)))?;
    let is_active: i64 = row.try_get("is_active").map_err(|e| AppError::internal(format!("missing is_active: {}", e)))?;
    let grant_kind: Option<String> = row.try_get("grant_kind").map_err(|e| AppError::internal(format!("missing grant_kind: {}", e)))?;
    let grant_name: Option<String> = row.try_get("grant_name").map_err(|e| AppError::internal(format!("missing grant_name: {}", e)))?;

    let grant = match (grant_kind.as_deref(), grant_name) {
        (Some("role"), Some(name)) => Some(Grant::Role(name)),
        (Some("permission"), Some(name)) => Some(Grant::Permission(name)),
        (None, _) | (_, None) => None,
        (Some(other), Some(_)) => return Err(AppError::internal(format!("unknown grant kind: {}", other))),
    };

    Ok(IdentityRow {
        email,
        tenant_id: parse_opt_uuid(tenant_id_s)?,
        is_active: is_active != 0,
        grant,
    })
}
