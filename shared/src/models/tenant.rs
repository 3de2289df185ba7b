//! Tenant Model

use serde::{Deserialize, Serialize};

/// Tenant entity — an isolated studio account
///
/// Every other entity carries a `tenant_id`; deleting a tenant cascades to
/// all of its rows explicitly (the schema has no implicit tenant cascade).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    /// Subdomain-style prefix the fronting proxy routes on (`x-studio` header)
    pub domain_prefix: String,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create tenant payload (super-admin only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantCreate {
    pub name: String,
    pub domain_prefix: String,
}
