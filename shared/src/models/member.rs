//! Member Model

use serde::{Deserialize, Serialize};

/// Member entity (üye)
///
/// `full_name` is stored in canonical form (see `util::canonical_name`) and
/// is unique per tenant, case-insensitively. `credits` is the number of
/// sessions the member may still attend; it is debited by the sweep, never
/// at reservation time, and never goes below zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Member {
    pub id: i64,
    pub tenant_id: i64,
    pub full_name: String,
    pub credits: i64,
    pub created_at: i64,
}

/// Create member payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberCreate {
    pub full_name: String,
    /// Initial credit balance; negative values are clamped to 0
    #[serde(default)]
    pub credits: i64,
}

/// Credit adjustment payload (admin)
///
/// The resulting balance is floored at 0, never rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditAdjust {
    pub delta: i64,
}
