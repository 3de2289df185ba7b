//! Measurement Model

use serde::{Deserialize, Serialize};

/// Body measurement entry, owned by a member (deleted with it)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Measurement {
    pub id: i64,
    pub tenant_id: i64,
    pub member_id: i64,
    /// `YYYY-MM-DD`
    pub date: String,
    pub weight: f64,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub chest: Option<f64>,
}

/// Create measurement payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementCreate {
    /// `YYYY-MM-DD`; defaults to today in the business timezone
    #[serde(default)]
    pub date: Option<String>,
    pub weight: f64,
    #[serde(default)]
    pub waist: Option<f64>,
    #[serde(default)]
    pub hip: Option<f64>,
    #[serde(default)]
    pub chest: Option<f64>,
}
