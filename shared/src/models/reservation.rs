//! Reservation Model

use serde::{Deserialize, Serialize};

/// Reservation lifecycle status
///
/// `active → {canceled, moved, attended}`; `canceled` and `moved` are
/// terminal, `attended` has one back-edge to `canceled` via the admin refund
/// paths. `no_show` is part of the persisted status set but no operation
/// currently produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ReservationStatus {
    Active,
    Canceled,
    Moved,
    Attended,
    NoShow,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "active",
            ReservationStatus::Canceled => "canceled",
            ReservationStatus::Moved => "moved",
            ReservationStatus::Attended => "attended",
            ReservationStatus::NoShow => "no_show",
        }
    }
}

/// Cancellation-request workflow state, orthogonal to `ReservationStatus`
///
/// `none → pending → {approved, rejected}`; only enterable from `none` or
/// `pending` (resubmission) while the reservation is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum CancelStatus {
    None,
    Pending,
    Approved,
    Rejected,
}

impl CancelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelStatus::None => "none",
            CancelStatus::Pending => "pending",
            CancelStatus::Approved => "approved",
            CancelStatus::Rejected => "rejected",
        }
    }
}

/// Reservation entity — a member's claim on a session slot
///
/// References the member by id (a proper owned relation, not the name string
/// the legacy system used).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub tenant_id: i64,
    pub member_id: i64,
    pub session_id: i64,
    pub status: ReservationStatus,
    pub cancel_status: CancelStatus,
    pub cancel_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Reservation joined with its session, for member dashboards and the admin
/// cancel-request queue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReservationWithSession {
    pub id: i64,
    pub member_id: i64,
    pub session_id: i64,
    pub status: ReservationStatus,
    pub cancel_status: CancelStatus,
    pub cancel_reason: Option<String>,
    pub session_date: String,
    pub session_time: String,
    pub session_start_at: i64,
    pub session_notes: Option<String>,
    pub created_at: i64,
}

/// Cancellation request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequestPayload {
    pub reason: String,
}

/// Move payload — target session for an active reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovePayload {
    pub target_id: i64,
}
