//! Session Model

use serde::{Deserialize, Serialize};

/// Bookable class instance
///
/// `date` (`YYYY-MM-DD`) and `time` (`HH:MM`) are what admins schedule;
/// `start_at` is the derived Unix-millis instant in the studio's business
/// timezone and is what every time comparison (sweep, 24h window) uses.
///
/// Invariant: `0 <= spots_left <= capacity`, enforced by CHECK constraints
/// and only ever changed through the conditional claim/release updates in
/// the session repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Session {
    pub id: i64,
    pub tenant_id: i64,
    pub date: String,
    pub time: String,
    pub start_at: i64,
    pub capacity: i64,
    pub spots_left: i64,
    pub notes: Option<String>,
    pub is_recurring: bool,
    /// Shared by every session created in one recurring batch
    pub recur_group_id: Option<String>,
    /// Flipped true exactly once by the sweep, never back
    pub completed: bool,
    /// Session was created with pre-assigned members
    pub is_reserved: bool,
}

/// Recurring batch presets
///
/// Every preset steps in one-week increments; the pattern only picks how
/// many occurrences the batch creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatPattern {
    Weekly,
    Biweekly,
    Monthly,
}

impl RepeatPattern {
    /// Number of weekly occurrences the preset expands to
    pub fn occurrences(&self) -> u32 {
        match self {
            RepeatPattern::Weekly => 12,
            RepeatPattern::Biweekly => 24,
            RepeatPattern::Monthly => 48,
        }
    }
}

/// Create session payload (single or recurring batch)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreate {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    #[serde(default = "default_capacity")]
    pub capacity: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub recurring: bool,
    /// Preset picking the batch size; ignored unless `recurring`
    #[serde(default)]
    pub repeat_pattern: Option<RepeatPattern>,
    /// Members to auto-reserve onto every created occurrence
    #[serde(default)]
    pub member_ids: Vec<i64>,
}

fn default_capacity() -> i64 {
    4
}

/// Result of a session create call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    /// "single" or "recurring"
    pub mode: String,
    /// Sessions actually created (duplicates in a batch are skipped)
    pub count: u32,
    pub session_ids: Vec<i64>,
    pub recur_group_id: Option<String>,
}

/// Participant row for the admin session detail view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SessionParticipant {
    pub reservation_id: i64,
    pub member_id: i64,
    pub full_name: String,
    pub status: super::ReservationStatus,
    pub cancel_status: super::CancelStatus,
    pub created_at: i64,
}
