//! 课表管理
//!
//! Session scheduling: single sessions, weekly recurring batches and
//! deletion with compensation. `start_at` is derived once at creation from
//! the studio's business timezone; every later time comparison uses that
//! instant only.

use chrono_tz::Tz;
use shared::models::{RepeatPattern, SessionCreate, SessionCreated};
use sqlx::SqlitePool;

use super::actor::Actor;
use super::engine;
use super::error::{BookingError, BookingResult};
use crate::db::repository::{RepoError, member, reservation, session};
use crate::utils::time;

/// 创建课程（单次或周期批量）
///
/// Recurring batches always step one week at a time; the repeat pattern
/// picks the occurrence count (weekly 12, biweekly 24, monthly 48). A batch
/// occurrence whose (date, time) slot is already taken is skipped silently;
/// a single create on a taken slot is an error. Members listed in
/// `member_ids` are auto-reserved onto every created occurrence and the
/// sessions are flagged `is_reserved`.
pub async fn create_session(
    pool: &SqlitePool,
    actor: &Actor,
    data: SessionCreate,
    tz: Tz,
    now_ms: i64,
) -> BookingResult<SessionCreated> {
    actor.require_admin()?;
    if data.capacity < 1 {
        return Err(BookingError::BadCapacity);
    }
    let first_date = time::parse_date(&data.date)
        .map_err(|e| BookingError::InvalidInput(e.to_string()))?;
    let time_of_day = time::parse_time(&data.time)
        .map_err(|e| BookingError::InvalidInput(e.to_string()))?;
    let time_str = time_of_day.format("%H:%M").to_string();
    let is_reserved = !data.member_ids.is_empty();

    if !data.recurring {
        if session::exists_at(pool, actor.tenant_id, &data.date, &time_str).await? {
            return Err(BookingError::DuplicateSession);
        }
        let start_at = time::datetime_to_millis(first_date, time_of_day, tz);
        let created = session::create(
            pool,
            actor.tenant_id,
            &data.date,
            &time_str,
            start_at,
            data.capacity,
            data.notes.as_deref(),
            None,
            is_reserved,
        )
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => BookingError::DuplicateSession,
            other => BookingError::Repo(other),
        })?;

        if is_reserved {
            engine::auto_reserve(pool, actor, created.id, &data.member_ids, now_ms).await?;
        }
        tracing::info!(
            tenant_id = actor.tenant_id,
            session_id = created.id,
            date = %data.date,
            time = %time_str,
            "Session created"
        );
        return Ok(SessionCreated {
            mode: "single".into(),
            count: 1,
            session_ids: vec![created.id],
            recur_group_id: None,
        });
    }

    let occurrences = data
        .repeat_pattern
        .unwrap_or(RepeatPattern::Weekly)
        .occurrences();
    let group_id = uuid::Uuid::new_v4().to_string();
    let mut session_ids = Vec::new();

    for week in 0..occurrences {
        let date = time::format_date(time::add_weeks(first_date, week));
        // Occupied slots in a batch are skipped, not fatal
        if session::exists_at(pool, actor.tenant_id, &date, &time_str).await? {
            tracing::debug!(
                tenant_id = actor.tenant_id,
                date = %date,
                time = %time_str,
                "Skipping occupied slot in recurring batch"
            );
            continue;
        }
        let start_at = time::session_start_millis(&date, &time_str, tz)
            .map_err(|e| BookingError::InvalidInput(e.to_string()))?;
        let created = match session::create(
            pool,
            actor.tenant_id,
            &date,
            &time_str,
            start_at,
            data.capacity,
            data.notes.as_deref(),
            Some(&group_id),
            is_reserved,
        )
        .await
        {
            Ok(s) => s,
            Err(RepoError::Duplicate(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        if is_reserved {
            engine::auto_reserve(pool, actor, created.id, &data.member_ids, now_ms).await?;
        }
        session_ids.push(created.id);
    }

    tracing::info!(
        tenant_id = actor.tenant_id,
        count = session_ids.len(),
        group_id = %group_id,
        "Recurring sessions created"
    );
    Ok(SessionCreated {
        mode: "recurring".into(),
        count: session_ids.len() as u32,
        session_ids,
        recur_group_id: Some(group_id),
    })
}

/// 删除课程并补偿
///
/// Past sessions are immutable. Deleting refunds one credit per attended
/// reservation (the sweep had debited them), then removes the session and
/// all of its reservations in one transaction.
pub async fn delete_session(
    pool: &SqlitePool,
    actor: &Actor,
    session_id: i64,
    now_ms: i64,
) -> BookingResult<()> {
    actor.require_admin()?;
    let mut tx = pool.begin().await?;

    let sess = session::load(&mut tx, actor.tenant_id, session_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Session {session_id} not found")))?;
    if sess.start_at <= now_ms {
        return Err(BookingError::PastSessionImmutable);
    }

    for resv in reservation::find_by_session(&mut tx, session_id).await? {
        if resv.status == shared::models::ReservationStatus::Attended {
            member::refund_credit(&mut tx, resv.member_id).await?;
        }
    }
    session::delete(&mut tx, session_id).await?;
    tx.commit().await?;

    tracing::info!(
        tenant_id = actor.tenant_id,
        session_id,
        "Session deleted"
    );
    Ok(())
}
