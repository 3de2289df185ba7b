//! 会员名册与课时账
//!
//! Member roster rules: canonical unique names per tenant, the credit floor,
//! cascade deletion, and the per-member measurement log. Pure listings live
//! directly on the repository; only rule-bearing operations pass through
//! here.

use chrono_tz::Tz;
use shared::models::{Measurement, MeasurementCreate, Member, MemberCreate};
use shared::util::canonical_name;
use sqlx::SqlitePool;

use super::actor::Actor;
use super::error::{BookingError, BookingResult};
use crate::db::repository::{RepoError, measurement, member};
use crate::utils::time;

/// 登记会员
///
/// The name is canonicalized (trimmed, inner whitespace collapsed) before
/// the case-insensitive per-tenant uniqueness check; a negative starting
/// balance is clamped to zero rather than rejected.
pub async fn create_member(
    pool: &SqlitePool,
    actor: &Actor,
    data: MemberCreate,
) -> BookingResult<Member> {
    actor.require_admin()?;
    let canonical = canonical_name(&data.full_name);
    if canonical.is_empty() {
        return Err(BookingError::InvalidInput("Member name is required".into()));
    }
    let created = member::create(pool, actor.tenant_id, &canonical, data.credits.max(0))
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => BookingError::DuplicateMember,
            other => BookingError::Repo(other),
        })?;
    tracing::info!(
        tenant_id = actor.tenant_id,
        member_id = created.id,
        "Member registered"
    );
    Ok(created)
}

/// 调整课时：`credits = MAX(0, credits + delta)`
pub async fn adjust_credits(
    pool: &SqlitePool,
    actor: &Actor,
    member_id: i64,
    delta: i64,
) -> BookingResult<Member> {
    actor.require_admin()?;
    let updated = member::adjust_credits(pool, actor.tenant_id, member_id, delta).await?;
    tracing::info!(
        tenant_id = actor.tenant_id,
        member_id,
        delta,
        balance = updated.credits,
        "Credits adjusted"
    );
    Ok(updated)
}

/// 注销会员（级联删除其体测记录和预约）
pub async fn delete_member(pool: &SqlitePool, actor: &Actor, member_id: i64) -> BookingResult<()> {
    actor.require_admin()?;
    if !member::delete_cascade(pool, actor.tenant_id, member_id).await? {
        return Err(BookingError::NotFound(format!(
            "Member {member_id} not found"
        )));
    }
    tracing::info!(tenant_id = actor.tenant_id, member_id, "Member removed");
    Ok(())
}

/// 记录体测数据；日期缺省为营业时区的今天
pub async fn add_measurement(
    pool: &SqlitePool,
    actor: &Actor,
    member_id: i64,
    data: MeasurementCreate,
    tz: Tz,
    now_ms: i64,
) -> BookingResult<Measurement> {
    actor.require_admin()?;
    member::find_by_id(pool, actor.tenant_id, member_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Member {member_id} not found")))?;

    let date = match &data.date {
        Some(d) => {
            time::parse_date(d).map_err(|e| BookingError::InvalidInput(e.to_string()))?;
            d.clone()
        }
        None => time::format_date(time::today(now_ms, tz)),
    };
    if data.weight <= 0.0 {
        return Err(BookingError::InvalidInput(
            "Weight must be positive".into(),
        ));
    }

    let created = measurement::create(
        pool,
        actor.tenant_id,
        member_id,
        &date,
        data.weight,
        data.waist,
        data.hip,
        data.chest,
    )
    .await?;
    Ok(created)
}

/// 体测历史，按日期倒序
pub async fn list_measurements(
    pool: &SqlitePool,
    actor: &Actor,
    member_id: i64,
) -> BookingResult<Vec<Measurement>> {
    actor.require_admin()?;
    member::find_by_id(pool, actor.tenant_id, member_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Member {member_id} not found")))?;
    Ok(measurement::find_by_member(pool, actor.tenant_id, member_id).await?)
}

pub async fn delete_measurement(
    pool: &SqlitePool,
    actor: &Actor,
    measurement_id: i64,
) -> BookingResult<()> {
    actor.require_admin()?;
    if !measurement::delete(pool, actor.tenant_id, measurement_id).await? {
        return Err(BookingError::NotFound(format!(
            "Measurement {measurement_id} not found"
        )));
    }
    Ok(())
}
