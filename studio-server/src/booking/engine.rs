//! 预约引擎
//!
//! Reservation lifecycle: reserve, cancel, the cancellation-request
//! workflow, the admin override paths, move, and bulk auto-reserve. Each
//! operation runs inside one transaction, does all of its reads through that
//! transaction's connection, and takes the clock value (`now_ms`) as an
//! argument so every time rule is deterministic under test.
//!
//! Capacity is never read-then-written: `claim_spot` is a conditional
//! `UPDATE ... WHERE spots_left > 0` checked by rows-affected, which is what
//! makes two concurrent reservations unable to share the last spot.

use shared::models::{Reservation, ReservationStatus};
use sqlx::SqlitePool;

use super::actor::Actor;
use super::error::{BookingError, BookingResult};
use crate::db::repository::{RepoError, member, reservation, session};

/// 开课前 24 小时内禁止自助取消
pub const CANCEL_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// 会员自助预约
///
/// Checks, in order: session open, spots left, positive credit balance, no
/// existing active reservation. Credits are NOT debited here; that happens
/// in the sweep once the session has actually run.
pub async fn reserve(
    pool: &SqlitePool,
    actor: &Actor,
    session_id: i64,
    now_ms: i64,
) -> BookingResult<Reservation> {
    let member_id = actor.require_member()?;
    let mut tx = pool.begin().await?;

    let sess = session::load(&mut tx, actor.tenant_id, session_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Session {session_id} not found")))?;
    if sess.completed || sess.start_at <= now_ms {
        return Err(BookingError::SessionClosed);
    }
    if sess.spots_left <= 0 {
        return Err(BookingError::SessionFull);
    }

    let mem = member::load(&mut tx, actor.tenant_id, member_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Member {member_id} not found")))?;
    if mem.credits <= 0 {
        return Err(BookingError::InsufficientCredits);
    }
    if reservation::exists_active(&mut tx, member_id, session_id).await? {
        return Err(BookingError::AlreadyReserved);
    }

    // Atomic claim; loses the race → full after all.
    if !session::claim_spot(&mut tx, session_id).await? {
        return Err(BookingError::SessionFull);
    }
    let id = reservation::insert_active(&mut tx, actor.tenant_id, member_id, session_id, now_ms)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => BookingError::AlreadyReserved,
            other => BookingError::Repo(other),
        })?;

    let created = reservation::load(&mut tx, actor.tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Reservation vanished mid-transaction".into()))?;
    tx.commit().await?;

    tracing::info!(
        tenant_id = actor.tenant_id,
        member_id,
        session_id,
        reservation_id = id,
        "Reservation created"
    );
    Ok(created)
}

/// 会员自助取消（开课 24 小时前）
///
/// Frees the spot; credits are untouched because none were taken at reserve
/// time.
pub async fn cancel(
    pool: &SqlitePool,
    actor: &Actor,
    reservation_id: i64,
    now_ms: i64,
) -> BookingResult<Reservation> {
    let member_id = actor.require_member()?;
    let mut tx = pool.begin().await?;

    let resv = reservation::load(&mut tx, actor.tenant_id, reservation_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Reservation {reservation_id} not found")))?;
    if resv.member_id != member_id {
        return Err(BookingError::Unauthorized);
    }
    if resv.status != ReservationStatus::Active {
        return Err(BookingError::InvalidState(format!(
            "Reservation is {}",
            resv.status.as_str()
        )));
    }

    let sess = session::load(&mut tx, actor.tenant_id, resv.session_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Session {} not found", resv.session_id)))?;
    if sess.start_at - now_ms < CANCEL_WINDOW_MS {
        return Err(BookingError::WindowClosed);
    }

    reservation::set_status(&mut tx, reservation_id, ReservationStatus::Canceled, now_ms).await?;
    session::release_spot(&mut tx, resv.session_id).await?;

    let updated = reservation::load(&mut tx, actor.tenant_id, reservation_id)
        .await?
        .ok_or_else(|| RepoError::Database("Reservation vanished mid-transaction".into()))?;
    tx.commit().await?;

    tracing::info!(
        tenant_id = actor.tenant_id,
        member_id,
        reservation_id,
        "Reservation canceled"
    );
    Ok(updated)
}

/// 提交取消申请（24 小时内走人工审核）
///
/// Deliberately has no 24-hour gate: the request queue exists precisely for
/// reservations inside the free-cancellation window. Resubmitting while a
/// request is still pending overwrites the reason; once reviewed
/// (approved/rejected) the workflow cannot be re-entered.
pub async fn request_cancellation(
    pool: &SqlitePool,
    actor: &Actor,
    reservation_id: i64,
    reason: &str,
    now_ms: i64,
) -> BookingResult<Reservation> {
    let member_id = actor.require_member()?;
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(BookingError::ReasonRequired);
    }

    let mut tx = pool.begin().await?;
    let resv = reservation::load(&mut tx, actor.tenant_id, reservation_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Reservation {reservation_id} not found")))?;
    if resv.member_id != member_id {
        return Err(BookingError::Unauthorized);
    }
    if resv.status != ReservationStatus::Active {
        return Err(BookingError::InvalidState(format!(
            "Reservation is {}",
            resv.status.as_str()
        )));
    }
    if matches!(
        resv.cancel_status,
        shared::models::CancelStatus::Approved | shared::models::CancelStatus::Rejected
    ) {
        return Err(BookingError::InvalidState(format!(
            "Cancellation request already {}",
            resv.cancel_status.as_str()
        )));
    }

    reservation::set_cancel_request(&mut tx, reservation_id, reason, now_ms).await?;
    let updated = reservation::load(&mut tx, actor.tenant_id, reservation_id)
        .await?
        .ok_or_else(|| RepoError::Database("Reservation vanished mid-transaction".into()))?;
    tx.commit().await?;
    Ok(updated)
}

/// 管理员批准取消申请
///
/// An active reservation is canceled and its spot released (unless the
/// session has already completed). If the sweep beat the review and marked
/// the reservation attended, approval refunds the credit instead.
pub async fn admin_approve(
    pool: &SqlitePool,
    actor: &Actor,
    reservation_id: i64,
    now_ms: i64,
) -> BookingResult<Reservation> {
    actor.require_admin()?;
    let mut tx = pool.begin().await?;

    let resv = reservation::load(&mut tx, actor.tenant_id, reservation_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Reservation {reservation_id} not found")))?;
    if resv.cancel_status != shared::models::CancelStatus::Pending {
        return Err(BookingError::InvalidState(
            "No pending cancellation request".into(),
        ));
    }

    match resv.status {
        ReservationStatus::Active => {
            let sess = session::load(&mut tx, actor.tenant_id, resv.session_id)
                .await?
                .ok_or_else(|| {
                    BookingError::NotFound(format!("Session {} not found", resv.session_id))
                })?;
            if !sess.completed {
                session::release_spot(&mut tx, resv.session_id).await?;
            }
        }
        ReservationStatus::Attended => {
            member::refund_credit(&mut tx, resv.member_id).await?;
        }
        other => {
            return Err(BookingError::InvalidState(format!(
                "Reservation is {}",
                other.as_str()
            )));
        }
    }

    reservation::set_status(&mut tx, reservation_id, ReservationStatus::Canceled, now_ms).await?;
    reservation::set_cancel_status(
        &mut tx,
        reservation_id,
        shared::models::CancelStatus::Approved,
        now_ms,
    )
    .await?;

    let updated = reservation::load(&mut tx, actor.tenant_id, reservation_id)
        .await?
        .ok_or_else(|| RepoError::Database("Reservation vanished mid-transaction".into()))?;
    tx.commit().await?;

    tracing::info!(
        tenant_id = actor.tenant_id,
        reservation_id,
        "Cancellation request approved"
    );
    Ok(updated)
}

/// 管理员驳回取消申请：预约保持有效
pub async fn admin_reject(
    pool: &SqlitePool,
    actor: &Actor,
    reservation_id: i64,
    now_ms: i64,
) -> BookingResult<Reservation> {
    actor.require_admin()?;
    let mut tx = pool.begin().await?;

    let resv = reservation::load(&mut tx, actor.tenant_id, reservation_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Reservation {reservation_id} not found")))?;
    if resv.cancel_status != shared::models::CancelStatus::Pending {
        return Err(BookingError::InvalidState(
            "No pending cancellation request".into(),
        ));
    }

    reservation::set_cancel_status(
        &mut tx,
        reservation_id,
        shared::models::CancelStatus::Rejected,
        now_ms,
    )
    .await?;
    let updated = reservation::load(&mut tx, actor.tenant_id, reservation_id)
        .await?
        .ok_or_else(|| RepoError::Database("Reservation vanished mid-transaction".into()))?;
    tx.commit().await?;
    Ok(updated)
}

/// 管理员强制取消并补偿，绕过 24 小时限制
///
/// attended → refund one credit; active on an open session → release the
/// spot. Either way the reservation ends canceled.
pub async fn admin_cancel_refund(
    pool: &SqlitePool,
    actor: &Actor,
    reservation_id: i64,
    now_ms: i64,
) -> BookingResult<Reservation> {
    actor.require_admin()?;
    let mut tx = pool.begin().await?;

    let resv = reservation::load(&mut tx, actor.tenant_id, reservation_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Reservation {reservation_id} not found")))?;

    match resv.status {
        ReservationStatus::Canceled | ReservationStatus::Moved => {
            return Err(BookingError::InvalidState(format!(
                "Reservation is already {}",
                resv.status.as_str()
            )));
        }
        ReservationStatus::Attended => {
            member::refund_credit(&mut tx, resv.member_id).await?;
        }
        ReservationStatus::Active => {
            let sess = session::load(&mut tx, actor.tenant_id, resv.session_id)
                .await?
                .ok_or_else(|| {
                    BookingError::NotFound(format!("Session {} not found", resv.session_id))
                })?;
            if !sess.completed {
                session::release_spot(&mut tx, resv.session_id).await?;
            }
        }
        ReservationStatus::NoShow => {}
    }

    reservation::set_status(&mut tx, reservation_id, ReservationStatus::Canceled, now_ms).await?;
    let updated = reservation::load(&mut tx, actor.tenant_id, reservation_id)
        .await?
        .ok_or_else(|| RepoError::Database("Reservation vanished mid-transaction".into()))?;
    tx.commit().await?;

    tracing::info!(
        tenant_id = actor.tenant_id,
        reservation_id,
        "Reservation canceled with compensation"
    );
    Ok(updated)
}

/// 换课：原预约置为 moved，目标课程建立新预约
///
/// 一个事务内完成；目标已满时整体回滚，原预约保持有效。
pub async fn move_reservation(
    pool: &SqlitePool,
    actor: &Actor,
    reservation_id: i64,
    target_session_id: i64,
    now_ms: i64,
) -> BookingResult<Reservation> {
    let member_id = actor.require_member()?;
    let mut tx = pool.begin().await?;

    let resv = reservation::load(&mut tx, actor.tenant_id, reservation_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Reservation {reservation_id} not found")))?;
    if resv.member_id != member_id {
        return Err(BookingError::Unauthorized);
    }
    if resv.status != ReservationStatus::Active {
        return Err(BookingError::InvalidState(format!(
            "Reservation is {}",
            resv.status.as_str()
        )));
    }
    if resv.session_id == target_session_id {
        return Err(BookingError::AlreadyReserved);
    }

    let target = session::load(&mut tx, actor.tenant_id, target_session_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Session {target_session_id} not found")))?;
    if target.completed || target.start_at <= now_ms {
        return Err(BookingError::SessionClosed);
    }
    if reservation::exists_active(&mut tx, member_id, target_session_id).await? {
        return Err(BookingError::AlreadyReserved);
    }

    // Claim the target first; failing here rolls back with the source
    // reservation untouched.
    if !session::claim_spot(&mut tx, target_session_id).await? {
        return Err(BookingError::SessionFull);
    }
    reservation::set_status(&mut tx, reservation_id, ReservationStatus::Moved, now_ms).await?;
    session::release_spot(&mut tx, resv.session_id).await?;
    let new_id = reservation::insert_active(
        &mut tx,
        actor.tenant_id,
        member_id,
        target_session_id,
        now_ms,
    )
    .await
    .map_err(|e| match e {
        RepoError::Duplicate(_) => BookingError::AlreadyReserved,
        other => BookingError::Repo(other),
    })?;

    let created = reservation::load(&mut tx, actor.tenant_id, new_id)
        .await?
        .ok_or_else(|| RepoError::Database("Reservation vanished mid-transaction".into()))?;
    tx.commit().await?;

    tracing::info!(
        tenant_id = actor.tenant_id,
        member_id,
        from = resv.session_id,
        to = target_session_id,
        "Reservation moved"
    );
    Ok(created)
}

/// 批量代订（管理员）
///
/// Skips unknown member ids and already-reserved pairs without failing, and
/// never checks credits or the booking window. Spots are decremented only
/// while positive; a pre-assigned roster is allowed to exceed capacity.
/// Returns how many reservations were created.
pub async fn auto_reserve(
    pool: &SqlitePool,
    actor: &Actor,
    session_id: i64,
    member_ids: &[i64],
    now_ms: i64,
) -> BookingResult<u32> {
    actor.require_admin()?;
    let mut tx = pool.begin().await?;

    session::load(&mut tx, actor.tenant_id, session_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Session {session_id} not found")))?;

    let mut created = 0u32;
    for &member_id in member_ids {
        if member::load(&mut tx, actor.tenant_id, member_id)
            .await?
            .is_none()
        {
            tracing::warn!(member_id, session_id, "Skipping unknown member in auto-reserve");
            continue;
        }
        if reservation::exists_active(&mut tx, member_id, session_id).await? {
            continue;
        }
        match reservation::insert_active(&mut tx, actor.tenant_id, member_id, session_id, now_ms)
            .await
        {
            Ok(_) => {}
            Err(RepoError::Duplicate(_)) => continue,
            Err(e) => return Err(e.into()),
        }
        // Best-effort: stops at zero instead of failing the batch.
        session::claim_spot(&mut tx, session_id).await?;
        created += 1;
    }
    tx.commit().await?;

    if created > 0 {
        tracing::info!(
            tenant_id = actor.tenant_id,
            session_id,
            created,
            "Auto-reserved members onto session"
        );
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::harness::{self, HOUR_MS, TENANT};
    use shared::models::CancelStatus;

    async fn spots_left(pool: &SqlitePool, session_id: i64) -> i64 {
        session::find_by_id(pool, TENANT, session_id)
            .await
            .unwrap()
            .unwrap()
            .spots_left
    }

    async fn credits(pool: &SqlitePool, member_id: i64) -> i64 {
        member::find_by_id(pool, TENANT, member_id)
            .await
            .unwrap()
            .unwrap()
            .credits
    }

    #[tokio::test]
    async fn four_members_fill_a_session_and_the_fifth_is_rejected() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", 48 * HOUR_MS, 4).await;

        for name in ["Ada", "Banu", "Ceren", "Derya"] {
            let m = harness::member(&pool, name, 5).await;
            reserve(&pool, &Actor::member(TENANT, m), sess, 0)
                .await
                .unwrap();
        }
        assert_eq!(spots_left(&pool, sess).await, 0);

        let fifth = harness::member(&pool, "Ece", 5).await;
        let err = reserve(&pool, &Actor::member(TENANT, fifth), sess, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SessionFull));
        assert_eq!(spots_left(&pool, sess).await, 0);
    }

    #[tokio::test]
    async fn reserve_requires_a_positive_credit_balance() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", 48 * HOUR_MS, 4).await;
        let broke = harness::member(&pool, "Ada", 0).await;

        let err = reserve(&pool, &Actor::member(TENANT, broke), sess, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InsufficientCredits));
        // Reserving never costs a credit up front either
        let funded = harness::member(&pool, "Banu", 1).await;
        reserve(&pool, &Actor::member(TENANT, funded), sess, 0)
            .await
            .unwrap();
        assert_eq!(credits(&pool, funded).await, 1);
    }

    #[tokio::test]
    async fn second_reservation_on_the_same_session_is_rejected() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", 48 * HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);

        reserve(&pool, &actor, sess, 0).await.unwrap();
        let err = reserve(&pool, &actor, sess, 0).await.unwrap_err();
        assert!(matches!(err, BookingError::AlreadyReserved));
        assert_eq!(spots_left(&pool, sess).await, 3);
    }

    #[tokio::test]
    async fn reserve_rejects_elapsed_and_completed_sessions() {
        let pool = harness::pool().await;
        let past = harness::session(&pool, "10:00", -HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);

        let err = reserve(&pool, &actor, past, 0).await.unwrap_err();
        assert!(matches!(err, BookingError::SessionClosed));

        let future = harness::session(&pool, "11:00", 48 * HOUR_MS, 4).await;
        harness::complete_session(&pool, future).await;
        let err = reserve(&pool, &actor, future, 0).await.unwrap_err();
        assert!(matches!(err, BookingError::SessionClosed));
    }

    #[tokio::test]
    async fn cancel_at_25h_succeeds_and_restores_the_spot() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", 25 * HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);

        let r = reserve(&pool, &actor, sess, 0).await.unwrap();
        assert_eq!(spots_left(&pool, sess).await, 3);

        let canceled = cancel(&pool, &actor, r.id, 0).await.unwrap();
        assert_eq!(canceled.status, ReservationStatus::Canceled);
        assert_eq!(spots_left(&pool, sess).await, 4);
        assert_eq!(credits(&pool, m).await, 5);
    }

    #[tokio::test]
    async fn cancel_at_23h_is_window_closed() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", 23 * HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);

        let r = reserve(&pool, &actor, sess, 0).await.unwrap();
        let err = cancel(&pool, &actor, r.id, 0).await.unwrap_err();
        assert!(matches!(err, BookingError::WindowClosed));
        assert_eq!(spots_left(&pool, sess).await, 3);
    }

    #[tokio::test]
    async fn cancel_is_owner_only_and_single_shot() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", 48 * HOUR_MS, 4).await;
        let owner = harness::member(&pool, "Ada", 5).await;
        let other = harness::member(&pool, "Banu", 5).await;

        let r = reserve(&pool, &Actor::member(TENANT, owner), sess, 0)
            .await
            .unwrap();

        let err = cancel(&pool, &Actor::member(TENANT, other), r.id, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Unauthorized));

        cancel(&pool, &Actor::member(TENANT, owner), r.id, 0)
            .await
            .unwrap();
        let err = cancel(&pool, &Actor::member(TENANT, owner), r.id, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidState(_)));
        assert_eq!(spots_left(&pool, sess).await, 4);
    }

    #[tokio::test]
    async fn cancellation_request_works_inside_the_24h_window() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);

        let r = reserve(&pool, &actor, sess, 0).await.unwrap();
        let updated = request_cancellation(&pool, &actor, r.id, "injured knee", 0)
            .await
            .unwrap();
        assert_eq!(updated.status, ReservationStatus::Active);
        assert_eq!(updated.cancel_status, CancelStatus::Pending);
        assert_eq!(updated.cancel_reason.as_deref(), Some("injured knee"));
        // The reservation itself is untouched until review
        assert_eq!(spots_left(&pool, sess).await, 3);
    }

    #[tokio::test]
    async fn cancellation_request_requires_a_reason_and_overwrites_on_resubmit() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);
        let r = reserve(&pool, &actor, sess, 0).await.unwrap();

        let err = request_cancellation(&pool, &actor, r.id, "   ", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::ReasonRequired));

        request_cancellation(&pool, &actor, r.id, "first reason", 0)
            .await
            .unwrap();
        let updated = request_cancellation(&pool, &actor, r.id, "second reason", 1)
            .await
            .unwrap();
        assert_eq!(updated.cancel_reason.as_deref(), Some("second reason"));
        assert_eq!(updated.cancel_status, CancelStatus::Pending);
    }

    #[tokio::test]
    async fn approve_cancels_an_active_reservation_and_frees_the_spot() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);
        let admin = Actor::admin(TENANT);

        let r = reserve(&pool, &actor, sess, 0).await.unwrap();
        request_cancellation(&pool, &actor, r.id, "sick", 0)
            .await
            .unwrap();

        let approved = admin_approve(&pool, &admin, r.id, 1).await.unwrap();
        assert_eq!(approved.status, ReservationStatus::Canceled);
        assert_eq!(approved.cancel_status, CancelStatus::Approved);
        assert_eq!(spots_left(&pool, sess).await, 4);
        assert_eq!(credits(&pool, m).await, 5);
    }

    #[tokio::test]
    async fn approve_after_sweep_refunds_the_debited_credit() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);
        let admin = Actor::admin(TENANT);

        let r = reserve(&pool, &actor, sess, 0).await.unwrap();
        request_cancellation(&pool, &actor, r.id, "sick", 0)
            .await
            .unwrap();

        // Session elapses and the sweep marks attendance before review
        super::super::sweep::run_sweep(&pool, 2 * HOUR_MS).await.unwrap();
        assert_eq!(credits(&pool, m).await, 4);

        let approved = admin_approve(&pool, &admin, r.id, 3 * HOUR_MS).await.unwrap();
        assert_eq!(approved.status, ReservationStatus::Canceled);
        assert_eq!(credits(&pool, m).await, 5);

        // A second approval has no pending request to act on
        let err = admin_approve(&pool, &admin, r.id, 3 * HOUR_MS)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidState(_)));
        assert_eq!(credits(&pool, m).await, 5);
    }

    #[tokio::test]
    async fn reject_leaves_the_reservation_active() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);

        let r = reserve(&pool, &actor, sess, 0).await.unwrap();
        request_cancellation(&pool, &actor, r.id, "sick", 0)
            .await
            .unwrap();

        let rejected = admin_reject(&pool, &Actor::admin(TENANT), r.id, 1)
            .await
            .unwrap();
        assert_eq!(rejected.status, ReservationStatus::Active);
        assert_eq!(rejected.cancel_status, CancelStatus::Rejected);
        assert_eq!(spots_left(&pool, sess).await, 3);
    }

    #[tokio::test]
    async fn admin_cancel_refund_bypasses_the_window() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);
        let admin = Actor::admin(TENANT);

        let r = reserve(&pool, &actor, sess, 0).await.unwrap();
        let canceled = admin_cancel_refund(&pool, &admin, r.id, 0).await.unwrap();
        assert_eq!(canceled.status, ReservationStatus::Canceled);
        assert_eq!(spots_left(&pool, sess).await, 4);

        let err = admin_cancel_refund(&pool, &admin, r.id, 1).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidState(_)));
    }

    #[tokio::test]
    async fn admin_cancel_refund_returns_the_credit_for_attended() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);

        let r = reserve(&pool, &actor, sess, 0).await.unwrap();
        super::super::sweep::run_sweep(&pool, 2 * HOUR_MS).await.unwrap();
        assert_eq!(credits(&pool, m).await, 4);

        admin_cancel_refund(&pool, &Actor::admin(TENANT), r.id, 3 * HOUR_MS)
            .await
            .unwrap();
        assert_eq!(credits(&pool, m).await, 5);
    }

    #[tokio::test]
    async fn move_swaps_the_spot_between_sessions() {
        let pool = harness::pool().await;
        let source = harness::session(&pool, "10:00", 48 * HOUR_MS, 4).await;
        let target = harness::session(&pool, "11:00", 72 * HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);

        let r = reserve(&pool, &actor, source, 0).await.unwrap();
        let moved = move_reservation(&pool, &actor, r.id, target, 0)
            .await
            .unwrap();

        assert_eq!(moved.session_id, target);
        assert_eq!(moved.status, ReservationStatus::Active);
        assert_eq!(spots_left(&pool, source).await, 4);
        assert_eq!(spots_left(&pool, target).await, 3);

        let old = reservation::find_by_id(&pool, TENANT, r.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(old.status, ReservationStatus::Moved);
    }

    #[tokio::test]
    async fn move_to_a_full_session_leaves_the_source_untouched() {
        let pool = harness::pool().await;
        let source = harness::session(&pool, "10:00", 48 * HOUR_MS, 4).await;
        let target = harness::session(&pool, "11:00", 72 * HOUR_MS, 1).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let blocker = harness::member(&pool, "Banu", 5).await;
        let actor = Actor::member(TENANT, m);

        reserve(&pool, &Actor::member(TENANT, blocker), target, 0)
            .await
            .unwrap();
        let r = reserve(&pool, &actor, source, 0).await.unwrap();

        let err = move_reservation(&pool, &actor, r.id, target, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SessionFull));

        let unchanged = reservation::find_by_id(&pool, TENANT, r.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.status, ReservationStatus::Active);
        assert_eq!(spots_left(&pool, source).await, 3);
        assert_eq!(spots_left(&pool, target).await, 0);
    }

    #[tokio::test]
    async fn move_to_an_elapsed_session_is_rejected() {
        let pool = harness::pool().await;
        let source = harness::session(&pool, "10:00", 48 * HOUR_MS, 4).await;
        let past = harness::session(&pool, "11:00", -HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 5).await;
        let actor = Actor::member(TENANT, m);

        let r = reserve(&pool, &actor, source, 0).await.unwrap();
        let err = move_reservation(&pool, &actor, r.id, past, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SessionClosed));
    }

    #[tokio::test]
    async fn auto_reserve_skips_unknowns_and_duplicates_and_overflows_capacity() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", 48 * HOUR_MS, 1).await;
        let a = harness::member(&pool, "Ada", 0).await;
        let b = harness::member(&pool, "Banu", 0).await;
        let admin = Actor::admin(TENANT);

        // a twice, one unknown id; zero-credit members are fine here
        let created = auto_reserve(&pool, &admin, sess, &[a, a, 999_999, b], 0)
            .await
            .unwrap();
        assert_eq!(created, 2);

        // Both reservations exist even though capacity was 1
        let mut conn = pool.acquire().await.unwrap();
        let active = reservation::find_active_by_session(&mut conn, sess)
            .await
            .unwrap();
        drop(conn);
        assert_eq!(active.len(), 2);
        assert_eq!(spots_left(&pool, sess).await, 0);
    }

    #[tokio::test]
    async fn member_operations_require_a_member_identity() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", 48 * HOUR_MS, 4).await;
        let admin = Actor::admin(TENANT);

        let err = reserve(&pool, &admin, sess, 0).await.unwrap_err();
        assert!(matches!(err, BookingError::Unauthorized));

        let err = auto_reserve(&pool, &Actor::member(TENANT, 1), sess, &[], 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Unauthorized));
    }
}
