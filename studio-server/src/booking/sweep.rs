//! 课程清扫任务
//!
//! Closes every session whose start time has elapsed: the session is flipped
//! to `completed` (one-way), its active reservations become `attended`, and
//! one credit is debited per attendee. The debit is a conditional UPDATE
//! stopping at zero, so a member who ran out of credits is still recorded as
//! attended — the balance never goes negative.
//!
//! The whole sweep is a single transaction and is idempotent: a second run
//! over the same instant finds nothing left to close.
//!
//! Dispatch is decoupled from request handling: [`SweepScheduler`] runs it
//! on a fixed interval, and the admin API can trigger it on demand.

use serde::Serialize;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use super::error::BookingResult;
use crate::core::ServerState;
use crate::db::repository::{member, reservation, session};

/// 单次清扫结果
#[derive(Debug, Default, Clone, Serialize)]
pub struct SweepReport {
    pub sessions_closed: u32,
    pub attended: u32,
    pub credits_debited: u32,
}

/// 执行一次清扫
pub async fn run_sweep(pool: &SqlitePool, now_ms: i64) -> BookingResult<SweepReport> {
    let mut report = SweepReport::default();
    let mut tx = pool.begin().await?;

    let elapsed = session::find_elapsed_open(&mut tx, now_ms).await?;
    for sess in &elapsed {
        // Raced with another sweep → already closed, nothing to do here.
        if !session::mark_completed(&mut tx, sess.id).await? {
            continue;
        }
        report.sessions_closed += 1;

        for resv in reservation::find_active_by_session(&mut tx, sess.id).await? {
            reservation::set_status(
                &mut tx,
                resv.id,
                shared::models::ReservationStatus::Attended,
                now_ms,
            )
            .await?;
            report.attended += 1;
            if member::debit_credit_if_positive(&mut tx, resv.member_id).await? {
                report.credits_debited += 1;
            }
        }
    }
    tx.commit().await?;

    if report.sessions_closed > 0 {
        tracing::info!(
            sessions_closed = report.sessions_closed,
            attended = report.attended,
            credits_debited = report.credits_debited,
            "Sweep closed elapsed sessions"
        );
    }
    Ok(report)
}

/// 清扫调度器
///
/// 注册为后台任务，在 `start_background_tasks()` 中启动。
pub struct SweepScheduler {
    state: ServerState,
    shutdown: CancellationToken,
}

impl SweepScheduler {
    pub fn new(state: ServerState, shutdown: CancellationToken) -> Self {
        Self { state, shutdown }
    }

    /// 主循环：启动扫描 + 固定间隔触发
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.state.config.sweep_interval.as_secs(),
            "Session sweep scheduler started"
        );

        // 启动时立即扫描一次
        self.sweep_once().await;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.state.config.sweep_interval) => {
                    self.sweep_once().await;
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Session sweep scheduler received shutdown signal");
                    return;
                }
            }
        }
    }

    async fn sweep_once(&self) {
        let now_ms = self.state.clock.now_millis();
        match run_sweep(&self.state.pool, now_ms).await {
            Ok(report) if report.sessions_closed == 0 => {
                tracing::debug!("No elapsed sessions to close");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Sweep failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::actor::Actor;
    use crate::booking::engine;
    use crate::booking::harness::{self, HOUR_MS, TENANT};
    use shared::models::ReservationStatus;

    #[tokio::test]
    async fn sweep_closes_elapsed_sessions_and_debits_attendance() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 3).await;
        let r = engine::reserve(&pool, &Actor::member(TENANT, m), sess, 0)
            .await
            .unwrap();

        let report = run_sweep(&pool, 2 * HOUR_MS).await.unwrap();
        assert_eq!(report.sessions_closed, 1);
        assert_eq!(report.attended, 1);
        assert_eq!(report.credits_debited, 1);

        let resv = crate::db::repository::reservation::find_by_id(&pool, TENANT, r.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resv.status, ReservationStatus::Attended);
        let mem = crate::db::repository::member::find_by_id(&pool, TENANT, m)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mem.credits, 2);
        let closed = crate::db::repository::session::find_by_id(&pool, TENANT, sess)
            .await
            .unwrap()
            .unwrap();
        assert!(closed.completed);
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 3).await;
        engine::reserve(&pool, &Actor::member(TENANT, m), sess, 0)
            .await
            .unwrap();

        run_sweep(&pool, 2 * HOUR_MS).await.unwrap();
        let second = run_sweep(&pool, 2 * HOUR_MS).await.unwrap();
        assert_eq!(second.sessions_closed, 0);
        assert_eq!(second.attended, 0);
        assert_eq!(second.credits_debited, 0);

        let mem = crate::db::repository::member::find_by_id(&pool, TENANT, m)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mem.credits, 2);
    }

    #[tokio::test]
    async fn member_with_one_credit_ends_at_zero() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 1).await;
        engine::reserve(&pool, &Actor::member(TENANT, m), sess, 0)
            .await
            .unwrap();

        let report = run_sweep(&pool, 2 * HOUR_MS).await.unwrap();
        assert_eq!(report.credits_debited, 1);
        let mem = crate::db::repository::member::find_by_id(&pool, TENANT, m)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mem.credits, 0);
    }

    #[tokio::test]
    async fn zero_credit_member_is_attended_without_going_negative() {
        let pool = harness::pool().await;
        let sess = harness::session(&pool, "10:00", HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 0).await;
        // Put the zero-credit member on the roster via auto-reserve
        engine::auto_reserve(&pool, &Actor::admin(TENANT), sess, &[m], 0)
            .await
            .unwrap();

        let report = run_sweep(&pool, 2 * HOUR_MS).await.unwrap();
        assert_eq!(report.attended, 1);
        assert_eq!(report.credits_debited, 0);
        let mem = crate::db::repository::member::find_by_id(&pool, TENANT, m)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mem.credits, 0);
    }

    #[tokio::test]
    async fn future_sessions_and_canceled_reservations_are_untouched() {
        let pool = harness::pool().await;
        let elapsed = harness::session(&pool, "10:00", HOUR_MS, 4).await;
        let future = harness::session(&pool, "11:00", 72 * HOUR_MS, 4).await;
        let m = harness::member(&pool, "Ada", 3).await;
        let actor = Actor::member(TENANT, m);

        let r = engine::reserve(&pool, &actor, elapsed, 0).await.unwrap();
        engine::reserve(&pool, &actor, future, 0).await.unwrap();
        // Canceled before the session ran: no attendance, no debit
        engine::admin_cancel_refund(&pool, &Actor::admin(TENANT), r.id, 0)
            .await
            .unwrap();

        let report = run_sweep(&pool, 2 * HOUR_MS).await.unwrap();
        assert_eq!(report.sessions_closed, 1);
        assert_eq!(report.attended, 0);
        assert_eq!(report.credits_debited, 0);

        let fut = crate::db::repository::session::find_by_id(&pool, TENANT, future)
            .await
            .unwrap()
            .unwrap();
        assert!(!fut.completed);
        let mem = crate::db::repository::member::find_by_id(&pool, TENANT, m)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mem.credits, 3);
    }
}
