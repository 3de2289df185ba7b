use std::sync::Arc;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::booking::SweepScheduler;
use crate::core::Config;
use crate::db::DbService;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::error::AppError;

/// 服务器状态 - 持有所有共享资源
///
/// `Clone` 是浅拷贝：连接池和时钟都是共享句柄。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项（不可变） |
/// | pool | SQLite 连接池 |
/// | clock | 可注入时钟（测试中用 `FixedClock` 替换） |
/// | shutdown | 后台任务关闭信号 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// "现在" 的来源
    pub clock: Arc<dyn Clock>,
    /// 后台任务关闭信号
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化服务器状态：打开数据库并应用 schema
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;
        let db = DbService::new(&config.db_path()).await?;
        Ok(Self {
            config: config.clone(),
            pool: db.pool,
            clock: Arc::new(SystemClock),
            shutdown: CancellationToken::new(),
        })
    }

    /// 手动构造（测试用）
    pub fn with_parts(config: Config, pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            pool,
            clock,
            shutdown: CancellationToken::new(),
        }
    }

    /// 启动后台任务（目前只有清扫调度器）
    pub async fn start_background_tasks(&self) {
        let scheduler = SweepScheduler::new(self.clone(), self.shutdown.clone());
        tokio::spawn(scheduler.run());
        tracing::info!("Background tasks started");
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }
}
