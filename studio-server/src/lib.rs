//! Studio Server - 多租户普拉提工作室预约系统
//!
//! # 模块结构
//!
//! ```text
//! studio-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── booking/       # 预约核心：引擎、名册、课表、清扫任务
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # SQLite 连接池、schema、repository 层
//! └── utils/         # 错误、日志、时间、时钟
//! ```
//!
//! The booking core (`booking/`) is the heart of the crate: it owns the
//! reservation lifecycle, the credit ledger rules, the session catalog rules
//! and the sweep that closes elapsed sessions. Everything in `api/` is a
//! thin translation layer over it.

pub mod api;
pub mod booking;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use booking::{Actor, BookingError, Role};
pub use crate::core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger;
