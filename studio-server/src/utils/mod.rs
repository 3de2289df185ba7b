//! 工具模块 - 通用工具函数和类型
//!
//! - [`AppError`] / [`AppResult`] - 应用错误类型和响应
//! - [`clock`] - 可注入时钟
//! - [`time`] - 业务时区转换
//! - [`logger`] - 日志初始化

pub mod clock;
pub mod error;
pub mod logger;
pub mod time;

pub use clock::{Clock, SystemClock};
pub use error::{AppError, AppResponse, AppResult};
