//! 预约业务错误
//!
//! Every rule the booking core enforces maps to exactly one variant here, so
//! tests can assert on the rule that fired rather than on message text. The
//! HTTP mapping lives in `utils::error` (`From<BookingError> for AppError`).

use crate::db::repository::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// 课程已结束或已过期
    #[error("Session is closed")]
    SessionClosed,

    /// 名额已满
    #[error("Session is full")]
    SessionFull,

    /// 课时不足
    #[error("Insufficient credits")]
    InsufficientCredits,

    /// 该课程已有有效预约
    #[error("Already reserved for this session")]
    AlreadyReserved,

    /// 无权操作
    #[error("Permission denied")]
    Unauthorized,

    /// 距开课不足 24 小时，自助取消已关闭
    #[error("Cancellation window closed (less than 24 hours before start)")]
    WindowClosed,

    /// 状态机拒绝该迁移
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 取消申请必须填写原因
    #[error("Cancellation reason is required")]
    ReasonRequired,

    /// 容量必须 >= 1
    #[error("Capacity must be at least 1")]
    BadCapacity,

    /// 会员重名（同租户内不区分大小写）
    #[error("Member already registered")]
    DuplicateMember,

    /// 该时段已有课程
    #[error("Session already scheduled at that slot")]
    DuplicateSession,

    /// 过去的课程不可修改
    #[error("Past sessions cannot be modified")]
    PastSessionImmutable,

    /// 请求数据无效
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<sqlx::Error> for BookingError {
    fn from(e: sqlx::Error) -> Self {
        BookingError::Repo(RepoError::from(e))
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

