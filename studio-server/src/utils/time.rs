//! 时间工具函数 — 业务时区转换
//!
//! 所有日期→时间戳转换统一在 API handler / booking 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::{Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析时间字符串 (HH:MM 或 HH:MM:SS)
pub fn parse_time(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| AppError::validation(format!("Invalid time format: {}", time)))
}

/// 日期 + 时间 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn datetime_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 会话起始时刻：日期字符串 + 时间字符串 → Unix millis (业务时区)
pub fn session_start_millis(date: &str, time: &str, tz: Tz) -> AppResult<i64> {
    let d = parse_date(date)?;
    let t = parse_time(time)?;
    Ok(datetime_to_millis(d, t, tz))
}

/// 当前营业日日期 (业务时区)
pub fn today(now_ms: i64, tz: Tz) -> NaiveDate {
    chrono::DateTime::from_timestamp_millis(now_ms)
        .unwrap_or_else(chrono::Utc::now)
        .with_timezone(&tz)
        .date_naive()
}

/// 每周步进：date + n 周
pub fn add_weeks(date: NaiveDate, weeks: u32) -> NaiveDate {
    date + Duration::weeks(weeks as i64)
}

/// 格式化日期为存储格式 (YYYY-MM-DD)
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
