/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Minutes to milliseconds
pub fn minutes_to_millis(minutes: i64) -> i64 {
    minutes.saturating_mul(60_000)
}
