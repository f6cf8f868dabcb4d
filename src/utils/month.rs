use chrono::{DateTime, Utc};

/// 用量按 UTC 自然月统计，格式 `YYYY-MM`
pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

pub fn current_month_key() -> String {
    month_key(Utc::now())
}
