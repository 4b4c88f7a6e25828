/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Milliseconds in one hour, for showtime-distance arithmetic.
pub const MILLIS_PER_HOUR: f64 = 3_600_000.0;
