//! Small shared helpers

/// Current wall-clock time as Unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Format a day count the way it reads in user-facing messages:
/// whole numbers without the trailing ".0", halves as "0.5".
pub fn fmt_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{}", days as i64)
    } else {
        format!("{days}")
    }
}
