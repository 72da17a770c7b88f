//! Relative timestamps ("3 minutes ago", "in a day").

use chrono::{DateTime, Utc};

const SECS_PER_MINUTE: f64 = 60.0;
const SECS_PER_HOUR: f64 = 3_600.0;
const SECS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_MONTH: f64 = 30.436_875;

/// Describe `then` relative to `now`.
///
/// Each unit is compared after rounding, so 44.6 seconds already reads as "a minute".
/// The last rounded value per unit: 44 seconds, 89 seconds, 44 minutes, 89 minutes,
/// 21 hours, 35 hours, 25 days, 45 days, 10 months, 17 months.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then);
    let future = delta.num_milliseconds() < 0;
    let secs = (delta.num_milliseconds().unsigned_abs() as f64) / 1_000.0;

    let seconds = secs.round();
    let minutes = (secs / SECS_PER_MINUTE).round();
    let hours = (secs / SECS_PER_HOUR).round();
    let days = (secs / SECS_PER_DAY).round();
    let months = (secs / SECS_PER_DAY / DAYS_PER_MONTH).round();

    let phrase = if seconds <= 44.0 {
        "a few seconds".to_string()
    } else if seconds <= 89.0 {
        "a minute".to_string()
    } else if minutes <= 44.0 {
        format!("{} minutes", minutes)
    } else if minutes <= 89.0 {
        "an hour".to_string()
    } else if hours <= 21.0 {
        format!("{} hours", hours)
    } else if hours <= 35.0 {
        "a day".to_string()
    } else if days <= 25.0 {
        format!("{} days", days)
    } else if days <= 45.0 {
        "a month".to_string()
    } else if months <= 10.0 {
        format!("{} months", months)
    } else if months <= 17.0 {
        "a year".to_string()
    } else {
        format!("{} years", (secs / SECS_PER_DAY / DAYS_PER_MONTH / 12.0).round())
    };

    if future {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ago(delta: Duration) -> String {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        relative_time(now - delta, now)
    }

    #[test]
    fn test_past_thresholds() {
        assert_eq!(ago(Duration::seconds(0)), "a few seconds ago");
        assert_eq!(ago(Duration::seconds(44)), "a few seconds ago");
        assert_eq!(ago(Duration::seconds(45)), "a minute ago");
        assert_eq!(ago(Duration::seconds(89)), "a minute ago");
        assert_eq!(ago(Duration::seconds(90)), "2 minutes ago");
        assert_eq!(ago(Duration::minutes(3)), "3 minutes ago");
        assert_eq!(ago(Duration::minutes(44)), "44 minutes ago");
        assert_eq!(ago(Duration::minutes(45)), "an hour ago");
        assert_eq!(ago(Duration::minutes(90)), "2 hours ago");
        assert_eq!(ago(Duration::hours(21)), "21 hours ago");
        assert_eq!(ago(Duration::hours(22)), "a day ago");
        assert_eq!(ago(Duration::hours(36)), "2 days ago");
        assert_eq!(ago(Duration::days(25)), "25 days ago");
        assert_eq!(ago(Duration::days(26)), "a month ago");
        assert_eq!(ago(Duration::days(46)), "2 months ago");
        assert_eq!(ago(Duration::days(320)), "a year ago");
        assert_eq!(ago(Duration::days(365 * 3)), "3 years ago");
    }

    #[test]
    fn test_thresholds_compare_rounded_values() {
        assert_eq!(ago(Duration::milliseconds(44_400)), "a few seconds ago");
        assert_eq!(ago(Duration::milliseconds(44_600)), "a minute ago");
        assert_eq!(ago(Duration::milliseconds(89_400)), "a minute ago");
        assert_eq!(ago(Duration::seconds(44 * 60 + 31)), "an hour ago");
        assert_eq!(ago(Duration::minutes(21 * 60 + 31)), "a day ago");
        assert_eq!(ago(Duration::hours(25 * 24 + 13)), "a month ago");
    }

    #[test]
    fn test_future() {
        assert_eq!(ago(Duration::seconds(-10)), "in a few seconds");
        assert_eq!(ago(Duration::hours(-5)), "in 5 hours");
    }
}
