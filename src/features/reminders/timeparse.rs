//! Human time expression parsing
//!
//! Turns strings like `30m`, `1h30m`, `10 minutes`, `in 2 hours` or
//! `17:30` into an absolute UTC expiry. Only strictly-future times are
//! accepted; anything unparsable or in the past yields `None` and the
//! caller reports an unknown time format.

use chrono::{DateTime, Duration, Utc};

/// Parse a human time expression relative to `now`.
///
/// Returns `None` for unknown formats and for results that are not in
/// the future.
pub fn parse_human_time(input: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lowered = input.trim().to_lowercase();
    let text = lowered.strip_prefix("in ").unwrap_or(&lowered);
    if text.is_empty() {
        return None;
    }

    if text.contains(':') {
        return parse_clock(text, now);
    }

    let duration = parse_duration(text)?;
    if duration <= Duration::zero() {
        return None;
    }
    Some(now + duration)
}

/// Duration expressions: compact (`1h30m`) or worded (`1 hour and 30 minutes`).
fn parse_duration(text: &str) -> Option<Duration> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_whitespace() || ch == ',' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else if ch.is_ascii_digit() || ch.is_ascii_alphabetic() {
            let boundary = current
                .chars()
                .next_back()
                .is_some_and(|last| last.is_ascii_digit() != ch.is_ascii_digit());
            if boundary {
                tokens.push(std::mem::take(&mut current));
            }
            current.push(ch);
        } else {
            return None;
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    let mut total_seconds: i64 = 0;
    let mut pending_amount: Option<i64> = None;
    let mut matched_any = false;
    for token in tokens {
        if token == "and" {
            continue;
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            if pending_amount.is_some() {
                return None;
            }
            pending_amount = Some(token.parse().ok()?);
        } else {
            let amount = pending_amount.take()?;
            let seconds = amount.checked_mul(unit_seconds(&token)?)?;
            total_seconds = total_seconds.checked_add(seconds)?;
            matched_any = true;
        }
    }
    // A trailing bare number has no unit
    if pending_amount.is_some() || !matched_any {
        return None;
    }

    Some(Duration::seconds(total_seconds))
}

fn unit_seconds(unit: &str) -> Option<i64> {
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(60),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(3600),
        "d" | "day" | "days" => Some(86_400),
        "w" | "week" | "weeks" => Some(604_800),
        _ => None,
    }
}

/// `HH:MM` wall clock time in UTC; the next occurrence after `now`.
fn parse_clock(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (hour_part, minute_part) = text.split_once(':')?;
    if hour_part.is_empty()
        || hour_part.len() > 2
        || minute_part.len() != 2
        || !hour_part.chars().all(|c| c.is_ascii_digit())
        || !minute_part.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let hour: u32 = hour_part.parse().ok()?;
    let minute: u32 = minute_part.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }

    let candidate = now.date_naive().and_hms_opt(hour, minute, 0)?.and_utc();
    if candidate > now {
        Some(candidate)
    } else {
        Some(candidate + Duration::days(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        // 2024-05-01 12:00:00 UTC
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_worded_durations() {
        let now = base();
        assert_eq!(
            parse_human_time("10 minutes", now),
            Some(now + Duration::minutes(10))
        );
        assert_eq!(parse_human_time("1 hour", now), Some(now + Duration::hours(1)));
        assert_eq!(parse_human_time("1 day", now), Some(now + Duration::days(1)));
        assert_eq!(
            parse_human_time("1 hour and 30 minutes", now),
            Some(now + Duration::minutes(90))
        );
    }

    #[test]
    fn test_compact_durations() {
        let now = base();
        assert_eq!(parse_human_time("30m", now), Some(now + Duration::minutes(30)));
        assert_eq!(
            parse_human_time("1h30m", now),
            Some(now + Duration::minutes(90))
        );
        assert_eq!(parse_human_time("2d", now), Some(now + Duration::days(2)));
        assert_eq!(parse_human_time("1w", now), Some(now + Duration::weeks(1)));
    }

    #[test]
    fn test_in_prefix_and_case() {
        let now = base();
        assert_eq!(
            parse_human_time("in 2 hours", now),
            Some(now + Duration::hours(2))
        );
        assert_eq!(
            parse_human_time("  10 Minutes ", now),
            Some(now + Duration::minutes(10))
        );
    }

    #[test]
    fn test_clock_times() {
        let now = base();
        // Later today
        assert_eq!(
            parse_human_time("17:30", now),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 17, 30, 0).unwrap())
        );
        // Already passed today: rolls over to tomorrow
        assert_eq!(
            parse_human_time("09:00", now),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap())
        );
        // Exactly now is not future
        assert_eq!(
            parse_human_time("12:00", now),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_rejects_garbage() {
        let now = base();
        assert_eq!(parse_human_time("", now), None);
        assert_eq!(parse_human_time("banana", now), None);
        assert_eq!(parse_human_time("10", now), None);
        assert_eq!(parse_human_time("minutes", now), None);
        assert_eq!(parse_human_time("10 bananas", now), None);
        assert_eq!(parse_human_time("25:00", now), None);
        assert_eq!(parse_human_time("12:75", now), None);
        assert_eq!(parse_human_time("12:5", now), None);
    }

    #[test]
    fn test_rejects_non_future() {
        let now = base();
        assert_eq!(parse_human_time("0m", now), None);
        assert_eq!(parse_human_time("0 seconds", now), None);
    }
}
