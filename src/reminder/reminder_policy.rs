//! Pure reminder timing rules.
//!
//! Everything here works on a single UTC instant representation. A user's
//! timezone affects how dates are displayed, never when a reminder fires.

use chrono::{DateTime, Duration, Utc};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Offsets applied when a user has no usable preference stored.
pub const DEFAULT_REMINDER_DAYS: [u32; 3] = [7, 2, 1];

/// How far ahead of "now" an assignment's due date may lie to be scanned.
pub const LOOKAHEAD_DAYS: i64 = 7;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OffsetParseError {
    #[error("no reminder days configured")]
    Empty,

    #[error("invalid reminder day '{0}'")]
    InvalidDay(String),
}

/// Ordered set of day offsets before a due date, largest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderOffsets(Vec<u32>);

impl ReminderOffsets {
    /// Builds an offset set, dropping duplicates. Returns `None` when empty.
    pub fn new(days: impl IntoIterator<Item = u32>) -> Option<Self> {
        let mut days: Vec<u32> = days.into_iter().collect();
        days.sort_unstable_by(|a, b| b.cmp(a));
        days.dedup();

        if days.is_empty() {
            None
        } else {
            Some(Self(days))
        }
    }

    /// Reads the comma-separated column value, falling back to the defaults
    /// when it is missing, blank or malformed.
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::default(),
            Some(value) => value.parse::<Self>().unwrap_or_else(|e| {
                tracing::warn!(value, error = %e, "Unparseable reminder days, using defaults");
                Self::default()
            }),
        }
    }

    pub fn contains(&self, days_until_due: i64) -> bool {
        u32::try_from(days_until_due)
            .map(|days| self.0.contains(&days))
            .unwrap_or(false)
    }

    pub fn days(&self) -> &[u32] {
        &self.0
    }
}

impl Default for ReminderOffsets {
    fn default() -> Self {
        Self(DEFAULT_REMINDER_DAYS.to_vec())
    }
}

impl FromStr for ReminderOffsets {
    type Err = OffsetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days = s
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<u32>()
                    .map_err(|_| OffsetParseError::InvalidDay(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(days).ok_or(OffsetParseError::Empty)
    }
}

impl fmt::Display for ReminderOffsets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderDecision {
    pub is_due: bool,
    pub days_until_due: i64,
}

/// Whole days until `due_date`, rounded up. Anything later today counts as 1.
pub fn days_until_due(due_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (due_date - now).num_milliseconds();
    let whole = millis.div_euclid(MILLIS_PER_DAY);

    if millis.rem_euclid(MILLIS_PER_DAY) == 0 {
        whole
    } else {
        whole + 1
    }
}

/// A reminder is due only when the rounded-up day count is exactly one of
/// the configured offsets. Missed days are never caught up.
pub fn is_reminder_due(
    due_date: DateTime<Utc>,
    offsets: &ReminderOffsets,
    now: DateTime<Utc>,
) -> ReminderDecision {
    let days_until_due = days_until_due(due_date, now);

    ReminderDecision {
        is_due: offsets.contains(days_until_due),
        days_until_due,
    }
}

/// `now < due_date <= now + LOOKAHEAD_DAYS`
pub fn within_lookahead(due_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    due_date > now && due_date <= now + Duration::days(LOOKAHEAD_DAYS)
}

/// Fire times for every offset whose `due_date - offset` is still ahead of `now`.
pub fn future_remind_times(
    due_date: DateTime<Utc>,
    offsets: &ReminderOffsets,
    now: DateTime<Utc>,
) -> Vec<(u32, DateTime<Utc>)> {
    offsets
        .days()
        .iter()
        .map(|&days| (days, due_date - Duration::days(i64::from(days))))
        .filter(|(_, remind_at)| *remind_at > now)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_days_until_due_rounds_up() {
        let now = now();
        assert_eq!(days_until_due(now + Duration::days(2), now), 2);
        assert_eq!(days_until_due(now + Duration::hours(36), now), 2);
        assert_eq!(days_until_due(now + Duration::minutes(1), now), 1);
        assert_eq!(days_until_due(now, now), 0);
        assert_eq!(days_until_due(now - Duration::hours(1), now), 0);
        assert_eq!(days_until_due(now - Duration::hours(25), now), -1);
    }

    #[test]
    fn test_exact_offset_match_only() {
        let now = now();
        let offsets = ReminderOffsets::default();

        let in_three = is_reminder_due(now + Duration::days(3), &offsets, now);
        assert!(!in_three.is_due);
        assert_eq!(in_three.days_until_due, 3);

        let in_two = is_reminder_due(now + Duration::days(2), &offsets, now);
        assert!(in_two.is_due);
        assert_eq!(in_two.days_until_due, 2);
    }

    #[test]
    fn test_same_day_requires_explicit_zero() {
        let now = now();
        let due = now;

        assert!(!is_reminder_due(due, &ReminderOffsets::default(), now).is_due);

        let with_zero = ReminderOffsets::new([0, 1]).unwrap();
        assert!(is_reminder_due(due, &with_zero, now).is_due);
    }

    #[test]
    fn test_negative_days_never_match() {
        let offsets = ReminderOffsets::new([0, 1, 2]).unwrap();
        assert!(!offsets.contains(-1));
    }

    #[test]
    fn test_blank_and_missing_preferences_use_defaults() {
        let expected = ReminderOffsets::from_stored(Some("7,2,1"));
        assert_eq!(ReminderOffsets::from_stored(None), expected);
        assert_eq!(ReminderOffsets::from_stored(Some("")), expected);
        assert_eq!(ReminderOffsets::from_stored(Some("   ")), expected);
        assert_eq!(expected, ReminderOffsets::default());
    }

    #[test]
    fn test_malformed_preferences_fall_back() {
        assert_eq!(
            ReminderOffsets::from_stored(Some("7,two,1")),
            ReminderOffsets::default()
        );
        assert_eq!(
            ReminderOffsets::from_stored(Some("-3")),
            ReminderOffsets::default()
        );
        assert_eq!(
            ReminderOffsets::from_stored(Some(",,")),
            ReminderOffsets::default()
        );
    }

    #[test]
    fn test_parse_sorts_and_dedups() {
        let offsets: ReminderOffsets = " 1, 3 ,3,14 ".parse().unwrap();
        assert_eq!(offsets.days(), &[14, 3, 1]);
        assert_eq!(offsets.to_string(), "14,3,1");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<ReminderOffsets>(), Err(OffsetParseError::Empty));
        assert_eq!(
            "1,x".parse::<ReminderOffsets>(),
            Err(OffsetParseError::InvalidDay("x".to_string()))
        );
    }

    #[test]
    fn test_lookahead_bounds() {
        let now = now();
        assert!(!within_lookahead(now, now));
        assert!(within_lookahead(now + Duration::seconds(1), now));
        assert!(within_lookahead(now + Duration::days(7), now));
        assert!(!within_lookahead(now + Duration::days(7) + Duration::seconds(1), now));
        assert!(!within_lookahead(now + Duration::days(9), now));
    }

    #[test]
    fn test_future_remind_times_skip_past_offsets() {
        let now = now();
        let offsets = ReminderOffsets::default();

        let ten_days_out = future_remind_times(now + Duration::days(10), &offsets, now);
        let days: Vec<u32> = ten_days_out.iter().map(|(d, _)| *d).collect();
        assert_eq!(days, vec![7, 2, 1]);

        let three_days_out = future_remind_times(now + Duration::days(3), &offsets, now);
        let days: Vec<u32> = three_days_out.iter().map(|(d, _)| *d).collect();
        assert_eq!(days, vec![2, 1]);
        assert_eq!(three_days_out[0].1, now + Duration::days(1));
    }
}
