//! Calendar math for the pre-buy timeline.
//!
//! The contract addresses future days as `end_time + N * 86_400` seconds,
//! which drifts off civil noon whenever Eastern time changes offset.
//! Display anchors are therefore re-derived as 12:00 America/New_York on
//! the Eastern calendar date of the input instant, with the UTC offset
//! taken from the zone database rather than a fixed delta.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use chrono_tz::America::New_York;

use crate::error::MegaphoneError;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Returns the instant of 12:00:00 America/New_York on the same Eastern
/// calendar date as `timestamp`. Idempotent: normalizing an already
/// normalized timestamp is a no-op.
pub fn normalize_to_noon_eastern(timestamp: i64) -> Result<i64, MegaphoneError> {
    let instant =
        DateTime::from_timestamp(timestamp, 0).ok_or(MegaphoneError::DateRange(timestamp))?;
    let date = instant.with_timezone(&New_York).date_naive();
    // US transitions happen at 02:00, so noon is never skipped or ambiguous.
    let noon = New_York
        .with_ymd_and_hms(date.year(), date.month(), date.day(), 12, 0, 0)
        .single()
        .ok_or(MegaphoneError::DateRange(timestamp))?;
    Ok(noon.timestamp())
}

/// Adds exactly `days * 86_400` seconds. Deliberately not calendar-aware,
/// matching how the contract derives future auction days.
pub fn add_days(timestamp: i64, days: i64) -> i64 {
    timestamp + days * SECONDS_PER_DAY
}

/// The Eastern calendar date of an instant.
pub fn to_calendar_date(timestamp: i64) -> Result<NaiveDate, MegaphoneError> {
    let instant =
        DateTime::from_timestamp(timestamp, 0).ok_or(MegaphoneError::DateRange(timestamp))?;
    Ok(instant.with_timezone(&New_York).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-01-15 12:00 EST, i.e. 17:00 UTC.
    const WINTER_NOON: i64 = 1_736_960_400;
    // 2025-03-08 12:00 EST, the last standard-time day before the spring switch.
    const PRE_DST_NOON: i64 = 1_741_453_200;
    // 2025-03-09 12:00 EDT, i.e. 16:00 UTC.
    const POST_DST_NOON: i64 = 1_741_536_000;
    // 2025-07-04 12:00 EDT.
    const SUMMER_NOON: i64 = 1_751_644_800;
    // 2025-11-01 12:00 EDT and 2025-11-02 12:00 EST around the fall switch.
    const PRE_FALLBACK_NOON: i64 = 1_762_012_800;
    const POST_FALLBACK_NOON: i64 = 1_762_102_800;

    #[test]
    fn normalization_is_idempotent() {
        for noon in [WINTER_NOON, PRE_DST_NOON, POST_DST_NOON, SUMMER_NOON] {
            assert_eq!(normalize_to_noon_eastern(noon).unwrap(), noon);
        }
    }

    #[test]
    fn anchors_a_winter_morning_to_est_noon() {
        // 2025-01-15 09:13:20 UTC, early morning in New York.
        let morning = 1_736_932_400;
        assert_eq!(normalize_to_noon_eastern(morning).unwrap(), WINTER_NOON);
    }

    #[test]
    fn resolves_utc_date_disagreement_to_the_eastern_date() {
        // 2025-01-16 02:00 UTC is still 21:00 on Jan 15 in New York.
        let late_evening = 1_736_992_800;
        assert_eq!(normalize_to_noon_eastern(late_evening).unwrap(), WINTER_NOON);
        assert_eq!(
            to_calendar_date(late_evening).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );
    }

    #[test]
    fn spring_forward_drift_is_reanchored() {
        // Naive +86_400 lands on 13:00 EDT the day DST starts.
        let drifted = add_days(PRE_DST_NOON, 1);
        assert_eq!(drifted, PRE_DST_NOON + SECONDS_PER_DAY);
        assert_eq!(normalize_to_noon_eastern(drifted).unwrap(), POST_DST_NOON);
        assert_eq!(POST_DST_NOON - PRE_DST_NOON, SECONDS_PER_DAY - 3_600);
    }

    #[test]
    fn fall_back_drift_is_reanchored() {
        // Naive +86_400 lands on 11:00 EST the day DST ends.
        let drifted = add_days(PRE_FALLBACK_NOON, 1);
        assert_eq!(normalize_to_noon_eastern(drifted).unwrap(), POST_FALLBACK_NOON);
        assert_eq!(POST_FALLBACK_NOON - PRE_FALLBACK_NOON, SECONDS_PER_DAY + 3_600);
    }

    #[test]
    fn add_days_composes() {
        for days in 1..6 {
            assert_eq!(
                add_days(WINTER_NOON, days),
                add_days(add_days(WINTER_NOON, days - 1), 1)
            );
        }
        assert_eq!(add_days(WINTER_NOON, 0), WINTER_NOON);
        assert_eq!(add_days(WINTER_NOON, -1), WINTER_NOON - SECONDS_PER_DAY);
    }

    #[test]
    fn rejects_unrepresentable_timestamps() {
        assert!(matches!(
            normalize_to_noon_eastern(i64::MAX),
            Err(MegaphoneError::DateRange(_))
        ));
        assert!(matches!(
            to_calendar_date(i64::MIN),
            Err(MegaphoneError::DateRange(_))
        ));
    }
}
