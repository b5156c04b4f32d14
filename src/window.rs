//! Pre-buy day-window construction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::MegaphoneError,
    time::{add_days, normalize_to_noon_eastern, to_calendar_date},
};

/// One reservable future auction day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableDay {
    pub auction_id: u64,
    /// Noon-Eastern anchor of the day, unix seconds.
    pub timestamp: i64,
    /// Eastern calendar date of `timestamp`.
    pub date: NaiveDate,
    pub is_bought: bool,
}

/// Maps the contract's pre-buy bounds and status vector onto an ordered
/// list of reservable days.
///
/// `status[i]` covers relative day `min_pre_buy_id + i`. Offsets at or
/// below zero address the running or already-finished auctions and are
/// skipped. An inverted id range or an empty vector means nothing is
/// reservable and yields an empty list; a vector whose length disagrees
/// with the id range is rejected outright.
pub fn build_window(
    min_pre_buy_id: i64,
    max_pre_buy_id: i64,
    status: &[bool],
    current_auction_id: u64,
    current_auction_end_time: i64,
) -> Result<Vec<AvailableDay>, MegaphoneError> {
    if min_pre_buy_id > max_pre_buy_id || status.is_empty() {
        return Ok(Vec::new());
    }

    let span = i128::from(max_pre_buy_id) - i128::from(min_pre_buy_id) + 1;
    if status.len() as i128 != span {
        return Err(MegaphoneError::Validation(format!(
            "pre-buy status vector has {} entries but ids {min_pre_buy_id}..={max_pre_buy_id} span {span}",
            status.len(),
        )));
    }

    let base = normalize_to_noon_eastern(current_auction_end_time)?;
    let mut days = Vec::with_capacity(status.len());
    for (index, &is_bought) in status.iter().enumerate() {
        let offset = min_pre_buy_id + index as i64;
        if offset <= 0 {
            continue;
        }
        let timestamp = add_days(base, offset);
        days.push(AvailableDay {
            auction_id: current_auction_id + offset as u64,
            timestamp,
            date: to_calendar_date(timestamp)?,
            is_bought,
        });
    }

    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SECONDS_PER_DAY;

    // 2025-01-15 12:00 EST.
    const END_TIME: i64 = 1_736_960_400;
    const AUCTION_ID: u64 = 100;

    #[test]
    fn builds_one_day_per_future_offset() {
        let days = build_window(1, 3, &[false, true, false], AUCTION_ID, END_TIME).unwrap();

        assert_eq!(days.len(), 3);
        assert_eq!(
            days.iter().map(|day| day.auction_id).collect::<Vec<_>>(),
            vec![101, 102, 103]
        );
        for (index, day) in days.iter().enumerate() {
            let offset = index as i64 + 1;
            assert_eq!(day.timestamp, END_TIME + offset * SECONDS_PER_DAY);
            assert_eq!(
                day.date,
                NaiveDate::from_ymd_opt(2025, 1, 15 + offset as u32).unwrap()
            );
        }
        assert!(!days[0].is_bought);
        assert!(days[1].is_bought);
        assert!(!days[2].is_bought);
    }

    #[test]
    fn skips_offsets_at_or_below_zero() {
        let status = [true, false, true, false, true];
        let days = build_window(-2, 2, &status, AUCTION_ID, END_TIME).unwrap();

        // Only offsets 1 and 2 survive, keeping their own status entries.
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].auction_id, 101);
        assert!(!days[0].is_bought);
        assert_eq!(days[1].auction_id, 102);
        assert!(days[1].is_bought);
    }

    #[test]
    fn inverted_bounds_yield_an_empty_window() {
        let days = build_window(3, 1, &[false, false, false], AUCTION_ID, END_TIME).unwrap();
        assert!(days.is_empty());
    }

    #[test]
    fn empty_status_yields_an_empty_window() {
        let days = build_window(1, 3, &[], AUCTION_ID, END_TIME).unwrap();
        assert!(days.is_empty());
    }

    #[test]
    fn mismatched_status_length_is_rejected() {
        let err = build_window(1, 5, &[false, true, false], AUCTION_ID, END_TIME).unwrap_err();
        assert!(matches!(err, MegaphoneError::Validation(_)));
        assert!(err.to_string().contains("3 entries"));
    }

    #[test]
    fn end_time_is_normalized_before_projection() {
        // 2025-01-16 02:00 UTC is still Jan 15 in New York, so day one is Jan 16.
        let late_evening = 1_736_992_800;
        let days = build_window(1, 1, &[false], AUCTION_ID, late_evening).unwrap();

        assert_eq!(days[0].timestamp, END_TIME + SECONDS_PER_DAY);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 1, 16).unwrap());
    }

    #[test]
    fn dates_stay_on_eastern_days_across_the_dst_switch() {
        // 2025-03-08 12:00 EST; the next day the projected instant drifts
        // to 13:00 EDT but the Eastern date is still March 9.
        let pre_dst_noon = 1_741_453_200;
        let days = build_window(1, 2, &[false, false], AUCTION_ID, pre_dst_noon).unwrap();

        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(days[1].timestamp - days[0].timestamp, SECONDS_PER_DAY);
    }
}
