use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike, Utc};
use once_cell::sync::Lazy;

/// Placement-local timezone (UTC+7). Fixed product decision, not a
/// config knob.
const LOCAL_OFFSET_SECS: i32 = 7 * 3600;

/// Check-ins after 09:00 local time count as late.
const LATE_HOUR: u32 = 9;

static LOCAL_OFFSET: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::east_opt(LOCAL_OFFSET_SECS).expect("valid UTC offset"));

fn to_local(instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.with_timezone(&*LOCAL_OFFSET)
}

/// Calendar day a timestamp belongs to, in the placement-local timezone.
/// Two instants map to the same day exactly when their UTC+7 dates match.
pub fn attendance_day(instant: DateTime<Utc>) -> NaiveDate {
    to_local(instant).date_naive()
}

/// Late means strictly after 09:00 local. 09:00:59 is still on time
/// because only whole minutes past the hour are counted.
pub fn is_late(instant: DateTime<Utc>) -> bool {
    let local = to_local(instant);
    local.hour() > LATE_HOUR || (local.hour() == LATE_HOUR && local.minute() > 0)
}

/// First and last day of a month, both inclusive. `None` when the
/// month is outside 1..=12 or the year is out of chrono's range.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_month.pred_opt()?))
}

/// (year, month) of the month `months_back` months before the month
/// containing `day`.
pub fn shift_month(day: NaiveDate, months_back: u32) -> (i32, u32) {
    let total = day.year() * 12 + day.month0() as i32 - months_back as i32;
    (total.div_euclid(12), total.rem_euclid(12) as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn same_local_day_shares_a_key() {
        // 00:30Z and 16:59Z are both 10 March in UTC+7.
        let morning = attendance_day(utc(2026, 3, 10, 0, 30, 0));
        let evening = attendance_day(utc(2026, 3, 10, 16, 59, 59));
        assert_eq!(morning, evening);
        assert_eq!(morning, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
    }

    #[test]
    fn local_midnight_splits_the_day() {
        // 17:00Z is exactly 00:00 of the next day in UTC+7.
        let before = attendance_day(utc(2026, 3, 10, 16, 59, 59));
        let after = attendance_day(utc(2026, 3, 10, 17, 0, 0));
        assert_eq!(before, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert_eq!(after, NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
    }

    #[test]
    fn late_utc_evening_lands_on_next_local_day() {
        // 18:00Z on 9 March is 01:00 on 10 March in UTC+7.
        let key = attendance_day(utc(2026, 3, 9, 18, 0, 0));
        assert_eq!(key, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
    }

    #[test]
    fn late_cutoff_is_exclusive_of_nine_sharp() {
        // Local times below are UTC+7, built from UTC by subtracting 7h.
        assert!(!is_late(utc(2026, 3, 10, 1, 59, 59))); // 08:59:59 local
        assert!(!is_late(utc(2026, 3, 10, 2, 0, 0))); // 09:00:00 local
        assert!(!is_late(utc(2026, 3, 10, 2, 0, 59))); // 09:00:59 local
        assert!(is_late(utc(2026, 3, 10, 2, 1, 0))); // 09:01:00 local
        assert!(is_late(utc(2026, 3, 10, 7, 0, 0))); // 14:00 local
        assert!(is_late(utc(2026, 3, 10, 16, 30, 0))); // 23:30 local
        assert!(!is_late(utc(2026, 3, 10, 17, 5, 0))); // 00:05 next local day
    }

    #[test]
    fn month_bounds_handles_lengths_and_leap_years() {
        assert_eq!(
            month_bounds(2026, 2),
            Some((
                NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
            ))
        );
        assert_eq!(
            month_bounds(2024, 2).unwrap().1,
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            month_bounds(2026, 12),
            Some((
                NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
            ))
        );
        assert_eq!(month_bounds(2026, 0), None);
        assert_eq!(month_bounds(2026, 13), None);
    }

    #[test]
    fn shift_month_wraps_across_years() {
        let aug = NaiveDate::from_ymd_opt(2026, 8, 22).unwrap();
        assert_eq!(shift_month(aug, 0), (2026, 8));
        assert_eq!(shift_month(aug, 5), (2026, 3));
        assert_eq!(shift_month(aug, 8), (2025, 12));

        let jan = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(shift_month(jan, 1), (2025, 12));
        assert_eq!(shift_month(jan, 13), (2024, 12));
    }
}
