use crate::domain::model::{ClockTime, Fraction, Interval, PrayerTimes};
use crate::utils::error::{NightPrayerError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// 日期平移；超出 chrono 可表示的範圍時回傳錯誤而不是 panic
fn shift_days(field: &str, value: NaiveDateTime, days: i64) -> Result<NaiveDateTime> {
    value
        .checked_add_signed(Duration::days(days))
        .ok_or_else(|| {
            NightPrayerError::validation(
                field,
                &value.date().to_string(),
                "date is outside the supported calendar range",
            )
        })
}

/// 將 Maghrib 與 Fajr 固定在 `reference_day`，Fajr 不晚於 Maghrib 時移到隔天
pub fn anchor_interval(
    maghrib: ClockTime,
    fajr: ClockTime,
    reference_day: NaiveDate,
) -> Result<Interval> {
    let start = maghrib.on(reference_day);
    let mut end = fajr.on(reference_day);

    // 相等也視為隔天的 Fajr
    if end <= start {
        end = shift_days("date", end, 1)?;
    }

    Interval::new(start, end)
}

/// `start + fraction * (end - start)`，取到毫秒並無條件捨去
pub fn fractional_point(interval: &Interval, fraction: Fraction) -> NaiveDateTime {
    let span_ms = interval.duration().num_milliseconds();
    let offset_ms = span_ms * fraction.numerator() / fraction.denominator();
    interval.start() + Duration::milliseconds(offset_ms)
}

pub fn times_for(interval: &Interval) -> PrayerTimes {
    PrayerTimes {
        maghrib: interval.start(),
        fajr: interval.end(),
        end_of_isha: fractional_point(interval, Fraction::HALF),
        last_third: fractional_point(interval, Fraction::TWO_THIRDS),
    }
}

pub fn calculate_times(
    maghrib: ClockTime,
    fajr: ClockTime,
    reference_day: NaiveDate,
) -> Result<PrayerTimes> {
    let interval = anchor_interval(maghrib, fajr, reference_day)?;
    tracing::debug!(
        "Interval {} -> {} ({} minutes)",
        interval.start(),
        interval.end(),
        interval.duration().num_minutes()
    );
    Ok(times_for(&interval))
}

pub fn calculate_times_from_str(
    maghrib: &str,
    fajr: &str,
    reference_day: NaiveDate,
) -> Result<PrayerTimes> {
    let maghrib = ClockTime::parse_field("maghrib", maghrib)?;
    let fajr = ClockTime::parse_field("fajr", fajr)?;
    calculate_times(maghrib, fajr, reference_day)
}

/// 以 `now` 為基準而非固定日期
///
/// 午夜後到中午前、今晚的 Maghrib 還沒到時，顯示昨晚開始的那一夜。
/// Fajr 之後的早上也一樣。
pub fn calculate_times_at(
    maghrib: ClockTime,
    fajr: ClockTime,
    now: NaiveDateTime,
) -> Result<PrayerTimes> {
    let mut start = maghrib.on(now.date());
    let mut end = fajr.on(now.date());

    if end <= start {
        end = shift_days("now", end, 1)?;
    }

    if now < end && now.hour() < 12 && start > now {
        tracing::debug!("Before noon at {}, using the night that started yesterday", now);
        start = shift_days("now", start, -1)?;
        end = shift_days("now", end, -1)?;
    }

    Ok(times_for(&Interval::new(start, end)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
    }

    fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
        day.and_hms_opt(hour, minute, 0).unwrap()
    }

    fn next_day() -> NaiveDate {
        day().succ_opt().unwrap()
    }

    #[test]
    fn test_ten_hour_night_from_seven() {
        let times = calculate_times_from_str("19:00", "05:00", day()).unwrap();
        assert_eq!(times.maghrib, at(day(), 19, 0));
        assert_eq!(times.fajr, at(next_day(), 5, 0));
        assert_eq!(times.end_of_isha, at(next_day(), 0, 0));
        assert_eq!(times.last_third, at(next_day(), 1, 40));
    }

    #[test]
    fn test_ten_hour_night_from_half_past_six() {
        let times = calculate_times_from_str("18:30", "04:30", day()).unwrap();
        assert_eq!(times.end_of_isha, at(day(), 23, 30));
        assert_eq!(times.last_third, at(next_day(), 1, 10));
    }

    #[test]
    fn test_fractional_minutes_are_floored() {
        // 9h 59m span: half = 4h 59m 30s, two thirds = 6h 39m 20s
        let times = calculate_times_from_str("19:01", "05:00", day()).unwrap();
        assert_eq!(times.end_of_isha.minute(), 0);
        assert_eq!(times.end_of_isha.hour(), 0);
        assert_eq!(times.end_of_isha.second(), 30);
        assert_eq!((times.last_third.hour(), times.last_third.minute()), (1, 40));
        assert_eq!(times.last_third.second(), 20);
    }

    #[test]
    fn test_equal_times_roll_over_to_full_day() {
        let times = calculate_times_from_str("20:00", "20:00", day()).unwrap();
        assert_eq!(times.fajr, at(next_day(), 20, 0));
        assert_eq!(times.end_of_isha, at(next_day(), 8, 0));
        assert_eq!(times.last_third, at(next_day(), 12, 0));
    }

    #[test]
    fn test_fajr_after_maghrib_same_day() {
        // no rollover when Fajr is already later on the anchored day
        let times = calculate_times_from_str("01:00", "05:00", day()).unwrap();
        assert_eq!(times.fajr, at(day(), 5, 0));
        assert_eq!(times.end_of_isha, at(day(), 3, 0));
    }

    #[test]
    fn test_points_lie_strictly_inside_interval() {
        for maghrib_minutes in (0..1440).step_by(7) {
            for fajr_minutes in (0..1440).step_by(11) {
                if maghrib_minutes == fajr_minutes {
                    continue;
                }
                let maghrib =
                    ClockTime::new((maghrib_minutes / 60) as u8, (maghrib_minutes % 60) as u8)
                        .unwrap();
                let fajr =
                    ClockTime::new((fajr_minutes / 60) as u8, (fajr_minutes % 60) as u8).unwrap();

                let times = calculate_times(maghrib, fajr, day()).unwrap();
                assert!(times.maghrib < times.end_of_isha, "{} {}", maghrib, fajr);
                assert!(times.end_of_isha < times.last_third, "{} {}", maghrib, fajr);
                assert!(times.last_third < times.fajr, "{} {}", maghrib, fajr);
            }
        }
    }

    #[test]
    fn test_calculation_is_deterministic() {
        let first = calculate_times_from_str("19:12", "05:47", day()).unwrap();
        let second = calculate_times_from_str("19:12", "05:47", day()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_input_names_field() {
        let err = calculate_times_from_str("19:00", "5am", day()).unwrap_err();
        assert!(matches!(
            err,
            NightPrayerError::ValidationError { ref field, .. } if field == "fajr"
        ));

        let err = calculate_times_from_str("25:00", "05:00", day()).unwrap_err();
        assert!(matches!(
            err,
            NightPrayerError::ValidationError { ref field, .. } if field == "maghrib"
        ));
    }

    #[test]
    fn test_custom_fraction() {
        let interval = anchor_interval(
            ClockTime::new(20, 0).unwrap(),
            ClockTime::new(4, 0).unwrap(),
            day(),
        )
        .unwrap();
        let quarter = Fraction::new(1, 4).unwrap();
        assert_eq!(fractional_point(&interval, quarter), at(day(), 22, 0));
    }

    #[test]
    fn test_now_relative_after_midnight_uses_last_night() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let yesterday = today.pred_opt().unwrap();
        let maghrib = ClockTime::new(19, 0).unwrap();
        let fajr = ClockTime::new(5, 0).unwrap();

        let times = calculate_times_at(maghrib, fajr, at(today, 2, 0)).unwrap();
        assert_eq!(times.maghrib, at(yesterday, 19, 0));
        assert_eq!(times.end_of_isha, at(today, 0, 0));
        assert_eq!(times.last_third, at(today, 1, 40));
    }

    #[test]
    fn test_now_relative_in_the_evening_uses_tonight() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let maghrib = ClockTime::new(19, 0).unwrap();
        let fajr = ClockTime::new(5, 0).unwrap();

        let times = calculate_times_at(maghrib, fajr, at(today, 20, 15)).unwrap();
        assert_eq!(times.maghrib, at(today, 19, 0));
        assert_eq!(times.fajr, at(today.succ_opt().unwrap(), 5, 0));
    }

    #[test]
    fn test_now_relative_morning_after_fajr_still_shows_last_night() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let maghrib = ClockTime::new(19, 0).unwrap();
        let fajr = ClockTime::new(5, 0).unwrap();

        let times = calculate_times_at(maghrib, fajr, at(today, 10, 0)).unwrap();
        assert_eq!(times.fajr, at(today, 5, 0));
    }

    #[test]
    fn test_now_relative_afternoon_uses_tonight() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let maghrib = ClockTime::new(19, 0).unwrap();
        let fajr = ClockTime::new(5, 0).unwrap();

        let times = calculate_times_at(maghrib, fajr, at(today, 15, 0)).unwrap();
        assert_eq!(times.maghrib, at(today, 19, 0));
    }

    #[test]
    fn test_rollover_past_last_representable_day_is_an_error() {
        match calculate_times_from_str("19:00", "05:00", NaiveDate::MAX) {
            Err(NightPrayerError::ValidationError { field, .. }) => assert_eq!(field, "date"),
            other => panic!("expected validation error, got {:?}", other),
        }

        // no rollover needed, so the last day still works
        let times = calculate_times_from_str("05:00", "19:00", NaiveDate::MAX).unwrap();
        assert_eq!(times.end_of_isha, at(NaiveDate::MAX, 12, 0));
    }

    #[test]
    fn test_first_representable_day_still_rolls_forward() {
        let times = calculate_times_from_str("19:00", "05:00", NaiveDate::MIN).unwrap();
        assert_eq!(times.fajr.date(), NaiveDate::MIN.succ_opt().unwrap());
    }

    #[test]
    fn test_now_relative_at_calendar_edges_is_an_error() {
        let maghrib: ClockTime = "19:00".parse().unwrap();
        let fajr: ClockTime = "05:00".parse().unwrap();

        // the previous night would start before NaiveDate::MIN
        let result = calculate_times_at(maghrib, fajr, at(NaiveDate::MIN, 1, 0));
        assert!(matches!(
            result,
            Err(NightPrayerError::ValidationError { ref field, .. }) if field == "now"
        ));

        let result = calculate_times_at(maghrib, fajr, at(NaiveDate::MAX, 20, 0));
        assert!(matches!(
            result,
            Err(NightPrayerError::ValidationError { ref field, .. }) if field == "now"
        ));
    }
}
