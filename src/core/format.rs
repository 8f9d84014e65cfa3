use chrono::{NaiveDateTime, Timelike};

const MS_PER_MINUTE: u64 = 60 * 1000;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// 以 12 小時制顯示，例如 `1:40 AM`；秒數直接捨去
pub fn format_time<T: Timelike>(instant: &T) -> String {
    let hour = instant.hour();
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, instant.minute(), period)
}

/// `current` 到 `target` 的距離，例如 `in 2h 5m` 或 `45m ago`
///
/// 差距為零時算過去（`0m ago`）
pub fn relative_time(target: NaiveDateTime, current: NaiveDateTime) -> String {
    let diff_ms = (target - current).num_milliseconds();
    let abs_ms = diff_ms.unsigned_abs();

    let hours = abs_ms / MS_PER_HOUR;
    let minutes = (abs_ms % MS_PER_HOUR) / MS_PER_MINUTE;

    let time_str = if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    };

    if diff_ms > 0 {
        format!("in {}", time_str)
    } else {
        format!("{} ago", time_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn test_format_time_boundaries() {
        assert_eq!(format_time(&at(0, 5, 0)), "12:05 AM");
        assert_eq!(format_time(&at(12, 0, 0)), "12:00 PM");
        assert_eq!(format_time(&at(23, 59, 0)), "11:59 PM");
        assert_eq!(format_time(&at(1, 40, 0)), "1:40 AM");
        assert_eq!(format_time(&at(11, 9, 0)), "11:09 AM");
        assert_eq!(format_time(&at(13, 0, 0)), "1:00 PM");
    }

    #[test]
    fn test_format_time_truncates_seconds() {
        assert_eq!(format_time(&at(0, 0, 59)), "12:00 AM");
        assert_eq!(format_time(&at(1, 40, 20)), "1:40 AM");
    }

    #[test]
    fn test_format_time_every_minute_of_the_day() {
        for hour in 0..24 {
            for minute in 0..60 {
                let formatted = format_time(&NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
                let (clock, period) = formatted.split_once(' ').unwrap();
                let (h, m) = clock.split_once(':').unwrap();

                let display_hour: u32 = h.parse().unwrap();
                assert!((1..=12).contains(&display_hour), "{}", formatted);
                assert_eq!(display_hour % 12, hour % 12, "{}", formatted);
                assert_eq!(m.len(), 2);
                assert_eq!(m.parse::<u32>().unwrap(), minute);
                assert_eq!(period, if hour >= 12 { "PM" } else { "AM" });
            }
        }
    }

    #[test]
    fn test_relative_time_future() {
        assert_eq!(relative_time(at(22, 5, 0), at(20, 0, 0)), "in 2h 5m");
        assert_eq!(relative_time(at(20, 45, 0), at(20, 0, 0)), "in 45m");
    }

    #[test]
    fn test_relative_time_past() {
        assert_eq!(relative_time(at(19, 0, 0), at(20, 30, 0)), "1h 30m ago");
        assert_eq!(relative_time(at(19, 59, 0), at(20, 0, 0)), "1m ago");
    }

    #[test]
    fn test_relative_time_minutes_come_from_remainder() {
        // 1h 59m 59s: minutes are floored from the remainder
        assert_eq!(relative_time(at(21, 59, 59), at(20, 0, 0)), "in 1h 59m");
        assert_eq!(relative_time(at(20, 0, 30), at(20, 0, 0)), "in 0m");
    }

    #[test]
    fn test_relative_time_zero_is_past() {
        assert_eq!(relative_time(at(20, 0, 0), at(20, 0, 0)), "0m ago");
    }
}
