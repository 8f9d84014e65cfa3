use crate::domain::model::ClockTime;
use crate::utils::error::{NightPrayerError, Result};
use std::ops::RangeInclusive;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Maghrib 合理的小時範圍
pub const MAGHRIB_HOURS: RangeInclusive<u8> = 13..=23;
/// Fajr 合理的小時範圍
pub const FAJR_HOURS: RangeInclusive<u8> = 0..=8;

/// 時間格式正確但不太合理時的提醒，不會中斷計算
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeAdvisory {
    pub field: &'static str,
    pub time: ClockTime,
    pub message: String,
}

pub fn check_maghrib(time: ClockTime) -> Option<RangeAdvisory> {
    check_hour_range("maghrib", "Maghrib", time, MAGHRIB_HOURS)
}

pub fn check_fajr(time: ClockTime) -> Option<RangeAdvisory> {
    check_hour_range("fajr", "Fajr", time, FAJR_HOURS)
}

fn check_hour_range(
    field: &'static str,
    label: &str,
    time: ClockTime,
    hours: RangeInclusive<u8>,
) -> Option<RangeAdvisory> {
    if hours.contains(&time.hour()) {
        return None;
    }
    Some(RangeAdvisory {
        field,
        time,
        message: format!("🚨 Please check that the time for {} is correct", label),
    })
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(NightPrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(NightPrayerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(NightPrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(NightPrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(NightPrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 快取名稱同時是磁碟儲存的目錄名稱
pub fn validate_cache_name(field_name: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(NightPrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }

    if name.starts_with('.')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(NightPrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Only ASCII letters, digits, '-', '_' and '.' are allowed, and the name must not start with '.'"
                .to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(NightPrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(NightPrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
