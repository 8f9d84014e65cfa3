use crate::utils::error::{NightPrayerError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// 一天中的時刻，精確到分鐘，不含時區
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        Self::checked("time", &format!("{}:{:02}", hour, minute), hour, minute)
    }

    /// 解析 `H:MM` 或 `HH:MM`，錯誤訊息會帶上欄位名稱
    pub fn parse_field(field: &str, input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let (hour_str, minute_str) = trimmed
            .split_once(':')
            .ok_or_else(|| NightPrayerError::validation(field, input, "expected HH:MM"))?;

        if hour_str.is_empty() || hour_str.len() > 2 || !hour_str.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(NightPrayerError::validation(
                field,
                input,
                "hour must be one or two digits",
            ));
        }
        if minute_str.len() != 2 || !minute_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NightPrayerError::validation(
                field,
                input,
                "minute must be exactly two digits",
            ));
        }

        let hour = hour_str
            .parse::<u8>()
            .map_err(|e| NightPrayerError::validation(field, input, e.to_string()))?;
        let minute = minute_str
            .parse::<u8>()
            .map_err(|e| NightPrayerError::validation(field, input, e.to_string()))?;

        Self::checked(field, input, hour, minute)
    }

    fn checked(field: &str, input: &str, hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 {
            return Err(NightPrayerError::validation(
                field,
                input,
                "hour must be between 0 and 23",
            ));
        }
        if minute > 59 {
            return Err(NightPrayerError::validation(
                field,
                input,
                "minute must be between 0 and 59",
            ));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn to_naive_time(self) -> NaiveTime {
        // hour/minute 在建構時已檢查範圍
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or_default()
    }

    pub fn on(self, day: NaiveDate) -> NaiveDateTime {
        day.and_time(self.to_naive_time())
    }
}

impl FromStr for ClockTime {
    type Err = NightPrayerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_field("time", s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = NightPrayerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// (0, 1) 之間的精確比例，用來在 [`Interval`] 中取點
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    numerator: i64,
    denominator: i64,
}

impl Fraction {
    pub const HALF: Fraction = Fraction {
        numerator: 1,
        denominator: 2,
    };
    pub const TWO_THIRDS: Fraction = Fraction {
        numerator: 2,
        denominator: 3,
    };

    pub fn new(numerator: i64, denominator: i64) -> Result<Self> {
        if denominator <= 0 || numerator <= 0 || numerator >= denominator {
            return Err(NightPrayerError::validation(
                "fraction",
                &format!("{}/{}", numerator, denominator),
                "fraction must lie strictly between 0 and 1",
            ));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }
}

/// Maghrib → Fajr，固定在同一個參考日；`end` 一定晚於 `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if end <= start {
            return Err(NightPrayerError::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrayerTimes {
    pub maghrib: NaiveDateTime,
    pub fajr: NaiveDateTime,
    pub end_of_isha: NaiveDateTime,
    pub last_third: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    #[default]
    NoCors,
    Cors,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: Url,
    pub method: String,
    pub mode: RequestMode,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: "GET".to_string(),
            mode: RequestMode::default(),
        }
    }

    pub fn navigate(url: Url) -> Self {
        Self {
            mode: RequestMode::Navigate,
            ..Self::get(url)
        }
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// 2xx
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
