pub mod calculator;
pub mod format;
pub mod worker;

pub use crate::domain::model::{ClockTime, Fraction, Interval, PrayerTimes, Request, Response};
pub use crate::domain::ports::{CacheStorage, Network};
pub use crate::utils::error::Result;
