pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::WorkerConfig;

pub use adapters::{DiskCacheStorage, HttpNetwork, MemoryCacheStorage};
pub use crate::core::calculator::{calculate_times, calculate_times_at, calculate_times_from_str};
pub use crate::core::format::{format_time, relative_time};
pub use crate::core::worker::{FetchOutcome, OfflineWorker, WorkerSettings, WorkerState};
pub use domain::model::{ClockTime, PrayerTimes, Request, RequestMode, Response};
pub use utils::error::{NightPrayerError, Result};
