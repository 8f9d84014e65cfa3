use crate::domain::model::ClockTime;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use chrono::NaiveDate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "night-prayer")]
#[command(about = "Compute the end of Isha and the last third of the night")]
pub struct CliConfig {
    /// Maghrib time, 24-hour HH:MM
    pub maghrib: String,

    /// Fajr time, 24-hour HH:MM
    pub fajr: String,

    #[arg(long, help = "Reference date (YYYY-MM-DD), defaults to today")]
    pub date: Option<NaiveDate>,

    #[arg(
        long,
        help = "Current clock time (HH:MM); anchors the night relative to it instead of a fixed date"
    )]
    pub now: Option<String>,

    #[arg(long, help = "Show how far each time is from now")]
    pub relative: bool,

    #[arg(long, help = "Print the result as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn maghrib_time(&self) -> Result<ClockTime> {
        ClockTime::parse_field("maghrib", &self.maghrib)
    }

    pub fn fajr_time(&self) -> Result<ClockTime> {
        ClockTime::parse_field("fajr", &self.fajr)
    }

    pub fn now_time(&self) -> Result<Option<ClockTime>> {
        self.now
            .as_deref()
            .map(|now| ClockTime::parse_field("now", now))
            .transpose()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.maghrib_time()?;
        self.fajr_time()?;
        self.now_time()?;
        Ok(())
    }
}
