use chrono::{Local, NaiveDateTime};
use clap::Parser;
use night_prayer::core::calculator::{calculate_times, calculate_times_at};
use night_prayer::core::format::{format_time, relative_time};
use night_prayer::utils::{logger, validation, validation::Validate};
use night_prayer::{CliConfig, PrayerTimes};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Report {
    maghrib: String,
    fajr: String,
    end_of_isha: String,
    last_third: String,
    end_of_isha_at: NaiveDateTime,
    last_third_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_of_isha_relative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_third_relative: Option<String>,
    warnings: Vec<String>,
}

impl Report {
    fn new(times: &PrayerTimes, current: Option<NaiveDateTime>, warnings: Vec<String>) -> Self {
        Self {
            maghrib: format_time(&times.maghrib),
            fajr: format_time(&times.fajr),
            end_of_isha: format_time(&times.end_of_isha),
            last_third: format_time(&times.last_third),
            end_of_isha_at: times.end_of_isha,
            last_third_at: times.last_third,
            end_of_isha_relative: current.map(|now| relative_time(times.end_of_isha, now)),
            last_third_relative: current.map(|now| relative_time(times.last_third, now)),
            warnings,
        }
    }

    fn print(&self) {
        let suffix = |relative: &Option<String>| {
            relative
                .as_ref()
                .map(|r| format!(" ({})", r))
                .unwrap_or_default()
        };
        println!("🌅 Maghrib: {}   Fajr: {}", self.maghrib, self.fajr);
        println!(
            "🌙 End of Isha: {}{}",
            self.end_of_isha,
            suffix(&self.end_of_isha_relative)
        );
        println!(
            "✨ Last third of the night: {}{}",
            self.last_third,
            suffix(&self.last_third_relative)
        );
    }
}

fn run(config: &CliConfig) -> night_prayer::Result<Report> {
    config.validate()?;

    let maghrib = config.maghrib_time()?;
    let fajr = config.fajr_time()?;

    // 範圍檢查只是提醒，不會中斷計算
    let warnings: Vec<String> = [validation::check_maghrib(maghrib), validation::check_fajr(fajr)]
        .into_iter()
        .flatten()
        .map(|advisory| {
            tracing::warn!("{} ({} = {})", advisory.message, advisory.field, advisory.time);
            advisory.message
        })
        .collect();

    let local_now = Local::now().naive_local();
    let reference_day = config.date.unwrap_or(local_now.date());

    let (times, current) = match config.now_time()? {
        Some(now) => {
            let now = now.on(reference_day);
            tracing::debug!("Anchoring the night relative to {}", now);
            (calculate_times_at(maghrib, fajr, now)?, now)
        }
        None => (calculate_times(maghrib, fajr, reference_day)?, local_now),
    };

    let current = config.relative.then_some(current);
    Ok(Report::new(&times, current, warnings))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    match run(&config) {
        Ok(report) => {
            if config.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for warning in &report.warnings {
                    eprintln!("{}", warning);
                }
                report.print();
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Calculation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.severity().exit_code());
        }
    }
}
