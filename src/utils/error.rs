use thiserror::Error;

#[derive(Error, Debug)]
pub enum NightPrayerError {
    #[error("Invalid {field} value '{value}': {reason}")]
    ValidationError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Interval must be positive (start {start}, end {end})")]
    InvalidInterval { start: String, end: String },

    #[error("Install failed for {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("Network request failed for {url}: {message}")]
    NetworkError { url: String, message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Worker is {actual}, expected {expected}")]
    WorkerStateError { expected: String, actual: String },

    #[error("Cache storage error: {message}")]
    CacheError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Storage,
    Configuration,
    Lifecycle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 程序退出碼，任何錯誤都不會回傳 0
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2, // 可重試
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl NightPrayerError {
    pub fn validation(field: &str, value: &str, reason: impl Into<String>) -> Self {
        NightPrayerError::ValidationError {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            NightPrayerError::ValidationError { .. } | NightPrayerError::InvalidInterval { .. } => {
                ErrorCategory::Input
            }
            NightPrayerError::InstallFailed { .. }
            | NightPrayerError::NetworkError { .. }
            | NightPrayerError::ApiError(_) => ErrorCategory::Network,
            NightPrayerError::CacheError { .. }
            | NightPrayerError::IoError(_)
            | NightPrayerError::SerializationError(_) => ErrorCategory::Storage,
            NightPrayerError::WorkerStateError { .. } => ErrorCategory::Lifecycle,
            NightPrayerError::UrlError(_)
            | NightPrayerError::ConfigError { .. }
            | NightPrayerError::ConfigValidationError { .. }
            | NightPrayerError::InvalidConfigValueError { .. }
            | NightPrayerError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            // 網路錯誤通常可以重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Lifecycle => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            NightPrayerError::ValidationError { .. } => {
                "Enter times as HH:MM using a 24-hour clock, e.g. 19:05"
            }
            NightPrayerError::InvalidInterval { .. } => {
                "Check that Maghrib and Fajr were entered correctly"
            }
            NightPrayerError::InstallFailed { .. } => {
                "Make sure every asset listed in the cache manifest is reachable, then install again"
            }
            NightPrayerError::NetworkError { .. } | NightPrayerError::ApiError(_) => {
                "Check your network connection or run `offline-cache install` while online"
            }
            NightPrayerError::WorkerStateError { .. } => {
                "Run `offline-cache install` before activating or fetching"
            }
            NightPrayerError::CacheError { .. }
            | NightPrayerError::IoError(_)
            | NightPrayerError::SerializationError(_) => {
                "Check permissions of the cache directory, or delete it and install again"
            }
            NightPrayerError::UrlError(_) => "Use absolute http(s) URLs in the configuration",
            NightPrayerError::ConfigError { .. }
            | NightPrayerError::ConfigValidationError { .. }
            | NightPrayerError::InvalidConfigValueError { .. }
            | NightPrayerError::MissingConfigError { .. } => {
                "Review the configuration file against offline-cache.toml"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            NightPrayerError::ValidationError { field, value, .. } => {
                format!("'{}' is not a valid time for {}", value, field)
            }
            NightPrayerError::InvalidInterval { .. } => {
                "Fajr must come after Maghrib".to_string()
            }
            NightPrayerError::InstallFailed { url, .. } => {
                format!("Could not cache {}; offline mode was not installed", url)
            }
            NightPrayerError::NetworkError { url, .. } => {
                format!("You appear to be offline and {} is not cached", url)
            }
            NightPrayerError::WorkerStateError { .. } => {
                "The offline cache is not ready yet".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NightPrayerError>;
