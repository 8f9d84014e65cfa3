use crate::core::worker::{default_asset_paths, WorkerSettings, DEFAULT_CACHE_NAME};
use crate::utils::error::{NightPrayerError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_STORAGE_PATH: &str = "./.offline-cache";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    pub site: SiteConfig,
    pub network: Option<NetworkConfig>,
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_name")]
    pub name: String,
    #[serde(default = "default_asset_paths")]
    pub assets: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: default_cache_name(),
            assets: default_asset_paths(),
        }
    }
}

fn default_cache_name() -> String {
    DEFAULT_CACHE_NAME.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// 網站根目錄，同時決定 origin
    pub scope: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: String,
}

impl WorkerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(NightPrayerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| NightPrayerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SITE_SCOPE})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| NightPrayerError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_cache_name("cache.name", &self.cache.name)?;
        validation::validate_positive_number("cache.assets", self.cache.assets.len(), 1)?;
        validation::validate_url("site.scope", &self.site.scope)?;

        for asset in &self.cache.assets {
            validation::validate_path("cache.assets", asset)?;
        }

        if let Some(timeout) = self.network.as_ref().and_then(|n| n.timeout_seconds) {
            validation::validate_range("network.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(storage) = &self.storage {
            validation::validate_path("storage.path", &storage.path)?;
        }

        // 所有資源必須與 scope 同源
        let settings = self.settings()?;
        for asset in &settings.assets {
            if asset.origin() != settings.scope.origin() {
                return Err(NightPrayerError::InvalidConfigValueError {
                    field: "cache.assets".to_string(),
                    value: asset.to_string(),
                    reason: "Asset must share the origin of site.scope".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn settings(&self) -> Result<WorkerSettings> {
        WorkerSettings::new(&self.cache.name, &self.site.scope, &self.cache.assets)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.network
                .as_ref()
                .and_then(|n| n.timeout_seconds)
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.network.as_ref().and_then(|n| n.user_agent.as_deref())
    }

    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(
            self.storage
                .as_ref()
                .map(|s| s.path.as_str())
                .unwrap_or(DEFAULT_STORAGE_PATH),
        )
    }
}

impl Validate for WorkerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
