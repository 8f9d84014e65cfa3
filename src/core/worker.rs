use crate::domain::model::{Request, Response};
use crate::domain::ports::{CacheStorage, Network};
use crate::utils::error::{NightPrayerError, Result};
use futures::future::try_join_all;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use url::Url;

pub const DEFAULT_CACHE_NAME: &str = "night-prayer-v1";

/// 網站附帶的正方形圖示尺寸（像素）
pub const ICON_SIZES: [u32; 2] = [192, 512];

/// 預設離線資源清單：首頁、manifest 與兩個圖示
pub fn default_asset_paths() -> Vec<String> {
    let mut assets = vec!["./".to_string(), "./manifest.json".to_string()];
    assets.extend(
        ICON_SIZES
            .iter()
            .map(|size| format!("./icons/icon-{}.png", size)),
    );
    assets
}

/// URL 的快取鍵，去掉 fragment
pub fn cache_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.into()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSettings {
    pub cache_name: String,
    pub scope: Url,
    pub assets: Vec<Url>,
}

impl WorkerSettings {
    /// 資源路徑以 `scope` 為基準解析
    pub fn new(cache_name: &str, scope: &str, asset_paths: &[String]) -> Result<Self> {
        let scope = Url::parse(scope)?;
        let assets = asset_paths
            .iter()
            .map(|path| scope.join(path))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            cache_name: cache_name.to_string(),
            scope,
            assets,
        })
    }

    /// 根文件，離線時提供給頁面導覽
    pub fn root(&self) -> Url {
        self.scope.join("./").unwrap_or_else(|_| self.scope.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 不攔截，由呼叫端自行連網
    Passthrough,
    Cache(Response),
    Network(Response),
    /// 離線導覽時回傳的快取根文件
    Fallback(Response),
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Cache(response)
            | FetchOutcome::Network(response)
            | FetchOutcome::Fallback(response) => Some(response),
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Cache(response)
            | FetchOutcome::Network(response)
            | FetchOutcome::Fallback(response) => Some(response),
        }
    }
}

/// 離線快取 worker：install 時預先快取，activate 時清除舊版快取，
/// 同源 GET 以 stale-while-revalidate 回應
pub struct OfflineWorker<N: Network, C: CacheStorage> {
    settings: WorkerSettings,
    network: Arc<N>,
    cache: Arc<C>,
    state: WorkerState,
    background: Mutex<JoinSet<()>>,
}

impl<N: Network + 'static, C: CacheStorage + 'static> OfflineWorker<N, C> {
    pub fn new(settings: WorkerSettings, network: Arc<N>, cache: Arc<C>) -> Self {
        Self {
            settings,
            network,
            cache,
            state: WorkerState::Parsed,
            background: Mutex::new(JoinSet::new()),
        }
    }

    /// 接手先前執行已 install、尚待 activate 的快取
    pub async fn from_installed(
        settings: WorkerSettings,
        network: Arc<N>,
        cache: Arc<C>,
    ) -> Result<Self> {
        if !cache.keys().await?.contains(&settings.cache_name) {
            return Err(NightPrayerError::WorkerStateError {
                expected: WorkerState::Installed.to_string(),
                actual: WorkerState::Parsed.to_string(),
            });
        }

        let mut worker = Self::new(settings, network, cache);
        worker.state = WorkerState::Installed;
        Ok(worker)
    }

    /// 接手先前執行已 install 並 activate 的快取
    pub async fn resume(settings: WorkerSettings, network: Arc<N>, cache: Arc<C>) -> Result<Self> {
        let mut worker = Self::from_installed(settings, network, cache).await?;
        worker.state = WorkerState::Activated;
        Ok(worker)
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    fn expect_state(&self, expected: WorkerState) -> Result<()> {
        if self.state != expected {
            return Err(NightPrayerError::WorkerStateError {
                expected: expected.to_string(),
                actual: self.state.to_string(),
            });
        }
        Ok(())
    }

    /// 抓取清單中所有資源並一次寫入；任何失敗都不寫入快取，worker 變成 redundant
    pub async fn install(&mut self) -> Result<usize> {
        self.expect_state(WorkerState::Parsed)?;
        self.state = WorkerState::Installing;

        tracing::info!(
            "📦 Installing cache {} ({} assets)",
            self.settings.cache_name,
            self.settings.assets.len()
        );

        match self.precache().await {
            Ok(count) => {
                self.state = WorkerState::Installed;
                tracing::info!("✅ Cached {} assets in {}", count, self.settings.cache_name);
                Ok(count)
            }
            Err(e) => {
                self.state = WorkerState::Redundant;
                tracing::warn!("❌ Install of {} aborted: {}", self.settings.cache_name, e);
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize> {
        let network = &self.network;
        let fetches = self.settings.assets.iter().map(|url| async move {
            let response = network
                .fetch(&Request::get(url.clone()))
                .await
                .map_err(|e| NightPrayerError::InstallFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            if !response.is_ok() {
                return Err(NightPrayerError::InstallFailed {
                    url: url.to_string(),
                    reason: format!("HTTP {}", response.status),
                });
            }

            tracing::debug!("Fetched {} ({} bytes)", url, response.body.len());
            Ok::<_, NightPrayerError>((cache_key(url), response))
        });

        let entries = try_join_all(fetches).await?;

        self.cache.open(&self.settings.cache_name).await?;
        self.cache
            .put_all(&self.settings.cache_name, &entries)
            .await?;

        Ok(entries.len())
    }

    /// 刪除目前版本以外的所有快取命名空間
    pub async fn activate(&mut self) -> Result<Vec<String>> {
        self.expect_state(WorkerState::Installed)?;
        self.state = WorkerState::Activating;

        match self.evict_stale_caches().await {
            Ok(deleted) => {
                self.state = WorkerState::Activated;
                tracing::info!(
                    "✅ Activated {} (removed {} stale caches)",
                    self.settings.cache_name,
                    deleted.len()
                );
                Ok(deleted)
            }
            Err(e) => {
                self.state = WorkerState::Installed;
                Err(e)
            }
        }
    }

    async fn evict_stale_caches(&self) -> Result<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.cache.keys().await? {
            if name == self.settings.cache_name {
                continue;
            }
            if self.cache.delete(&name).await? {
                tracing::info!("🗑️ Deleted stale cache {}", name);
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// install 後立即 activate，不等舊的 client
    pub async fn start(&mut self) -> Result<Vec<String>> {
        self.install().await?;
        self.activate().await
    }

    fn intercepts(&self, request: &Request) -> bool {
        self.state == WorkerState::Activated
            && request.is_get()
            && request.url.origin() == self.settings.scope.origin()
    }

    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome> {
        if !self.intercepts(request) {
            tracing::debug!("Passing through {} {}", request.method, request.url);
            return Ok(FetchOutcome::Passthrough);
        }

        let key = cache_key(&request.url);

        if let Some(cached) = self.cache.match_url(&key).await? {
            tracing::debug!("Cache hit: {}", key);
            self.revalidate(request, key).await;
            return Ok(FetchOutcome::Cache(cached));
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    if let Err(e) = self
                        .cache
                        .put(&self.settings.cache_name, &key, &response)
                        .await
                    {
                        tracing::warn!("Could not cache {}: {}", key, e);
                    }
                }
                Ok(FetchOutcome::Network(response))
            }
            Err(e) if request.is_navigation() => {
                let root = cache_key(&self.settings.root());
                match self.cache.match_url(&root).await {
                    Ok(Some(fallback)) => {
                        tracing::info!("📴 Offline, serving {} for {}", root, key);
                        Ok(FetchOutcome::Fallback(fallback))
                    }
                    Ok(None) => Err(e),
                    Err(lookup) => {
                        tracing::warn!("Fallback lookup for {} failed: {}", root, lookup);
                        Err(e)
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn revalidate(&self, request: &Request, key: String) {
        let network = Arc::clone(&self.network);
        let cache = Arc::clone(&self.cache);
        let cache_name = self.settings.cache_name.clone();
        let request = request.clone();

        let mut tasks = self.background.lock().await;
        while tasks.try_join_next().is_some() {}

        // 背景更新失敗一律忽略
        tasks.spawn(async move {
            match network.fetch(&request).await {
                Ok(response) if response.is_ok() => {
                    match cache.put(&cache_name, &key, &response).await {
                        Ok(()) => tracing::debug!("Refreshed {}", key),
                        Err(e) => tracing::debug!("Refresh of {} not stored: {}", key, e),
                    }
                }
                Ok(response) => {
                    tracing::debug!("Refresh of {} returned HTTP {}", key, response.status)
                }
                Err(e) => tracing::debug!("Refresh of {} failed: {}", key, e),
            }
        });
    }

    /// 等待 cache hit 觸發的背景更新完成
    pub async fn wait_until_idle(&self) {
        // 先把任務移出再等待，等待期間 cache hit 仍可取得鎖
        let mut tasks = std::mem::take(&mut *self.background.lock().await);
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::debug!("Background refresh did not finish: {}", e);
            }
        }
    }
}
