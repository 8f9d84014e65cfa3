use crate::domain::model::Response;
use crate::domain::ports::CacheStorage;
use crate::utils::error::{NightPrayerError, Result};
use crate::utils::validation::validate_cache_name;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const NAMESPACES_FILE: &str = "caches.json";
const INDEX_FILE: &str = "index.json";

/// 磁碟上的一筆快取回應，body 另存一個檔案
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    status: u16,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    body: String,
}

/// 檔案系統快取儲存
///
/// ```text
/// <base>/caches.json          命名空間名稱（依建立順序）
/// <base>/<name>/index.json    url -> status, headers, body 檔名
/// <base>/<name>/<n>.bin       回應 body
/// ```
#[derive(Debug)]
pub struct DiskCacheStorage {
    base_path: PathBuf,
    lock: Mutex<()>,
}

impl DiskCacheStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn namespace_dir(&self, name: &str) -> Result<PathBuf> {
        validate_cache_name("cache name", name).map_err(|e| NightPrayerError::CacheError {
            message: e.to_string(),
        })?;
        Ok(self.base_path.join(name))
    }

    async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// 先寫暫存檔再 rename，避免留下寫一半的索引
    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, serde_json::to_vec_pretty(value)?).await?;
        tokio::fs::rename(&tmp_path, path).await?;
        Ok(())
    }

    async fn load_names(&self) -> Result<Vec<String>> {
        Self::read_json(&self.base_path.join(NAMESPACES_FILE)).await
    }

    async fn load_index(dir: &Path) -> Result<BTreeMap<String, StoredEntry>> {
        Self::read_json(&dir.join(INDEX_FILE)).await
    }

    /// 呼叫端須持有 `lock`
    async fn ensure_namespace(&self, name: &str) -> Result<PathBuf> {
        let dir = self.namespace_dir(name)?;
        let mut names = self.load_names().await?;
        if !names.iter().any(|n| n == name) {
            tracing::debug!("Creating cache namespace {} at {}", name, dir.display());
            // 清掉上次刪除失敗留下的舊目錄，新命名空間必須是空的
            Self::remove_dir(&dir).await?;
            names.push(name.to_string());
            Self::write_json(&self.base_path.join(NAMESPACES_FILE), &names).await?;
        }
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    async fn remove_dir(dir: &Path) -> Result<()> {
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_bodies(dir: &Path, files: &[String]) {
        for file in files {
            if let Err(e) = tokio::fs::remove_file(dir.join(file)).await {
                tracing::debug!("Could not remove body file {}: {}", file, e);
            }
        }
    }

    fn next_body_number(index: &BTreeMap<String, StoredEntry>) -> u64 {
        index
            .values()
            .filter_map(|entry| entry.body.strip_suffix(".bin")?.parse::<u64>().ok())
            .max()
            .map_or(0, |n| n + 1)
    }

    /// 呼叫端須持有 `lock`。
    ///
    /// 每個 body 都寫到新檔名，索引 rename 成功後才刪除被取代的舊檔；
    /// 任何一步失敗時，索引與既有 body 維持原狀。
    async fn store(&self, name: &str, entries: &[(String, Response)]) -> Result<()> {
        let dir = self.ensure_namespace(name).await?;
        let mut index = Self::load_index(&dir).await?;
        let mut next = Self::next_body_number(&index);
        let mut written = Vec::new();
        let mut replaced = Vec::new();

        for (url, response) in entries {
            let body_file = format!("{}.bin", next);
            next += 1;

            if let Err(e) = tokio::fs::write(dir.join(&body_file), &response.body).await {
                Self::remove_bodies(&dir, &written).await;
                return Err(e.into());
            }
            written.push(body_file.clone());

            let previous = index.insert(
                url.clone(),
                StoredEntry {
                    status: response.status,
                    headers: response.headers.clone(),
                    body: body_file,
                },
            );
            if let Some(previous) = previous {
                replaced.push(previous.body);
            }
        }

        if let Err(e) = Self::write_json(&dir.join(INDEX_FILE), &index).await {
            Self::remove_bodies(&dir, &written).await;
            return Err(e);
        }

        Self::remove_bodies(&dir, &replaced).await;
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn open(&self, name: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.ensure_namespace(name).await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        self.load_names().await
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let dir = self.namespace_dir(name)?;
        let mut names = self.load_names().await?;
        let before = names.len();
        names.retain(|n| n != name);
        if names.len() == before {
            return Ok(false);
        }

        // 目錄刪除失敗時名稱仍留在清單中
        Self::remove_dir(&dir).await?;
        Self::write_json(&self.base_path.join(NAMESPACES_FILE), &names).await?;
        Ok(true)
    }

    async fn get(&self, name: &str, url: &str) -> Result<Option<Response>> {
        let _guard = self.lock.lock().await;
        let dir = self.namespace_dir(name)?;
        let index = Self::load_index(&dir).await?;

        let Some(entry) = index.get(url) else {
            return Ok(None);
        };

        let body = tokio::fs::read(dir.join(&entry.body)).await?;
        Ok(Some(Response {
            status: entry.status,
            headers: entry.headers.clone(),
            body,
        }))
    }

    async fn put(&self, name: &str, url: &str, response: &Response) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.store(name, &[(url.to_string(), response.clone())])
            .await
    }

    async fn urls(&self, name: &str) -> Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        let dir = self.namespace_dir(name)?;
        Ok(Self::load_index(&dir).await?.into_keys().collect())
    }

    async fn put_all(&self, name: &str, entries: &[(String, Response)]) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.store(name, entries).await
    }
}
