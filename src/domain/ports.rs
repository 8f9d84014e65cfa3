use crate::domain::model::{Request, Response};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 將 [`Request`] 轉成 [`Response`] 的網路介面
///
/// 傳輸失敗（DNS、連線被拒、逾時）回傳 `Err`；非 2xx 狀態仍是 `Ok`
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// 具名的快取命名空間，每個將請求 URL 對應到儲存的回應
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// 開啟命名空間，不存在時建立
    async fn open(&self, name: &str) -> Result<()>;

    /// 依建立順序列出命名空間
    async fn keys(&self) -> Result<Vec<String>>;

    /// 回傳是否真的刪除了命名空間
    async fn delete(&self, name: &str) -> Result<bool>;

    async fn get(&self, name: &str, url: &str) -> Result<Option<Response>>;

    /// 寫入或覆蓋一筆資料，命名空間視需要建立
    async fn put(&self, name: &str, url: &str, response: &Response) -> Result<()>;

    /// 命名空間內已排序的 URL
    async fn urls(&self, name: &str) -> Result<Vec<String>>;

    /// 將多筆資料視為一個單位寫入，可整批處理的實作應覆寫
    async fn put_all(&self, name: &str, entries: &[(String, Response)]) -> Result<()> {
        for (url, response) in entries {
            self.put(name, url, response).await?;
        }
        Ok(())
    }

    /// 依序在每個命名空間查找 URL，最舊的優先
    async fn match_url(&self, url: &str) -> Result<Option<Response>> {
        for name in self.keys().await? {
            if let Some(response) = self.get(&name, url).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}
