use crate::domain::model::Response;
use crate::domain::ports::CacheStorage;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

type Namespace = (String, BTreeMap<String, Response>);

/// 記憶體內的快取儲存，clone 之間共用同一組命名空間
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStorage {
    caches: Arc<Mutex<Vec<Namespace>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn namespace_mut<'a>(
    caches: &'a mut Vec<Namespace>,
    name: &str,
) -> &'a mut BTreeMap<String, Response> {
    let index = match caches.iter().position(|(n, _)| n == name) {
        Some(index) => index,
        None => {
            caches.push((name.to_string(), BTreeMap::new()));
            caches.len() - 1
        }
    };
    &mut caches[index].1
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<()> {
        let mut caches = self.caches.lock().await;
        namespace_mut(&mut caches, name);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let caches = self.caches.lock().await;
        Ok(caches.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let mut caches = self.caches.lock().await;
        let before = caches.len();
        caches.retain(|(n, _)| n != name);
        Ok(caches.len() != before)
    }

    async fn get(&self, name: &str, url: &str) -> Result<Option<Response>> {
        let caches = self.caches.lock().await;
        Ok(caches
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, entries)| entries.get(url).cloned()))
    }

    async fn put(&self, name: &str, url: &str, response: &Response) -> Result<()> {
        let mut caches = self.caches.lock().await;
        namespace_mut(&mut caches, name).insert(url.to_string(), response.clone());
        Ok(())
    }

    async fn urls(&self, name: &str) -> Result<Vec<String>> {
        let caches = self.caches.lock().await;
        Ok(caches
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entries)| entries.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn put_all(&self, name: &str, entries: &[(String, Response)]) -> Result<()> {
        let mut caches = self.caches.lock().await;
        let namespace = namespace_mut(&mut caches, name);
        for (url, response) in entries {
            namespace.insert(url.clone(), response.clone());
        }
        Ok(())
    }
}
