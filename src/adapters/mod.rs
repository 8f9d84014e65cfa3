// Adapters 層：domain ports 的具體實作（快取儲存、HTTP）

pub mod disk;
pub mod http;
pub mod memory;

pub use disk::DiskCacheStorage;
pub use http::HttpNetwork;
pub use memory::MemoryCacheStorage;
