pub mod redis;
pub mod store;

pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use store::{FileStore, KeyValueStore, MemoryStore, SharedStore, StorageKey};
