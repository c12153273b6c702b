pub mod memory;
pub mod postgres;
pub mod redis;

pub use self::postgres::{create_pool, run_migrations, PgCatalogStore};
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use self::redis::CacheWriterHandle;
pub use memory::InMemoryCatalogStore;
