//! Cache module for Redis-backed stores
//!
//! This module provides the Redis client (retry logic, key namespacing) and
//! the revocation and session store implementations built on it.

pub mod redis_client;
pub mod revocation_store;
pub mod session_store;


pub use redis_client::RedisClient;
pub use revocation_store::RedisRevocationStore;
pub use session_store::RedisSessionStore;

// Re-export commonly used types
pub use jwt_shared::config::CacheConfig;
