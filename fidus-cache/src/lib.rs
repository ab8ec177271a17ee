//! FIDUS query/mutation cache.
//!
//! A process-wide, keyed store of completed and in-flight read results.
//! Reads addressed by equal keys share one in-flight request and one cached
//! result; mutations invalidate the keys their writes could have changed
//! through the explicit [`QueryCache::invalidate`] / [`QueryCache::put`]
//! primitives. The cache is owned by whoever constructs it and passed by
//! `Arc`, never a global, so tests can run against their own instance.

mod config;
mod error;
mod store;

pub use config::CacheConfig;
pub use error::QueryError;
pub use store::{CacheKey, CacheStats, QueryCache};
