//! Local JSON cache of fetched data.
//!
//! Cached lists let the app paint immediately on restart while a
//! background refresh runs. Entries are timestamped and considered
//! stale after an hour.

pub mod manager;

pub use manager::CacheManager;
