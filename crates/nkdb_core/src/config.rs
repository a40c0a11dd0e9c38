//! Database configuration.

use std::time::Duration;

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Index of the field that holds each record's key.
    pub key_field: usize,

    /// How long a loaded dataset may be served from memory (`None` = no cache).
    pub cache_ttl: Option<Duration>,

    /// Upper bound on lock waits (`None` = block indefinitely).
    pub lock_timeout: Option<Duration>,

    /// Whether to create missing parent directories of the data file.
    pub create_dirs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_field: 0,
            cache_ttl: None,
            lock_timeout: None,
            create_dirs: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key field index.
    #[must_use]
    pub const fn key_field(mut self, index: usize) -> Self {
        self.key_field = index;
        self
    }

    /// Enables the load cache with the given time-to-live.
    #[must_use]
    pub const fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Bounds every lock wait by `timeout`.
    #[must_use]
    pub const fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Sets whether to create missing parent directories.
    #[must_use]
    pub const fn create_dirs(mut self, value: bool) -> Self {
        self.create_dirs = value;
        self
    }
}
