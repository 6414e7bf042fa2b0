//! # Config - Sluice engine options
//!
//! Options handed to the wrapped storage engine when a database is opened.
//! Defaults mirror the classic embedded-store pair: create the database if it
//! is missing, and do not fail when it already exists.
//!
//! ## Environment
//!
//! ```text
//! SLUICE_CREATE_IF_MISSING  create the database when absent   (default: "true")
//! SLUICE_ERROR_IF_EXISTS    fail if a database already exists (default: "false")
//! SLUICE_CACHE_MB           engine page cache in MiB          (default: 64)
//! SLUICE_FLUSH_MS           background flush interval in ms   (default: 500, 0 = off)
//! ```

/// Default engine page cache size in MiB.
pub const DEFAULT_CACHE_MB: u64 = 64;

/// Default background flush interval in milliseconds.
pub const DEFAULT_FLUSH_MS: u64 = 500;

/// Options applied when opening a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Create the database if nothing exists at the path.
    pub create_if_missing: bool,
    /// Refuse to open a path that already holds a database.
    pub error_if_exists: bool,
    /// Engine page cache capacity in bytes.
    pub cache_capacity: u64,
    /// Background flush interval. `None` leaves flushing to explicit calls
    /// and to close.
    pub flush_every_ms: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            error_if_exists: false,
            cache_capacity: DEFAULT_CACHE_MB * 1024 * 1024,
            flush_every_ms: Some(DEFAULT_FLUSH_MS),
        }
    }
}

impl Options {
    /// Builds options from `SLUICE_*` environment variables, falling back to
    /// the defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Options::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let create_if_missing = get("SLUICE_CREATE_IF_MISSING", "true")
            .parse()
            .unwrap_or(true);
        let error_if_exists = get("SLUICE_ERROR_IF_EXISTS", "false")
            .parse()
            .unwrap_or(false);
        let cache_mb: u64 = get("SLUICE_CACHE_MB", "64")
            .parse()
            .unwrap_or(DEFAULT_CACHE_MB);
        let flush_ms: u64 = get("SLUICE_FLUSH_MS", "500")
            .parse()
            .unwrap_or(DEFAULT_FLUSH_MS);

        Self {
            create_if_missing,
            error_if_exists,
            cache_capacity: cache_mb
                .checked_mul(1024 * 1024)
                .unwrap_or(DEFAULT_CACHE_MB * 1024 * 1024),
            flush_every_ms: (flush_ms > 0).then_some(flush_ms),
        }
    }

    pub fn create_if_missing(mut self, yes: bool) -> Self {
        self.create_if_missing = yes;
        self
    }

    pub fn error_if_exists(mut self, yes: bool) -> Self {
        self.error_if_exists = yes;
        self
    }

    pub fn flush_every_ms(mut self, every: Option<u64>) -> Self {
        self.flush_every_ms = every;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_create_but_do_not_fail_on_existing() {
        let opts = Options::default();
        assert!(opts.create_if_missing);
        assert!(!opts.error_if_exists);
        assert_eq!(opts.cache_capacity, 64 * 1024 * 1024);
        assert_eq!(opts.flush_every_ms, Some(500));
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(Options::from_lookup(lookup(&[])), Options::default());
    }

    #[test]
    fn environment_overrides() {
        let opts = Options::from_lookup(lookup(&[
            ("SLUICE_CREATE_IF_MISSING", "false"),
            ("SLUICE_ERROR_IF_EXISTS", "true"),
            ("SLUICE_CACHE_MB", "8"),
            ("SLUICE_FLUSH_MS", "0"),
        ]));
        assert!(!opts.create_if_missing);
        assert!(opts.error_if_exists);
        assert_eq!(opts.cache_capacity, 8 * 1024 * 1024);
        assert_eq!(opts.flush_every_ms, None);
    }

    #[test]
    fn garbage_values_fall_back() {
        let opts = Options::from_lookup(lookup(&[
            ("SLUICE_CREATE_IF_MISSING", "sure"),
            ("SLUICE_CACHE_MB", "lots"),
        ]));
        assert!(opts.create_if_missing);
        assert_eq!(opts.cache_capacity, DEFAULT_CACHE_MB * 1024 * 1024);
    }

    #[test]
    fn oversized_cache_falls_back() {
        let opts = Options::from_lookup(lookup(&[("SLUICE_CACHE_MB", "18446744073709551615")]));
        assert_eq!(opts.cache_capacity, DEFAULT_CACHE_MB * 1024 * 1024);

        // the largest value that still fits in bytes is kept as is
        let max_mb = u64::MAX / (1024 * 1024);
        let opts = Options::from_lookup(lookup(&[("SLUICE_CACHE_MB", &max_mb.to_string())]));
        assert_eq!(opts.cache_capacity, max_mb * 1024 * 1024);
    }
}
