//! Formatter caching.
//!
//! The cache maps each pattern string to a [`FormatterFactory`] (the parsed
//! pattern). Formatter instances are never shared between threads: every
//! thread builds its own from the factory on first use and keeps it in a
//! small thread-local LRU keyed by factory id.
//!
//! Both levels are size-bounded. An evicted pattern is parsed again on its
//! next use and renders exactly as before.

use crate::formatter::DecimalFormatter;
use crate::pattern::{DecimalPattern, FormatError};
use lru::LruCache;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

/// Default number of patterns kept by a [`FormatterCache`].
pub const DEFAULT_CAPACITY: usize = 256;

/// Formatter instances kept per thread.
const WORKER_SLOTS: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(n) => n,
    None => panic!("worker slot count must be non-zero"),
};

static NEXT_FACTORY: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static WORKER_FORMATTERS: RefCell<LruCache<u64, DecimalFormatter>> =
        RefCell::new(LruCache::new(WORKER_SLOTS));
}

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of distinct patterns held at once.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Builds identically configured formatters for one pattern.
#[derive(Debug)]
pub struct FormatterFactory {
    id: u64,
    pattern: Arc<DecimalPattern>,
}

impl FormatterFactory {
    fn new(pattern: DecimalPattern) -> Self {
        Self {
            id: NEXT_FACTORY.fetch_add(1, Ordering::Relaxed),
            pattern: Arc::new(pattern),
        }
    }

    /// Process-unique id; a re-created factory gets a new one.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The parsed pattern shared by every formatter this factory builds.
    pub fn pattern(&self) -> &DecimalPattern {
        &self.pattern
    }

    /// Build a fresh formatter.
    pub fn build(&self) -> DecimalFormatter {
        DecimalFormatter::new(Arc::clone(&self.pattern))
    }
}

/// Access to the calling thread's formatter for one pattern.
///
/// Handles are not `Send`: the formatter they reach is the one belonging to
/// the thread that resolved them.
#[derive(Debug, Clone)]
pub struct FormatterHandle {
    factory: Arc<FormatterFactory>,
    _thread_bound: PhantomData<*const ()>,
}

impl FormatterHandle {
    fn new(factory: Arc<FormatterFactory>) -> Self {
        Self {
            factory,
            _thread_bound: PhantomData,
        }
    }

    /// Id of the factory this handle was resolved to.
    pub fn factory_id(&self) -> u64 {
        self.factory.id
    }

    /// The parsed pattern behind this handle.
    pub fn pattern(&self) -> &DecimalPattern {
        self.factory.pattern()
    }

    /// Format `value` with this thread's formatter.
    pub fn format(&self, value: &Decimal) -> Result<String, FormatError> {
        self.with_formatter(|formatter| formatter.format(value))
    }

    /// Instance id of this thread's formatter, building it if needed.
    pub fn instance_id(&self) -> u64 {
        self.with_formatter(|formatter| formatter.instance_id())
    }

    fn with_formatter<R>(&self, f: impl FnOnce(&mut DecimalFormatter) -> R) -> R {
        WORKER_FORMATTERS.with(|slots| {
            let mut slots = slots.borrow_mut();
            let formatter = slots.get_or_insert_mut(self.factory.id, || {
                trace!(factory_id = self.factory.id, "building thread-local formatter");
                self.factory.build()
            });
            f(formatter)
        })
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Shared pattern → factory cache with LRU eviction.
#[derive(Debug)]
pub struct FormatterCache {
    factories: Mutex<LruCache<String, Arc<FormatterFactory>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Default for FormatterCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatterCache {
    /// Create a cache holding up to [`DEFAULT_CAPACITY`] patterns.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache holding up to `capacity` patterns (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            factories: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Create a cache sized by `config`.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_capacity(config.capacity)
    }

    /// The process-wide cache.
    pub fn global() -> Arc<FormatterCache> {
        static GLOBAL: OnceLock<Arc<FormatterCache>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(FormatterCache::new())))
    }

    /// Get the calling thread's formatter handle for `pattern`.
    pub fn resolve(&self, pattern: &str) -> Result<FormatterHandle, FormatError> {
        self.factory(pattern).map(FormatterHandle::new)
    }

    /// Get or create the factory for `pattern`.
    ///
    /// The pattern is parsed outside the lock. When two threads race on the
    /// same new pattern, the first to publish wins and both return its factory.
    pub fn factory(&self, pattern: &str) -> Result<Arc<FormatterFactory>, FormatError> {
        let cached = self.factories.lock().get(pattern).cloned();
        if let Some(factory) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(pattern, factory_id = factory.id, "formatter cache hit");
            return Ok(factory);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let candidate = Arc::new(FormatterFactory::new(DecimalPattern::parse(pattern)?));

        let mut factories = self.factories.lock();
        if let Some(existing) = factories.get(pattern) {
            return Ok(Arc::clone(existing));
        }
        if let Some((evicted, _)) = factories.push(pattern.to_string(), Arc::clone(&candidate)) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(pattern = %evicted, "evicted formatter factory");
        }
        drop(factories);

        debug!(pattern, factory_id = candidate.id, "created formatter factory");
        Ok(candidate)
    }

    /// True if `pattern` currently has a live entry. Does not touch LRU order.
    pub fn contains(&self, pattern: &str) -> bool {
        self.factories.lock().contains(pattern)
    }

    /// Number of patterns currently cached.
    pub fn len(&self) -> usize {
        self.factories.lock().len()
    }

    /// True when no pattern is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of patterns held at once.
    pub fn capacity(&self) -> usize {
        self.factories.lock().cap().get()
    }

    /// Snapshot of the hit, miss and eviction counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_resolve_reuses_factory_and_instance() {
        let cache = FormatterCache::new();

        let first = cache.resolve("#,##0.00").unwrap();
        let second = cache.resolve("#,##0.00").unwrap();

        assert_eq!(first.factory_id(), second.factory_id());
        assert_eq!(first.instance_id(), second.instance_id());
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                evictions: 0
            }
        );
    }

    #[test]
    fn test_distinct_patterns_get_distinct_factories() {
        let cache = FormatterCache::new();

        let a = cache.resolve("0.00").unwrap();
        let b = cache.resolve("0.000").unwrap();

        assert_ne!(a.factory_id(), b.factory_id());
        assert_eq!(a.format(&dec("1.5")).unwrap(), "1.50");
        assert_eq!(b.format(&dec("1.5")).unwrap(), "1.500");
    }

    #[test]
    fn test_malformed_pattern_is_not_cached() {
        let cache = FormatterCache::new();

        let err = cache.resolve("###.##.##").unwrap_err();

        assert!(matches!(err, FormatError::MultipleDecimalSeparators { .. }));
        assert!(!cache.contains("###.##.##"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_eviction_is_transparent() {
        let cache = FormatterCache::with_capacity(1);
        let value = dec("9876.5");

        let before = cache.resolve("#,##0.00").unwrap();
        let rendered_before = before.format(&value).unwrap();

        cache.resolve("0").unwrap();
        assert!(!cache.contains("#,##0.00"));

        let after = cache.resolve("#,##0.00").unwrap();
        assert_ne!(before.factory_id(), after.factory_id());
        assert_eq!(after.format(&value).unwrap(), rendered_before);
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = FormatterCache::from_config(&CacheConfig { capacity: 0 });
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_global_is_shared() {
        let a = FormatterCache::global();
        let b = FormatterCache::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
