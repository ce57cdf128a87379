use std::sync::atomic::{AtomicU64, Ordering};

/// Per-factory counters for the targets a factory has produced.
///
/// - `cached`: results written to a named slot
/// - `hits`: calls answered from a named slot without invoking the target
/// - `non_referenced`: uncached results recorded under a synthetic name, only
///   tracked in debug mode (`None` otherwise)
///
/// All counters use atomic operations with `Relaxed` ordering.
///
/// # Examples
///
/// ```
/// use module_context_core::TargetCounter;
///
/// let counter = TargetCounter::new(false);
/// counter.record_cached();
/// counter.record_hit();
/// counter.record_hit();
///
/// assert_eq!(counter.cached(), 1);
/// assert_eq!(counter.hits(), 2);
/// assert_eq!(counter.non_referenced(), None);
/// assert_eq!(counter.record_non_referenced(), None);
/// ```
#[derive(Debug)]
pub struct TargetCounter {
    cached: AtomicU64,
    hits: AtomicU64,
    non_referenced: Option<AtomicU64>,
}

/// Point-in-time copy of a [`TargetCounter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub cached: u64,
    pub hits: u64,
    pub non_referenced: Option<u64>,
}

impl TargetCounter {
    /// Creates zeroed counters. The non-referenced counter only exists when
    /// `debug` is set.
    pub fn new(debug: bool) -> Self {
        Self {
            cached: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            non_referenced: debug.then(|| AtomicU64::new(0)),
        }
    }

    #[inline]
    pub fn record_cached(&self) {
        self.cached.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the non-referenced counter and returns its new value.
    ///
    /// Returns `None` without counting anything when debug mode is off.
    #[inline]
    pub fn record_non_referenced(&self) -> Option<u64> {
        self.non_referenced
            .as_ref()
            .map(|counter| counter.fetch_add(1, Ordering::Relaxed) + 1)
    }

    #[inline]
    pub fn cached(&self) -> u64 {
        self.cached.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn non_referenced(&self) -> Option<u64> {
        self.non_referenced
            .as_ref()
            .map(|counter| counter.load(Ordering::Relaxed))
    }

    pub fn is_debug(&self) -> bool {
        self.non_referenced.is_some()
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            cached: self.cached(),
            hits: self.hits(),
            non_referenced: self.non_referenced(),
        }
    }
}

impl Default for TargetCounter {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_counter() {
        let counter = TargetCounter::new(false);
        assert_eq!(counter.snapshot(), CounterSnapshot::default());
        assert!(!counter.is_debug());
    }

    #[test]
    fn test_debug_counter_starts_at_zero() {
        let counter = TargetCounter::new(true);
        assert!(counter.is_debug());
        assert_eq!(counter.non_referenced(), Some(0));
        assert_eq!(counter.record_non_referenced(), Some(1));
        assert_eq!(counter.record_non_referenced(), Some(2));
        assert_eq!(counter.non_referenced(), Some(2));
    }

    #[test]
    fn test_snapshot() {
        let counter = TargetCounter::new(true);
        counter.record_cached();
        counter.record_cached();
        counter.record_hit();
        counter.record_non_referenced();

        assert_eq!(
            counter.snapshot(),
            CounterSnapshot {
                cached: 2,
                hits: 1,
                non_referenced: Some(1),
            }
        );
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let counter = Arc::new(TargetCounter::new(true));
        let mut handles = vec![];

        // 8 threads, each records 100 cache writes and 25 non-referenced results
        for _ in 0..8 {
            let counter_clone = Arc::clone(&counter);
            let handle = thread::spawn(move || {
                for _ in 0..100 {
                    counter_clone.record_cached();
                }
                for _ in 0..25 {
                    counter_clone.record_non_referenced();
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.cached(), 800);
        assert_eq!(counter.non_referenced(), Some(200));
    }
}
