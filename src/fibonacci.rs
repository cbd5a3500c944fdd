// Fibonacci lookup over the canonical table, extended lazily past its end.
// The cache is append-only: once an index is written its value never changes.

use std::sync::{OnceLock, PoisonError, RwLock};

use crate::constants::FIBONACCI;

/// Last index whose value fits in a `u64`. Later indices saturate at `u64::MAX`.
pub const MAX_EXACT_INDEX: usize = 92;

/// Longest slice `range_slice` returns. Longer ranges are truncated.
pub const MAX_SLICE_LEN: usize = 4096;

/// Indexed and ranged access to the Fibonacci sequence.
///
/// Values inside the canonical table come straight from it. Anything past the
/// table is computed by iterative summation from the last two known values and
/// cached, so repeated queries are O(1) amortized. Every call is total: there
/// is no input that errors or panics.
#[derive(Debug)]
pub struct FibonacciProvider {
    cache: RwLock<Vec<u64>>,
}

impl FibonacciProvider {
    pub fn new() -> Self {
        FibonacciProvider {
            cache: RwLock::new(FIBONACCI.to_vec()),
        }
    }

    /// Value at `index`.
    pub fn value_at(&self, index: usize) -> u64 {
        if index > MAX_EXACT_INDEX {
            return u64::MAX;
        }

        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(value) = cache.get(index) {
                return *value;
            }
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have extended the cache between the two locks.
        while cache.len() <= index {
            let n = cache.len();
            let next = cache[n - 1].saturating_add(cache[n - 2]);
            cache.push(next);
        }
        cache[index]
    }

    /// Values for every index in `[start, end_exclusive)`, at most `MAX_SLICE_LEN` of them.
    /// Empty when the range is empty.
    pub fn range_slice(&self, start: usize, end_exclusive: usize) -> Vec<u64> {
        let end = end_exclusive.min(start.saturating_add(MAX_SLICE_LEN));
        (start..end).map(|i| self.value_at(i)).collect()
    }

    /// Number of indices currently held in the cache.
    pub fn cached_len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for FibonacciProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide provider shared by every distributor.
pub fn shared() -> &'static FibonacciProvider {
    static SHARED: OnceLock<FibonacciProvider> = OnceLock::new();
    SHARED.get_or_init(FibonacciProvider::new)
}

/// Clamp an index arriving as a JS number. Negative and NaN resolve to 0.
pub fn index_from_f64(index: f64) -> usize {
    if index.is_nan() || index <= 0.0 {
        return 0;
    }
    if index >= usize::MAX as f64 {
        return usize::MAX;
    }
    index.floor() as usize
}
