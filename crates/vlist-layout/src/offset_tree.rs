//! Indexed offset tree: a Fenwick tree (Binary Indexed Tree) over item size deltas.
//!
//! Maps item index to cumulative offset for virtualized lists whose items share
//! a base size but may individually measure larger or smaller. Only the
//! difference `actual - base_size` is stored per item, so a freshly built tree
//! is all zeros and the base contribution is added arithmetically on query.
//!
//! # Layout
//!
//! Deltas are stored 1-indexed in a contiguous `Vec<f64>` of length `n + 1`
//! (index 0 unused). External indices are 0-based.
//!
//! # Operations
//!
//! | Operation | Time | Allocations |
//! |-----------|------|-------------|
//! | `new(n, base)` | O(n) | 1 Vec |
//! | `from_sizes(sizes, base)` | O(n) | 1 Vec |
//! | `add(i, delta)` | O(log n) | 0 |
//! | `sum(count)` | O(log n) | 0 |
//! | `get(i)` | O(log n) | 0 |
//! | `get_bound(offset)` | O(log² n) | 0 |
//!
//! # Invariants
//!
//! 1. `sum(k) == k * base_size + (sum of deltas of items 0..k)`.
//! 2. `get(i) == sum(i + 1) - sum(i)`.
//! 3. The tree length never changes; a new length means a new tree.
//!
//! # Failure Modes
//!
//! | Mode | Condition | Behavior |
//! |------|-----------|----------|
//! | Count out of range | `sum(count)` with `count > len` | Panics; `try_sum` returns `Err` |
//! | Index out of range | `add`/`get`/`set` with `index >= len` | Panics; `try_*` returns `Err` |
//! | Zero delta | `add(i, 0.0)` | No-op |
//! | Empty tree | `len == 0` | `sum(0)`, `total()`, `get_bound(_)` return 0 |

use std::fmt;

/// Out-of-range access on an [`IndexedOffsetTree`].
///
/// These are caller bookkeeping bugs (the caller's item count disagrees with
/// the tree), so the plain API panics with this error's message rather than
/// clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetTreeError {
    /// `sum(count)` was asked for more items than the tree tracks.
    CountOutOfRange { count: usize, len: usize },
    /// An item index at or past the tracked length.
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for OffsetTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountOutOfRange { count, len } => {
                write!(f, "prefix count {count} out of range (len={len})")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "item index {index} out of range (len={len})")
            }
        }
    }
}

impl std::error::Error for OffsetTreeError {}

/// Fenwick tree of size deltas with a uniform base size.
///
/// Designed for virtualized list layout: `sum(i)` is the start offset of item
/// `i`, and `get_bound(y)` is the item visible at scroll offset `y`.
#[derive(Debug, Clone)]
pub struct IndexedOffsetTree {
    /// 1-indexed partial sums of deltas. `tree[0]` is unused.
    tree: Vec<f64>,
    /// Number of items tracked.
    len: usize,
    /// Size every item has before its delta is applied.
    base_size: f64,
}

impl IndexedOffsetTree {
    /// Create a tree of `len` items, all of size `base_size`.
    #[must_use]
    pub fn new(len: usize, base_size: f64) -> Self {
        Self {
            tree: vec![0.0; len + 1],
            len,
            base_size,
        }
    }

    /// Create a tree from actual item sizes in O(n).
    ///
    /// Equivalent to `new(sizes.len(), base_size)` followed by
    /// `add(i, sizes[i] - base_size)` for every item.
    #[must_use]
    pub fn from_sizes(sizes: &[f64], base_size: f64) -> Self {
        let len = sizes.len();
        let mut tree = vec![0.0; len + 1];

        for (i, &size) in sizes.iter().enumerate() {
            tree[i + 1] = size - base_size;
        }

        for i in 1..=len {
            let parent = i + lowbit(i);
            if parent <= len {
                tree[parent] += tree[i];
            }
        }

        Self {
            tree,
            len,
            base_size,
        }
    }

    /// Number of items tracked.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree tracks no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Uniform size applied to every item.
    #[inline]
    #[must_use]
    pub fn base_size(&self) -> f64 {
        self.base_size
    }

    /// Add `delta` to the size of item `index`. O(log n), zero alloc.
    ///
    /// A zero delta is a no-op.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    pub fn add(&mut self, index: usize, delta: f64) {
        if let Err(err) = self.try_add(index, delta) {
            panic!("{err}");
        }
    }

    /// Fallible [`add`](Self::add).
    pub fn try_add(&mut self, index: usize, delta: f64) -> Result<(), OffsetTreeError> {
        if index >= self.len {
            return Err(OffsetTreeError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        if delta == 0.0 {
            return Ok(());
        }
        let mut idx = index + 1;
        while idx <= self.len {
            self.tree[idx] += delta;
            idx += lowbit(idx);
        }
        Ok(())
    }

    /// Cumulative size of the first `count` items. O(log n), zero alloc.
    ///
    /// `sum(0)` is 0 and `sum(len)` is the total size.
    ///
    /// # Panics
    /// Panics if `count > len`.
    #[must_use]
    pub fn sum(&self, count: usize) -> f64 {
        match self.try_sum(count) {
            Ok(sum) => sum,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible [`sum`](Self::sum).
    pub fn try_sum(&self, count: usize) -> Result<f64, OffsetTreeError> {
        if count > self.len {
            return Err(OffsetTreeError::CountOutOfRange {
                count,
                len: self.len,
            });
        }
        Ok(self.prefix(count))
    }

    /// Total size of all items. Never fails.
    #[inline]
    #[must_use]
    pub fn total(&self) -> f64 {
        self.prefix(self.len)
    }

    /// Actual size of item `index`. O(log n).
    ///
    /// # Panics
    /// Panics if `index >= len`.
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        match self.try_get(index) {
            Ok(size) => size,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible [`get`](Self::get).
    pub fn try_get(&self, index: usize) -> Result<f64, OffsetTreeError> {
        if index >= self.len {
            return Err(OffsetTreeError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        Ok(self.prefix(index + 1) - self.prefix(index))
    }

    /// Overwrite the size of item `index`. O(log n).
    ///
    /// # Panics
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, size: f64) {
        let current = self.get(index);
        self.add(index, size - current);
    }

    /// Combined size of items `start..end`. O(log n).
    ///
    /// # Panics
    /// Panics if `start > end` or `end > len`.
    #[must_use]
    pub fn range(&self, start: usize, end: usize) -> f64 {
        assert!(start <= end, "range start {start} > end {end}");
        self.sum(end) - self.sum(start)
    }

    /// Index of the last item whose start offset is `<= target`.
    ///
    /// Binary search over `sum`: an exact boundary hit returns that index
    /// immediately. Returns 0 for an empty tree or a target before the first
    /// item, and `len - 1` for a target past the end.
    #[must_use]
    pub fn get_bound(&self, target: f64) -> usize {
        let mut low = 0usize;
        let mut high = self.len;

        while low < high {
            let mid = low + (high - low) / 2;
            let offset = self.prefix(mid);
            if offset == target {
                return mid;
            }
            if offset < target {
                low = mid + 1;
            } else {
                high = mid;
            }
        }

        low.saturating_sub(1)
    }

    /// Unchecked prefix sum; `count <= len` is the caller's responsibility.
    fn prefix(&self, count: usize) -> f64 {
        let mut delta = 0.0;
        let mut idx = count;
        while idx > 0 {
            delta += self.tree[idx];
            idx -= lowbit(idx);
        }
        count as f64 * self.base_size + delta
    }
}

/// Lowest set bit of `x`. E.g., `lowbit(6) = 2`, `lowbit(4) = 4`.
#[inline]
fn lowbit(x: usize) -> usize {
    x & x.wrapping_neg()
}
