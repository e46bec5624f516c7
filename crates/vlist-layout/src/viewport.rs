#![forbid(unsafe_code)]

//! Viewport layout for virtualized lists with variable item sizes.
//!
//! [`VirtualViewport`] owns an [`IndexedOffsetTree`] together with the
//! bookkeeping the tree deliberately leaves out: which items have been
//! measured, the current scroll position, and the visible extent. It turns
//! resize-observer reports into tree deltas and answers the per-frame
//! question "which items do I render, and where does the batch start?".
//!
//! # Example
//!
//! ```
//! use vlist_layout::viewport::{ScrollAlign, VirtualViewport};
//!
//! let mut viewport = VirtualViewport::new(1_000, 20.0)
//!     .with_overscan(0)
//!     .with_viewport_size(100.0);
//!
//! // Item 3 rendered taller than assumed.
//! viewport.measure(3, 45.0);
//! assert_eq!(viewport.offset_of(4), 105.0);
//!
//! viewport.scroll_to(110.0);
//! let range = viewport.visible_range();
//! assert_eq!(range.indices(), 4..10);
//! assert_eq!(range.offset, 105.0);
//!
//! viewport.scroll_to_index(0, ScrollAlign::Start);
//! assert_eq!(viewport.scroll_offset(), 0.0);
//! ```
//!
//! # Invariants
//!
//! 1. `scroll_offset` stays within `[0, max(total_size - viewport_size, 0)]`.
//! 2. The tree length always equals the item count; a count or base-size
//!    change rebuilds it from the recorded measurements.
//! 3. `visible_range()` covers every item intersecting
//!    `[scroll_offset, scroll_offset + viewport_size)`, widened by `overscan`
//!    items on each side.

use std::ops::Range;

use vlist_core::display_env::{DisplayEnvironment, FINE_POINTER_OVERSCAN};

use crate::offset_tree::IndexedOffsetTree;

/// Tunables for a [`VirtualViewport`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    /// Extra items laid out beyond each edge of the viewport.
    pub overscan: usize,
    /// Device pixel ratio used to snap [`VisibleRange::offset`]; `None` keeps
    /// the exact logical offset.
    pub pixel_ratio: Option<f64>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            overscan: FINE_POINTER_OVERSCAN,
            pixel_ratio: None,
        }
    }
}

impl ViewportConfig {
    /// Configuration suited to the given display: overscan by pointer kind and
    /// device-pixel snapping.
    #[must_use]
    pub fn from_environment(env: &DisplayEnvironment) -> Self {
        Self {
            overscan: env.recommended_overscan(),
            pixel_ratio: Some(env.pixel_ratio),
        }
    }

    /// [`from_environment`](Self::from_environment) with the cached process
    /// environment.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_environment(DisplayEnvironment::global())
    }
}

/// Where [`VirtualViewport::scroll_to_index`] places the target item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlign {
    /// Item start at the viewport top.
    Start,
    /// Item centered in the viewport.
    Center,
    /// Item end at the viewport bottom.
    End,
    /// Smallest scroll that brings the item into view; no-op if it already is.
    #[default]
    Auto,
}

/// Items to render for the current scroll position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRange {
    /// First item to render.
    pub start: usize,
    /// One past the last item to render.
    pub end: usize,
    /// Position of item `start` along the scroll axis.
    pub offset: f64,
}

impl VisibleRange {
    const EMPTY: Self = Self {
        start: 0,
        end: 0,
        offset: 0.0,
    };

    /// Item indices as a range.
    #[inline]
    #[must_use]
    pub fn indices(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of items in the range.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether nothing needs rendering.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `index` is rendered.
    #[inline]
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.indices().contains(&index)
    }
}

/// Scroll state and measured layout for one virtualized list.
#[derive(Debug, Clone)]
pub struct VirtualViewport {
    tree: IndexedOffsetTree,
    /// Last recorded size per item; `None` means still at the base size.
    measured: Vec<Option<f64>>,
    scroll_offset: f64,
    viewport_size: f64,
    config: ViewportConfig,
}

impl VirtualViewport {
    /// Create a viewport over `item_count` items of assumed size `base_size`.
    ///
    /// A non-finite or negative base size is treated as 0.
    #[must_use]
    pub fn new(item_count: usize, base_size: f64) -> Self {
        let base_size = sanitize_size(base_size);
        Self {
            tree: IndexedOffsetTree::new(item_count, base_size),
            measured: vec![None; item_count],
            scroll_offset: 0.0,
            viewport_size: 0.0,
            config: ViewportConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ViewportConfig) -> Self {
        self.config = config;
        self
    }

    /// Set overscan amount.
    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.config.overscan = overscan;
        self
    }

    /// Set the visible extent.
    #[must_use]
    pub fn with_viewport_size(mut self, size: f64) -> Self {
        self.set_viewport_size(size);
        self
    }

    /// Number of items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the list is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Assumed size of unmeasured items.
    #[inline]
    #[must_use]
    pub fn base_size(&self) -> f64 {
        self.tree.base_size()
    }

    /// Current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Current scroll position.
    #[inline]
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Current visible extent.
    #[inline]
    #[must_use]
    pub fn viewport_size(&self) -> f64 {
        self.viewport_size
    }

    /// The underlying offset tree.
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &IndexedOffsetTree {
        &self.tree
    }

    // ─── Item set changes ─────────────────────────────────────────

    /// Change the number of items. O(n).
    ///
    /// Measurements of surviving items are kept; new items start at the base
    /// size. The scroll offset is re-clamped.
    pub fn set_item_count(&mut self, item_count: usize) {
        if item_count == self.len() {
            return;
        }
        self.measured.resize(item_count, None);
        self.rebuild(self.base_size());
    }

    /// Change the assumed size of unmeasured items. O(n).
    pub fn set_base_size(&mut self, base_size: f64) {
        let base_size = sanitize_size(base_size);
        if base_size == self.base_size() {
            return;
        }
        self.rebuild(base_size);
    }

    /// Forget every measurement; all items return to the base size.
    pub fn reset_measurements(&mut self) {
        self.measured.fill(None);
        self.tree = IndexedOffsetTree::new(self.len(), self.base_size());
        self.clamp_scroll();
        vlist_core::trace!(items = self.len(), "measurements reset");
    }

    fn rebuild(&mut self, base_size: f64) {
        let sizes: Vec<f64> = self
            .measured
            .iter()
            .map(|m| m.unwrap_or(base_size))
            .collect();
        self.tree = IndexedOffsetTree::from_sizes(&sizes, base_size);
        self.clamp_scroll();
        vlist_core::trace!(items = self.len(), base_size, "offset tree rebuilt");
    }

    // ─── Measurement ──────────────────────────────────────────────

    /// Record the real size of item `index`. O(log n).
    ///
    /// Returns `true` when the layout changed. Reports for items past the
    /// end (removed since the measurement was scheduled) and non-finite or
    /// negative sizes are ignored.
    pub fn measure(&mut self, index: usize, size: f64) -> bool {
        if index >= self.len() || !size.is_finite() || size < 0.0 {
            vlist_core::debug!(index, size, items = self.len(), "measurement ignored");
            return false;
        }
        let previous = self.measured[index].unwrap_or(self.base_size());
        self.measured[index] = Some(size);
        if size == previous {
            return false;
        }
        self.tree.add(index, size - previous);
        self.clamp_scroll();
        vlist_core::trace!(index, size, previous, "item measured");
        true
    }

    /// Whether item `index` has a recorded measurement.
    #[must_use]
    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).is_some_and(Option::is_some)
    }

    /// Current size of item `index`, or `None` past the end.
    #[must_use]
    pub fn size_of(&self, index: usize) -> Option<f64> {
        self.tree.try_get(index).ok()
    }

    // ─── Offset queries ───────────────────────────────────────────

    /// Start offset of item `index`. Indices past the end give the total size.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> f64 {
        self.tree.sum(index.min(self.len()))
    }

    /// Item covering `offset`.
    #[must_use]
    pub fn item_at(&self, offset: f64) -> usize {
        self.tree.get_bound(offset)
    }

    /// Size of all items together.
    #[must_use]
    pub fn total_size(&self) -> f64 {
        self.tree.total()
    }

    /// Largest reachable scroll offset.
    #[must_use]
    pub fn max_scroll_offset(&self) -> f64 {
        (self.total_size() - self.viewport_size).max(0.0)
    }

    // ─── Scrolling ────────────────────────────────────────────────

    /// Change the visible extent. Non-finite or negative sizes become 0.
    pub fn set_viewport_size(&mut self, size: f64) {
        self.viewport_size = sanitize_size(size);
        self.clamp_scroll();
    }

    /// Scroll to `offset`, clamped to the reachable range. Returns the applied
    /// offset. NaN leaves the position unchanged.
    pub fn scroll_to(&mut self, offset: f64) -> f64 {
        if !offset.is_nan() {
            self.scroll_offset = offset;
            self.clamp_scroll();
        }
        self.scroll_offset
    }

    /// Scroll by `delta`. Returns the applied offset.
    pub fn scroll_by(&mut self, delta: f64) -> f64 {
        self.scroll_to(self.scroll_offset + delta)
    }

    /// Scroll so that item `index` is placed according to `align`.
    ///
    /// Indices past the end target the last item. Returns the applied offset.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) -> f64 {
        if self.is_empty() {
            return self.scroll_to(0.0);
        }
        let index = index.min(self.len() - 1);
        let start = self.tree.sum(index);
        let size = self.tree.get(index);
        let end = start + size;
        let top = self.scroll_offset;
        let bottom = top + self.viewport_size;

        let target = match align {
            ScrollAlign::Start => start,
            ScrollAlign::End => end - self.viewport_size,
            ScrollAlign::Center => start + size / 2.0 - self.viewport_size / 2.0,
            ScrollAlign::Auto => {
                if start < top || (end > bottom && size > self.viewport_size) {
                    start
                } else if end > bottom {
                    end - self.viewport_size
                } else {
                    top
                }
            }
        };
        self.scroll_to(target)
    }

    fn clamp_scroll(&mut self) {
        let max = self.max_scroll_offset();
        if self.scroll_offset > max {
            self.scroll_offset = max;
        }
        if self.scroll_offset < 0.0 {
            self.scroll_offset = 0.0;
        }
    }

    // ─── Layout ───────────────────────────────────────────────────

    /// Items to render for the current scroll position. O(log² n).
    #[must_use]
    pub fn visible_range(&self) -> VisibleRange {
        let _span = vlist_core::debug_span!(
            "viewport_layout",
            items = self.len(),
            scroll = self.scroll_offset,
            viewport = self.viewport_size
        )
        .entered();

        if self.is_empty() || self.viewport_size <= 0.0 {
            return VisibleRange::EMPTY;
        }

        let top = self.scroll_offset;
        let bottom = top + self.viewport_size;
        let first = self.tree.get_bound(top);
        let mut last = self.tree.get_bound(bottom);
        // An item starting exactly at the bottom edge is not visible.
        if last > first && self.tree.sum(last) >= bottom {
            last -= 1;
        }

        let overscan = self.config.overscan;
        let start = first.saturating_sub(overscan);
        let end = last.saturating_add(1).saturating_add(overscan).min(self.len());
        let mut offset = self.tree.sum(start);
        if let Some(ratio) = self.config.pixel_ratio {
            offset = DisplayEnvironment::default().with_pixel_ratio(ratio).snap(offset);
        }

        vlist_core::trace!(start, end, offset, "visible range");
        VisibleRange { start, end, offset }
    }
}

fn sanitize_size(size: f64) -> f64 {
    if size.is_finite() && size > 0.0 { size } else { 0.0 }
}
