#![forbid(unsafe_code)]

//! Offset layout for virtualized lists.
//!
//! - [`offset_tree`]: Fenwick tree mapping item index to cumulative offset.
//! - [`viewport`]: scroll state, measurement bookkeeping and visible ranges.

pub mod offset_tree;
pub mod viewport;

pub use offset_tree::{IndexedOffsetTree, OffsetTreeError};
pub use viewport::{ScrollAlign, ViewportConfig, VirtualViewport, VisibleRange};
