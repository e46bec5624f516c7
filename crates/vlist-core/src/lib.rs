#![forbid(unsafe_code)]

//! Core: logging facade and display environment probes shared by vlist crates.

pub mod display_env;
pub mod logging;

pub use display_env::DisplayEnvironment;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, trace_span, warn};
