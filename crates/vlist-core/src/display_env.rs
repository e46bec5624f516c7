#![forbid(unsafe_code)]

//! Display environment probes.
//!
//! Virtualized layout works in logical units, but the final placement of a
//! rendered batch should land on whole device pixels, and touch-style input
//! scrolls in long flings that need a deeper overscan buffer. Both facts are
//! properties of the process environment, not of any single list, so they are
//! probed once and cached.
//!
//! # Detection order
//!
//! | Field | Sources (first valid wins) | Fallback |
//! |-------|----------------------------|----------|
//! | `pixel_ratio` | `VLIST_PIXEL_RATIO`, `GDK_SCALE`, `QT_SCALE_FACTOR` | `1.0` |
//! | `coarse_pointer` | `VLIST_COARSE_POINTER` (`1`/`true`/`yes`) | `false` |
//!
//! A value that does not parse, is not finite, or is not positive is skipped
//! and the next source is tried.

use std::env;
use std::sync::OnceLock;

/// Default overscan for fine pointers (mouse, trackpad, keyboard).
pub const FINE_POINTER_OVERSCAN: usize = 2;

/// Default overscan for coarse pointers (touch flings).
pub const COARSE_POINTER_OVERSCAN: usize = 6;

#[derive(Debug, Clone, Default)]
struct DetectInputs {
    pixel_ratio: Option<String>,
    gdk_scale: Option<String>,
    qt_scale_factor: Option<String>,
    coarse_pointer: Option<String>,
}

impl DetectInputs {
    fn from_env() -> Self {
        Self {
            pixel_ratio: env::var("VLIST_PIXEL_RATIO").ok(),
            gdk_scale: env::var("GDK_SCALE").ok(),
            qt_scale_factor: env::var("QT_SCALE_FACTOR").ok(),
            coarse_pointer: env::var("VLIST_COARSE_POINTER").ok(),
        }
    }
}

/// Process-wide facts about the display the list is laid out for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayEnvironment {
    /// Device pixels per logical layout unit. Always finite and positive.
    pub pixel_ratio: f64,
    /// Whether the primary pointer is coarse (touch).
    pub coarse_pointer: bool,
}

impl Default for DisplayEnvironment {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            coarse_pointer: false,
        }
    }
}

impl DisplayEnvironment {
    /// Probe the environment. Uncached; see [`DisplayEnvironment::global`].
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_from_inputs(&DetectInputs::from_env())
    }

    fn detect_from_inputs(inputs: &DetectInputs) -> Self {
        let pixel_ratio = [
            inputs.pixel_ratio.as_deref(),
            inputs.gdk_scale.as_deref(),
            inputs.qt_scale_factor.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find_map(parse_ratio)
        .unwrap_or(1.0);

        let coarse_pointer = inputs
            .coarse_pointer
            .as_deref()
            .is_some_and(parse_flag);

        let detected = Self {
            pixel_ratio,
            coarse_pointer,
        };
        crate::debug!(
            pixel_ratio = detected.pixel_ratio,
            coarse_pointer = detected.coarse_pointer,
            "display environment detected"
        );
        detected
    }

    /// The cached environment, probed on first use.
    ///
    /// Later changes to the environment variables are not observed.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<DisplayEnvironment> = OnceLock::new();
        GLOBAL.get_or_init(Self::detect)
    }

    /// Create an environment with an explicit pixel ratio.
    ///
    /// Non-finite or non-positive ratios are replaced by `1.0`.
    #[must_use]
    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        };
        self
    }

    /// Create an environment with an explicit pointer kind.
    #[must_use]
    pub fn with_coarse_pointer(mut self, coarse: bool) -> Self {
        self.coarse_pointer = coarse;
        self
    }

    /// Round a logical offset to the nearest device pixel.
    #[inline]
    #[must_use]
    pub fn snap(&self, value: f64) -> f64 {
        (value * self.pixel_ratio).round() / self.pixel_ratio
    }

    /// Overscan suited to the pointer kind.
    #[inline]
    #[must_use]
    pub fn recommended_overscan(&self) -> usize {
        if self.coarse_pointer {
            COARSE_POINTER_OVERSCAN
        } else {
            FINE_POINTER_OVERSCAN
        }
    }
}

fn parse_ratio(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && *r > 0.0)
}

fn parse_flag(raw: &str) -> bool {
    let raw = raw.trim();
    raw == "1" || raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("yes")
}
