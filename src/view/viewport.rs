use serde::{Deserialize, Serialize};

use super::{binary_search_closest, decimate};
use crate::data::model::{Curve, DecimatedPoint};

pub const DEFAULT_DECIMATION_THRESHOLD: usize = 5000;
pub const DEFAULT_TARGET_POINTS: usize = 1000;

/// Affine map from a data interval onto a pixel interval.
///
/// A reversed pixel interval flips the axis, which is how screen-space y
/// (growing downward) is expressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearPixelMap {
    pub data: (f64, f64),
    pub pixels: (f64, f64),
}

impl LinearPixelMap {
    pub fn new(data: (f64, f64), pixels: (f64, f64)) -> Self {
        Self { data, pixels }
    }

    /// Horizontal map for a plot `width` pixels wide.
    pub fn horizontal(lo: f64, hi: f64, width: f64) -> Self {
        Self::new((lo, hi), (0.0, width))
    }

    /// Vertical map for a plot `height` pixels tall, with `hi` at the top.
    pub fn vertical(lo: f64, hi: f64, height: f64) -> Self {
        Self::new((lo, hi), (height, 0.0))
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.data;
        let (p0, p1) = self.pixels;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return p0;
        }
        p0 + (value - d0) / span * (p1 - p0)
    }
}

/// Rendering knobs from the `[render]` config table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Windows with more samples than this are decimated.
    pub decimation_threshold: usize,
    pub target_points: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            decimation_threshold: DEFAULT_DECIMATION_THRESHOLD,
            target_points: DEFAULT_TARGET_POINTS,
        }
    }
}

/// The `[start, end)` sample window covering the data interval `[lo, hi]`.
///
/// One extra sample is kept on each side so lines reach the plot edges.
/// Works for ascending and descending axes; the bounds may come in any
/// order.
pub fn visible_range(x: &[f64], lo: f64, hi: f64) -> (usize, usize) {
    let (Some(a), Some(b)) = (binary_search_closest(x, lo), binary_search_closest(x, hi)) else {
        return (0, 0);
    };
    let (first, last) = (a.min(b), a.max(b));
    (first.saturating_sub(1), (last + 2).min(x.len()))
}

/// Screen points for the visible window of `curve`.
///
/// Below the decimation threshold every sample is mapped; above it the
/// window is reduced with LTTB to `settings.target_points`.
pub fn render_window(
    curve: &Curve,
    window: (usize, usize),
    map_x: &LinearPixelMap,
    map_y: &LinearPixelMap,
    settings: &RenderSettings,
) -> Vec<DecimatedPoint> {
    let (x, y) = curve.samples();
    let (start, end) = (window.0.min(x.len()), window.1.min(x.len()));
    let target = if end.saturating_sub(start) > settings.decimation_threshold {
        settings.target_points
    } else {
        usize::MAX
    };
    decimate(x, y, start, end, |v| map_x.apply(v), |v| map_y.apply(v), target)
}
