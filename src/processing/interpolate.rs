use std::sync::Arc;

use crate::data::model::{Curve, IdSource};

/// Piecewise-linear resampling of `(x, y)` at each of `targets`.
///
/// The source axis may be ascending or descending (decided from its
/// endpoints). Targets outside the source range take the nearest endpoint
/// value. Fewer than 2 source samples give zeros.
pub fn interpolate_values(x: &[f64], y: &[f64], targets: &[f64]) -> Vec<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return vec![0.0; targets.len()];
    }
    let (x, y) = (&x[..n], &y[..n]);
    let descending = x[0] > x[n - 1];

    targets
        .iter()
        .map(|&t| {
            // Number of leading samples on the near side of `t`.
            let upper = if descending {
                x.partition_point(|&v| v >= t)
            } else {
                x.partition_point(|&v| v <= t)
            };
            if upper == 0 {
                return y[0];
            }
            if upper == n {
                return y[n - 1];
            }
            let (lo, hi) = (upper - 1, upper);
            let span = x[hi] - x[lo];
            if span == 0.0 {
                return y[lo];
            }
            y[lo] + (t - x[lo]) / span * (y[hi] - y[lo])
        })
        .collect()
}

/// Resample a curve onto `grid`.
///
/// The result shares `grid` as its x-axis, so curves interpolated onto the
/// same grid share one allocation.
pub fn interpolate_to_grid(curve: &Curve, grid: &Arc<[f64]>, ids: &mut dyn IdSource) -> Curve {
    let (x, y) = curve.samples();
    let values = interpolate_values(x, y, grid);
    let mut resampled = curve.derive(ids.next_id(), "interpolated", values);
    resampled.x = Arc::clone(grid);
    resampled
}
