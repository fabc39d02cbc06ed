//! Largest-Triangle-Three-Buckets downsampling in screen space.
//!
//! The first and last samples of the window are always kept. The interior
//! is split into `target - 2` buckets of roughly `(n - 2) / (target - 2)`
//! samples. Each bucket contributes the sample forming the largest triangle
//! with the previously selected point and the centroid of the next bucket
//! (the final bucket uses the last sample instead of a centroid).

use crate::data::model::DecimatedPoint;

/// Downsample `x[start..end]`, `y[start..end]` to exactly `target` points.
///
/// Coordinates go through `map_x`/`map_y` before any area is measured, so
/// the selection is made in pixel space. `source_index` values are absolute
/// indices into `x`/`y`. A window that already fits in `target` points is
/// mapped unchanged. A `target` below 3 keeps at most the window's first
/// and last samples.
pub fn decimate(
    x: &[f64],
    y: &[f64],
    start: usize,
    end: usize,
    map_x: impl Fn(f64) -> f64,
    map_y: impl Fn(f64) -> f64,
    target: usize,
) -> Vec<DecimatedPoint> {
    let end = end.min(x.len()).min(y.len());
    if start >= end {
        return Vec::new();
    }
    let n = end - start;
    let px: Vec<f64> = x[start..end].iter().map(|&v| map_x(v)).collect();
    let py: Vec<f64> = y[start..end].iter().map(|&v| map_y(v)).collect();
    let point = |i: usize| DecimatedPoint {
        pixel_x: px[i],
        pixel_y: py[i],
        source_index: start + i,
    };

    if n <= target {
        return (0..n).map(point).collect();
    }
    match target {
        0 => return Vec::new(),
        1 => return vec![point(0)],
        2 => return vec![point(0), point(n - 1)],
        _ => {}
    }

    let buckets = target - 2;
    let bucket_size = (n - 2) as f64 / buckets as f64;
    let bound = |b: usize| {
        if b >= buckets {
            n - 1
        } else {
            ((b as f64 * bucket_size).floor() as usize + 1).min(n - 1)
        }
    };

    let mut out = Vec::with_capacity(target);
    out.push(point(0));
    let mut anchor = 0usize;

    for b in 0..buckets {
        let (lo, hi) = (bound(b), bound(b + 1));

        // Centroid of the following bucket, or the final sample.
        let (cx, cy) = if b + 1 == buckets {
            (px[n - 1], py[n - 1])
        } else {
            let (next_lo, next_hi) = (hi, bound(b + 2));
            let count = (next_hi - next_lo) as f64;
            let sx: f64 = px[next_lo..next_hi].iter().sum();
            let sy: f64 = py[next_lo..next_hi].iter().sum();
            (sx / count, sy / count)
        };

        let (ax, ay) = (px[anchor], py[anchor]);
        let mut best = lo;
        let mut best_area = f64::NEG_INFINITY;
        for i in lo..hi {
            let area = ((ax - cx) * (py[i] - ay) - (ax - px[i]) * (cy - ay)).abs();
            if area > best_area {
                best_area = area;
                best = i;
            }
        }
        out.push(point(best));
        anchor = best;
    }

    out.push(point(n - 1));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(v: f64) -> f64 {
        v
    }

    #[test]
    fn small_window_is_returned_whole() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [5.0, 6.0, 7.0, 8.0];
        let out = decimate(&x, &y, 1, 4, identity, |v| -v, 10);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].source_index, 1);
        assert_eq!(out[0].pixel_y, -6.0);
        assert_eq!(out[2].source_index, 3);
    }

    #[test]
    fn keeps_endpoints_and_exact_length() {
        let x: Vec<f64> = (0..1000).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| (v / 20.0).sin()).collect();
        let out = decimate(&x, &y, 100, 900, identity, identity, 50);
        assert_eq!(out.len(), 50);
        assert_eq!(out[0].source_index, 100);
        assert_eq!(out[49].source_index, 899);
        assert!(out.windows(2).all(|w| w[0].source_index < w[1].source_index));
    }

    #[test]
    fn spike_survives() {
        let x: Vec<f64> = (0..500).map(f64::from).collect();
        let mut y = vec![0.0; 500];
        y[237] = 100.0;
        let out = decimate(&x, &y, 0, 500, identity, identity, 20);
        assert!(out.iter().any(|p| p.source_index == 237));
    }

    #[test]
    fn tiny_targets() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y = x.clone();
        assert!(decimate(&x, &y, 0, 10, identity, identity, 0).is_empty());
        let one = decimate(&x, &y, 0, 10, identity, identity, 1);
        assert_eq!(one.iter().map(|p| p.source_index).collect::<Vec<_>>(), vec![0]);
        let two = decimate(&x, &y, 0, 10, identity, identity, 2);
        assert_eq!(two.iter().map(|p| p.source_index).collect::<Vec<_>>(), vec![0, 9]);
    }

    #[test]
    fn empty_or_inverted_window() {
        let x = [1.0, 2.0];
        assert!(decimate(&x, &x, 2, 2, identity, identity, 5).is_empty());
        assert!(decimate(&x, &x, 3, 1, identity, identity, 5).is_empty());
    }
}
