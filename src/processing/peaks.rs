//! Local-maximum detection with prominence and distance filtering.
//!
//! # Algorithm
//!
//! 1. Every strict local maximum (`y[i] > y[i-1]` and `y[i] > y[i+1]`) is a candidate.
//! 2. Prominence is the height above the higher of the two valley floors
//!    found by walking outward until a higher sample appears.
//! 3. Candidates below `prominence × (max − min)` are dropped.
//! 4. The rest are visited by descending prominence (ties: lower index
//!    first) and kept unless a kept peak lies closer than `min_distance`.
//! 5. At most `max_peaks` survive; the result is ordered by x.

use serde::{Deserialize, Serialize};

use crate::data::model::{Curve, Peak};

/// Peak detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakParams {
    /// Minimum prominence as a fraction of the global y-range.
    pub prominence: f64,
    /// Minimum index distance between two kept peaks.
    pub min_distance: usize,
    pub max_peaks: Option<usize>,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            prominence: 0.01,
            min_distance: 5,
            max_peaks: None,
        }
    }
}

fn prominence(y: &[f64], i: usize) -> f64 {
    let height = y[i];
    let floor = |range: &mut dyn Iterator<Item = usize>| {
        range
            .map(|j| y[j])
            .take_while(|&v| v <= height)
            .fold(height, f64::min)
    };
    let before = floor(&mut (0..i).rev());
    let after = floor(&mut (i + 1..y.len()));
    height - before.max(after)
}

/// Detect peaks in paired samples. Returns an empty list for fewer than
/// 3 samples or a flat signal.
pub fn detect(x: &[f64], y: &[f64], params: &PeakParams) -> Vec<Peak> {
    let n = x.len().min(y.len());
    if n < 3 {
        return Vec::new();
    }
    let (x, y) = (&x[..n], &y[..n]);

    let min = y.iter().copied().fold(f64::INFINITY, f64::min);
    let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !(range > 0.0 && range.is_finite()) {
        return Vec::new();
    }
    let threshold = params.prominence * range;

    let mut candidates: Vec<(usize, f64)> = (1..n - 1)
        .filter(|&i| y[i] > y[i - 1] && y[i] > y[i + 1])
        .map(|i| (i, prominence(y, i)))
        .filter(|&(_, p)| p >= threshold)
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut kept: Vec<(usize, f64)> = Vec::new();
    for (index, prom) in candidates {
        if kept
            .iter()
            .all(|&(other, _)| other.abs_diff(index) >= params.min_distance)
        {
            kept.push((index, prom));
        }
    }
    if let Some(limit) = params.max_peaks {
        kept.truncate(limit);
    }

    let mut peaks: Vec<Peak> = kept
        .into_iter()
        .map(|(index, prominence)| Peak {
            x: x[index],
            y: y[index],
            index,
            prominence,
            label: None,
            curve_id: None,
        })
        .collect();
    peaks.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.index.cmp(&b.index)));
    peaks
}

/// [`detect`] on a curve; peaks are labelled with their position and tagged
/// with the curve id.
pub fn detect_curve(curve: &Curve, params: &PeakParams) -> Vec<Peak> {
    let (x, y) = curve.samples();
    detect(x, y, params)
        .into_iter()
        .map(|peak| Peak {
            label: Some(format!("{:.1}", peak.x)),
            curve_id: Some(curve.id),
            ..peak
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CurveId;

    #[test]
    fn higher_of_two_close_peaks_wins() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let y = [0.0, 1.0, 0.5, 1.2, 0.0, 0.0, 0.0];
        let params = PeakParams {
            prominence: 0.1,
            min_distance: 3,
            max_peaks: None,
        };
        let peaks = detect(&x, &y, &params);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].x, 4.0);
        assert_eq!(peaks[0].index, 3);
    }

    #[test]
    fn prominence_stops_at_higher_sample() {
        let y = [0.0, 1.0, 0.5, 1.2, 0.0];
        assert!((prominence(&y, 1) - 0.5).abs() < 1e-12);
        assert!((prominence(&y, 3) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn low_prominence_is_discarded() {
        let x: Vec<f64> = (0..9).map(f64::from).collect();
        let y = [0.0, 10.0, 0.0, 0.0, 0.2, 0.1, 0.0, 0.0, 0.0];
        let params = PeakParams {
            prominence: 0.05,
            min_distance: 1,
            max_peaks: None,
        };
        let peaks = detect(&x, &y, &params);
        assert_eq!(peaks.iter().map(|p| p.index).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn max_peaks_keeps_most_prominent_sorted_by_x() {
        let x: Vec<f64> = (0..11).map(f64::from).collect();
        let y = [0.0, 3.0, 0.0, 5.0, 0.0, 1.0, 0.0, 4.0, 0.0, 2.0, 0.0];
        let params = PeakParams {
            prominence: 0.0,
            min_distance: 1,
            max_peaks: Some(3),
        };
        let indices: Vec<usize> = detect(&x, &y, &params).iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 3, 7]);
    }

    #[test]
    fn equal_prominence_prefers_lower_index() {
        let x: Vec<f64> = (0..5).map(f64::from).collect();
        let y = [0.0, 2.0, 0.0, 2.0, 0.0];
        let params = PeakParams {
            prominence: 0.0,
            min_distance: 3,
            max_peaks: None,
        };
        let peaks = detect(&x, &y, &params);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 1);
    }

    #[test]
    fn peaks_exactly_min_distance_apart_are_both_kept() {
        let x: Vec<f64> = (0..7).map(f64::from).collect();
        let y = [0.0, 2.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let indices = |min_distance| {
            let params = PeakParams {
                prominence: 0.0,
                min_distance,
                max_peaks: None,
            };
            detect(&x, &y, &params).iter().map(|p| p.index).collect::<Vec<_>>()
        };
        assert_eq!(indices(3), vec![1, 4]);
        assert_eq!(indices(4), vec![1]);
    }

    #[test]
    fn degenerate_inputs() {
        let params = PeakParams::default();
        assert!(detect(&[1.0, 2.0], &[0.0, 1.0], &params).is_empty());
        assert!(detect(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0], &params).is_empty());
    }

    #[test]
    fn descending_axis_output_is_ascending_x() {
        let x: Vec<f64> = (0..9).map(|i| 100.0 - f64::from(i)).collect();
        let y = [0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0];
        let params = PeakParams {
            prominence: 0.1,
            min_distance: 2,
            max_peaks: None,
        };
        let xs: Vec<f64> = detect(&x, &y, &params).iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![94.0, 99.0]);
    }

    #[test]
    fn curve_peaks_are_tagged() {
        let curve = Curve::new(
            CurveId(4),
            "c",
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![0.0, 0.0, 3.0, 0.0, 0.0],
        );
        let peaks = detect_curve(&curve, &PeakParams::default());
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].curve_id, Some(CurveId(4)));
        assert_eq!(peaks[0].label.as_deref(), Some("3.0"));
    }
}
