//! Rubber-band baseline: the lower convex hull of the signal.

/// Indices of the lower convex hull of `(i, y[i])`, left to right.
///
/// Andrew's monotone chain, lower half only. Collinear points are dropped
/// so the hull is the minimal set of vertices.
fn lower_hull(y: &[f64]) -> Vec<usize> {
    let mut hull: Vec<usize> = Vec::with_capacity(y.len());
    for i in 0..y.len() {
        while let [.., a, b] = hull[..] {
            let cross = (b - a) as f64 * (y[i] - y[a]) - (y[b] - y[a]) * (i - a) as f64;
            if cross <= 0.0 {
                hull.pop();
            } else {
                break;
            }
        }
        hull.push(i);
    }
    hull
}

/// The rubber-band baseline, interpolated linearly between hull vertices.
///
/// Never above the signal; touches it at both ends. Fewer than 3 samples
/// give the signal itself.
pub fn rubber_band(y: &[f64]) -> Vec<f64> {
    if y.len() < 3 {
        return y.to_vec();
    }
    let hull = lower_hull(y);
    let mut baseline = vec![0.0; y.len()];
    for pair in hull.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let slope = (y[b] - y[a]) / (b - a) as f64;
        for (i, value) in baseline.iter_mut().enumerate().take(b + 1).skip(a) {
            *value = y[a] + slope * (i - a) as f64;
        }
    }
    for &vertex in &hull {
        baseline[vertex] = y[vertex];
    }
    baseline
}

/// Signal minus its rubber-band baseline. Fewer than 3 samples are returned unchanged.
pub fn baseline_correct(y: &[f64]) -> Vec<f64> {
    if y.len() < 3 {
        return y.to_vec();
    }
    rubber_band(y)
        .iter()
        .zip(y)
        .map(|(base, value)| value - base)
        .collect()
}
