//! Intensity normalisations. Each returns a new buffer of the input length.

/// Rescale linearly to `[0, 1]`. A constant signal maps to all zeros.
pub fn min_max(y: &[f64]) -> Vec<f64> {
    let min = y.iter().copied().fold(f64::INFINITY, f64::min);
    let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range == 0.0 || !range.is_finite() {
        vec![0.0; y.len()]
    } else {
        y.iter().map(|&v| (v - min) / range).collect()
    }
}

/// Trapezoidal area under `|y|` with `|dx|` spacing.
pub fn absolute_area(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]).abs() * (ys[0].abs() + ys[1].abs()) / 2.0)
        .sum()
}

/// Divide by the absolute area so the result has unit area.
///
/// Zero or non-finite area leaves the signal unchanged.
pub fn area(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len().min(y.len());
    let y = &y[..n];
    let total = absolute_area(&x[..n], y);
    if total > 0.0 && total.is_finite() {
        y.iter().map(|v| v / total).collect()
    } else {
        y.to_vec()
    }
}

/// Standard normal variate: subtract the mean, divide by the population
/// standard deviation. Zero spread gives all zeros.
pub fn snv(y: &[f64]) -> Vec<f64> {
    if y.is_empty() {
        return Vec::new();
    }
    let n = y.len() as f64;
    let mean = y.iter().sum::<f64>() / n;
    let variance = y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std == 0.0 || !std.is_finite() {
        return vec![0.0; y.len()];
    }
    y.iter().map(|v| (v - mean) / std).collect()
}
