//! Finite-difference derivatives with respect to the x-axis.

/// `dy / dx`, or zero where the axis does not advance.
fn slope(dy: f64, dx: f64) -> f64 {
    if dx == 0.0 {
        0.0
    } else {
        dy / dx
    }
}

/// First derivative: central differences inside, one-sided at both ends.
///
/// Fewer than 2 samples are returned unchanged.
pub fn first_derivative(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return y[..n].to_vec();
    }
    let mut out = Vec::with_capacity(n);
    out.push(slope(y[1] - y[0], x[1] - x[0]));
    for i in 1..n - 1 {
        out.push(slope(y[i + 1] - y[i - 1], x[i + 1] - x[i - 1]));
    }
    out.push(slope(y[n - 1] - y[n - 2], x[n - 1] - x[n - 2]));
    out
}

/// Second derivative from the central second difference, using the mean of
/// the two neighbouring spacings. The end samples repeat their neighbour.
///
/// Fewer than 3 samples are returned unchanged.
pub fn second_derivative(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len().min(y.len());
    if n < 3 {
        return y[..n].to_vec();
    }
    let mut out = vec![0.0; n];
    for i in 1..n - 1 {
        let spacing = (x[i + 1] - x[i - 1]) / 2.0;
        out[i] = slope(y[i + 1] - 2.0 * y[i] + y[i - 1], spacing * spacing);
    }
    out[0] = out[1];
    out[n - 1] = out[n - 2];
    out
}
