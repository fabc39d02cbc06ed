//! Savitzky–Golay and moving-average smoothing.
//!
//! Both leave the first and last `window / 2` samples untouched.

/// Quadratic/cubic smoothing coefficients and their normalisation.
fn savitzky_golay_coefficients(window: usize) -> Option<(&'static [f64], f64)> {
    const W5: [f64; 5] = [-3.0, 12.0, 17.0, 12.0, -3.0];
    const W7: [f64; 7] = [-2.0, 3.0, 6.0, 7.0, 6.0, 3.0, -2.0];
    const W9: [f64; 9] = [-21.0, 14.0, 39.0, 54.0, 59.0, 54.0, 39.0, 14.0, -21.0];
    const W11: [f64; 11] = [
        -36.0, 9.0, 44.0, 69.0, 84.0, 89.0, 84.0, 69.0, 44.0, 9.0, -36.0,
    ];
    match window {
        5 => Some((&W5, 35.0)),
        7 => Some((&W7, 21.0)),
        9 => Some((&W9, 231.0)),
        11 => Some((&W11, 429.0)),
        _ => None,
    }
}

/// Even window sizes are bumped to the next odd size.
pub fn odd_window(window: usize) -> usize {
    if window % 2 == 0 {
        window + 1
    } else {
        window
    }
}

/// Savitzky–Golay smoothing for windows 5, 7, 9 and 11.
///
/// Any other window, or a signal shorter than the window, goes through
/// [`moving_average`] instead.
pub fn savitzky_golay(y: &[f64], window: usize) -> Vec<f64> {
    let window = odd_window(window);
    let Some((coefficients, norm)) = savitzky_golay_coefficients(window) else {
        return moving_average(y, window);
    };
    if y.len() < window {
        return moving_average(y, window);
    }

    let half = window / 2;
    let mut out = y.to_vec();
    for (i, value) in out.iter_mut().enumerate().take(y.len() - half).skip(half) {
        let neighbourhood = &y[i - half..=i + half];
        *value = coefficients
            .iter()
            .zip(neighbourhood)
            .map(|(c, v)| c * v)
            .sum::<f64>()
            / norm;
    }
    out
}

/// Uniform moving average over an odd window, edges copied.
pub fn moving_average(y: &[f64], window: usize) -> Vec<f64> {
    let window = odd_window(window);
    let mut out = y.to_vec();
    if window < 3 || y.len() < window {
        return out;
    }

    let half = window / 2;
    let mut sum: f64 = y[..window].iter().sum();
    out[half] = sum / window as f64;
    for i in half + 1..y.len() - half {
        sum += y[i + half] - y[i - half - 1];
        out[i] = sum / window as f64;
    }
    out
}
