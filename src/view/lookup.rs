/// Index of the element of a sorted array closest to `target`.
///
/// The sort direction is taken from the endpoints, so both ascending and
/// descending axes work. Equal distances resolve to the lower index.
/// Returns `None` for an empty array.
pub fn binary_search_closest(values: &[f64], target: f64) -> Option<usize> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(0);
    }
    let descending = values[0] > values[n - 1];

    // First index on the far side of `target`.
    let upper = if descending {
        values.partition_point(|&v| v > target)
    } else {
        values.partition_point(|&v| v < target)
    };
    if upper == 0 {
        return Some(0);
    }
    if upper == n {
        return Some(n - 1);
    }
    let (lo, hi) = (upper - 1, upper);
    if (values[hi] - target).abs() < (values[lo] - target).abs() {
        Some(hi)
    } else {
        Some(lo)
    }
}
