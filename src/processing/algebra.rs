//! Element-wise arithmetic and comparison between curves.
//!
//! Binary operations work on the first `min(len(a), len(b))` samples and
//! take their x-axis from the shorter operand.

use std::sync::Arc;

use crate::data::model::{Curve, CurveStyle, IdSource, LineStyle, MetaValue};

fn combine(
    a: &Curve,
    b: &Curve,
    ids: &mut dyn IdSource,
    label: String,
    op: impl Fn(f64, f64) -> f64,
) -> Curve {
    let n = a.len().min(b.len());
    let x = if a.len() <= b.len() {
        a.x_prefix(n)
    } else {
        b.x_prefix(n)
    };
    let y: Vec<f64> = a.y[..n]
        .iter()
        .zip(&b.y[..n])
        .map(|(&p, &q)| op(p, q))
        .collect();

    let mut curve = Curve::new(ids.next_id(), label, x, y)
        .with_units(a.x_unit.clone(), a.y_unit.clone())
        .with_kind(a.kind)
        .with_meta("source", format!("{}, {}", a.id, b.id));
    curve.style.line_width = a.style.line_width;
    curve
}

/// `a − b`.
pub fn difference(a: &Curve, b: &Curve, ids: &mut dyn IdSource) -> Curve {
    combine(a, b, ids, format!("{} − {}", a.label, b.label), |p, q| p - q)
}

/// `a + b`.
pub fn sum(a: &Curve, b: &Curve, ids: &mut dyn IdSource) -> Curve {
    combine(a, b, ids, format!("{} + {}", a.label, b.label), |p, q| p + q)
}

/// `|a − b|`, drawn dashed.
pub fn residual(a: &Curve, b: &Curve, ids: &mut dyn IdSource) -> Curve {
    let mut curve = combine(a, b, ids, format!("|{} − {}|", a.label, b.label), |p, q| {
        (p - q).abs()
    });
    curve.style.line_style = LineStyle::Dashed;
    curve
}

/// Every intensity multiplied by `factor`.
pub fn scale(curve: &Curve, factor: f64, ids: &mut dyn IdSource) -> Curve {
    let (_, y) = curve.samples();
    let mut scaled = curve.derive(ids.next_id(), "scaled", y.iter().map(|v| v * factor).collect());
    scaled.label = format!("{} × {factor}", curve.label);
    scaled
}

/// Pearson correlation of the paired intensities.
///
/// Exactly `0.0` when there are no pairs or either side has no variance.
pub fn correlation(a: &Curve, b: &Curve) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let (ya, yb) = (&a.y[..n], &b.y[..n]);
    let mean_a = ya.iter().sum::<f64>() / n as f64;
    let mean_b = yb.iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&p, &q) in ya.iter().zip(yb) {
        let (da, db) = (p - mean_a, q - mean_b);
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    let r = cov / (var_a * var_b).sqrt();
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Mean of several curves over their common length. `None` for no curves.
pub fn average(curves: &[Curve], ids: &mut dyn IdSource) -> Option<Curve> {
    let shortest = curves.iter().min_by_key(|c| c.len())?;
    let n = shortest.len();
    let count = curves.len() as f64;
    let y: Vec<f64> = (0..n)
        .map(|i| curves.iter().map(|c| c.y[i]).sum::<f64>() / count)
        .collect();

    let sources: Vec<String> = curves.iter().map(|c| c.id.to_string()).collect();
    let curve = Curve {
        id: ids.next_id(),
        label: format!("mean of {} curves", curves.len()),
        x: shortest.x_prefix(n),
        y: Arc::from(y),
        x_unit: shortest.x_unit.clone(),
        y_unit: shortest.y_unit.clone(),
        kind: shortest.kind,
        style: CurveStyle::default(),
        meta: [("source".to_string(), MetaValue::Text(sources.join(", ")))]
            .into_iter()
            .collect(),
    };
    Some(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CurveId, SequentialIds};

    fn curve(id: u64, y: Vec<f64>) -> Curve {
        let x: Vec<f64> = (0..y.len()).map(|i| i as f64 * 2.0).collect();
        Curve::new(CurveId(id), format!("c{id}"), x, y)
    }

    #[test]
    fn difference_truncates_to_shorter() {
        let a = curve(0, vec![5.0, 6.0, 7.0, 8.0]);
        let b = curve(1, vec![1.0, 1.0, 1.0]);
        let mut ids = SequentialIds::starting_at(10);
        let d = difference(&a, &b, &mut ids);
        assert_eq!(d.id, CurveId(10));
        assert_eq!(&*d.y, &[4.0, 5.0, 6.0]);
        assert!(Arc::ptr_eq(&d.x, &b.x));
        assert_eq!(d.label, "c0 − c1");
    }

    #[test]
    fn sum_and_residual() {
        let a = curve(0, vec![1.0, 2.0]);
        let b = curve(1, vec![3.0, 1.0]);
        let mut ids = SequentialIds::new();
        assert_eq!(&*sum(&a, &b, &mut ids).y, &[4.0, 3.0]);
        let r = residual(&a, &b, &mut ids);
        assert_eq!(&*r.y, &[2.0, 1.0]);
        assert_eq!(r.style.line_style, LineStyle::Dashed);
    }

    #[test]
    fn scale_keeps_axis_and_source() {
        let a = curve(0, vec![1.0, -2.0]);
        let scaled = scale(&a, 3.0, &mut SequentialIds::starting_at(1));
        assert_eq!(&*scaled.y, &[3.0, -6.0]);
        assert!(Arc::ptr_eq(&scaled.x, &a.x));
        assert_eq!(&*a.y, &[1.0, -2.0]);
    }

    #[test]
    fn correlation_extremes() {
        let a = curve(0, vec![1.0, 4.0, 2.0, 8.0, 5.0]);
        let mut ids = SequentialIds::new();
        let scaled = scale(&a, 2.5, &mut ids);
        let negated = scale(&a, -1.0, &mut ids);
        assert!((correlation(&a, &scaled) - 1.0).abs() < 1e-12);
        assert!((correlation(&a, &negated) + 1.0).abs() < 1e-12);

        let empty = curve(2, Vec::new());
        assert_eq!(correlation(&empty, &empty), 0.0);
        let flat = curve(3, vec![2.0; 5]);
        assert_eq!(correlation(&a, &flat), 0.0);
    }

    #[test]
    fn average_over_common_length() {
        let curves = vec![curve(0, vec![1.0, 2.0, 3.0]), curve(1, vec![3.0, 4.0])];
        let mean = average(&curves, &mut SequentialIds::new()).unwrap();
        assert_eq!(&*mean.y, &[2.0, 3.0]);
        assert!(Arc::ptr_eq(&mean.x, &curves[1].x));
        assert!(average(&[], &mut SequentialIds::new()).is_none());
    }
}
