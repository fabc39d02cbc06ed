//! Randomized properties of the numerical core.

use proptest::prelude::*;

use rusty_spectra::data::model::{Curve, CurveId, SequentialIds};
use rusty_spectra::processing::{algebra, normalize, ProcessingStep};
use rusty_spectra::view::{binary_search_closest, decimate};

fn sorted(mut values: Vec<f64>, descending: bool) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    if descending {
        values.reverse();
    }
    values
}

fn curve(id: u64, y: Vec<f64>) -> Curve {
    let x: Vec<f64> = (0..y.len()).map(|i| 400.0 + i as f64).collect();
    Curve::new(CurveId(id), format!("c{id}"), x, y)
}

proptest! {
    #[test]
    fn closest_matches_linear_scan(
        values in prop::collection::vec(-1.0e4f64..1.0e4, 1..200),
        descending in any::<bool>(),
        target in -1.2e4f64..1.2e4,
    ) {
        let values = sorted(values, descending);
        let found = binary_search_closest(&values, target).unwrap();
        let best = values
            .iter()
            .map(|v| (v - target).abs())
            .fold(f64::INFINITY, f64::min);
        prop_assert_eq!((values[found] - target).abs(), best);
    }

    #[test]
    fn lttb_keeps_endpoints_and_length(
        y in prop::collection::vec(-1.0e3f64..1.0e3, 50..600),
        target in 3usize..40,
        start_frac in 0.0f64..0.3,
    ) {
        let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
        let start = (y.len() as f64 * start_frac) as usize;
        let end = y.len();
        prop_assume!(end - start > target);

        let out = decimate(&x, &y, start, end, |v| v * 2.0, |v| -v, target);
        prop_assert_eq!(out.len(), target);
        prop_assert_eq!(out[0].source_index, start);
        prop_assert_eq!(out[target - 1].source_index, end - 1);
        prop_assert!(out.windows(2).all(|w| w[0].source_index < w[1].source_index));
    }

    #[test]
    fn snv_has_zero_mean_and_unit_deviation(
        y in prop::collection::vec(-1.0e3f64..1.0e3, 2..300),
    ) {
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let var = y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / y.len() as f64;
        prop_assume!(var > 1e-2);

        let out = normalize::snv(&y);
        let out_mean = out.iter().sum::<f64>() / out.len() as f64;
        let out_var = out.iter().map(|v| (v - out_mean).powi(2)).sum::<f64>() / out.len() as f64;
        prop_assert!(out_mean.abs() < 1e-9);
        prop_assert!((out_var.sqrt() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn min_max_stays_in_unit_interval(
        y in prop::collection::vec(-1.0e6f64..1.0e6, 1..300),
    ) {
        let out = normalize::min_max(&y);
        prop_assert_eq!(out.len(), y.len());
        prop_assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn correlation_is_bounded(
        a in prop::collection::vec(-1.0e3f64..1.0e3, 0..100),
        b in prop::collection::vec(-1.0e3f64..1.0e3, 0..100),
    ) {
        let r = algebra::correlation(&curve(0, a), &curve(1, b));
        prop_assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn transforms_leave_input_untouched(
        y in prop::collection::vec(-1.0e3f64..1.0e3, 0..200),
    ) {
        let source = curve(0, y.clone());
        let mut ids = SequentialIds::starting_at(1);
        for step in [
            ProcessingStep::Baseline,
            ProcessingStep::MinMax,
            ProcessingStep::Area,
            ProcessingStep::Snv,
            ProcessingStep::Smooth { window: 7 },
            ProcessingStep::Derivative,
            ProcessingStep::SecondDerivative,
        ] {
            let first = step.apply(&source, &mut ids);
            let second = step.apply(&source, &mut ids);
            prop_assert_eq!(&*source.y, y.as_slice());
            prop_assert_eq!(first.len(), source.len());
            prop_assert_eq!(&first.y, &second.y);
            prop_assert_ne!(first.id, second.id);
        }
    }
}
