//! File → curves → processing → peaks → screen points.

use std::sync::Arc;

use rusty_spectra::data::model::{Curve, IdSource, SequentialIds};
use rusty_spectra::data::spc::SpcBuilder;
use rusty_spectra::processing::{apply_steps, interpolate, peaks, PeakParams, ProcessingStep};
use rusty_spectra::view::{render_window, visible_range, LinearPixelMap, RenderSettings};
use rusty_spectra::{Config, DecoderRegistry};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn synthetic(points: usize) -> (Vec<f64>, Vec<f64>) {
    let step = 3600.0 / (points - 1) as f64;
    let x: Vec<f64> = (0..points).map(|i| 4000.0 - i as f64 * step).collect();
    let y = x
        .iter()
        .map(|&wn| {
            0.1 + 0.00005 * (wn - 400.0)
                + gaussian(wn, 2900.0, 30.0, 1.0)
                + gaussian(wn, 1650.0, 20.0, 0.6)
        })
        .collect();
    (x, y)
}

#[test]
fn spc_file_through_the_whole_pipeline() {
    let (_, y) = synthetic(20_001);
    let bytes = SpcBuilder::new(4000.0, 400.0)
        .axis_types(1, 2)
        .memo("pipeline")
        .curve(y)
        .build();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.spc");
    std::fs::write(&path, bytes).unwrap();

    let config = Config::from_str(
        r#"
        [processing]
        steps = ["baseline", "smooth:9"]

        [peaks]
        prominence = 0.2
        min_distance = 50
        "#,
    )
    .unwrap();

    let mut ids = SequentialIds::new();
    let registry = DecoderRegistry::new(config.loader.text_decoding);
    let curves = registry.load_file(&path, &mut ids).unwrap();
    assert_eq!(curves.len(), 1);
    let raw = &curves[0];
    assert_eq!(raw.len(), 20_001);
    assert!(raw.style.color.is_some());

    let processed = apply_steps(raw, &config.processing.steps, &mut ids);
    assert!(Arc::ptr_eq(&processed.x, &raw.x));
    assert_eq!(processed.label, "pipeline (baseline, smooth:9)");

    let found = peaks::detect_curve(&processed, &config.peaks);
    assert_eq!(found.len(), 2, "{found:?}");
    // Ascending x: the 1650 band comes first.
    assert!((found[0].x - 1650.0).abs() < 2.0);
    assert!((found[1].x - 2900.0).abs() < 2.0);

    let (x, _) = processed.samples();
    let window = visible_range(x, 1000.0, 3500.0);
    assert!(window.1 - window.0 > RenderSettings::default().decimation_threshold);
    let points = render_window(
        &processed,
        window,
        &LinearPixelMap::horizontal(1000.0, 3500.0, 1000.0),
        &LinearPixelMap::vertical(-0.1, 1.1, 600.0),
        &RenderSettings::default(),
    );
    assert_eq!(points.len(), RenderSettings::default().target_points);
    assert_eq!(points[0].source_index, window.0);
    assert_eq!(points.last().unwrap().source_index, window.1 - 1);
}

#[test]
fn interpolation_aligns_two_sampling_grids() {
    let (x_fine, y_fine) = synthetic(3601);
    let (x_coarse, _) = synthetic(901);
    let mut ids = SequentialIds::new();
    let fine = Curve::new(ids.next_id(), "fine", x_fine, y_fine);
    let grid: Arc<[f64]> = x_coarse.into();

    let aligned = interpolate::interpolate_to_grid(&fine, &grid, &mut ids);
    assert_eq!(aligned.len(), 901);
    assert!(Arc::ptr_eq(&aligned.x, &grid));
    // Coarse grid points coincide with every 4th fine sample.
    for (i, &v) in aligned.y.iter().enumerate() {
        assert!((v - fine.y[i * 4]).abs() < 1e-9);
    }

    let peaks = peaks::detect_curve(&aligned, &PeakParams {
        prominence: 0.3,
        min_distance: 10,
        max_peaks: Some(1),
    });
    assert_eq!(peaks.len(), 1);
    assert!((peaks[0].x - 2900.0).abs() < 5.0);
}

#[test]
fn step_names_round_trip_through_config() {
    let config = Config::from_str("[processing]\nsteps = [\"d1\", \"rubber-band\"]").unwrap();
    assert_eq!(
        config.processing.steps,
        vec![ProcessingStep::Derivative, ProcessingStep::Baseline]
    );
}
