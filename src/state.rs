use std::path::Path;

use rusty_spectra::data::model::{Curve, CurveId, Peak, SequentialIds};
use rusty_spectra::processing::{algebra, interpolate, peaks, ProcessingStep};
use rusty_spectra::{color, Config, DecoderRegistry};

const DERIVED_PALETTE_SIZE: usize = 12;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Binary curve operations offered in the compare section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Difference,
    Sum,
    Residual,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,

    /// Decoders chosen at startup from the `[loader]` config table.
    pub registry: DecoderRegistry,

    /// Id source for every curve created this session.
    pub ids: SequentialIds,

    /// Loaded and derived curves, in insertion order.
    pub curves: Vec<Curve>,

    /// Curve the processing buttons act on.
    pub selected: Option<CurveId>,

    /// Second operand for comparisons.
    pub reference: Option<CurveId>,

    /// Peaks found on the most recent detection run.
    pub peaks: Vec<Peak>,

    pub show_peaks: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let registry = DecoderRegistry::new(config.loader.text_decoding);
        Self {
            config,
            registry,
            ids: SequentialIds::new(),
            curves: Vec::new(),
            selected: None,
            reference: None,
            peaks: Vec::new(),
            show_peaks: true,
            status_message: None,
        }
    }

    pub fn curve(&self, id: CurveId) -> Option<&Curve> {
        find(&self.curves, Some(id))
    }

    pub fn selected_curve(&self) -> Option<&Curve> {
        find(&self.curves, self.selected)
    }

    pub fn visible_curves(&self) -> impl Iterator<Item = &Curve> {
        self.curves.iter().filter(|c| c.style.visible)
    }

    /// Load a file and append its curves; the first becomes selected.
    pub fn load_path(&mut self, path: &Path) {
        match self.registry.load_file(path, &mut self.ids) {
            Ok(curves) => {
                if let Some(first) = curves.first() {
                    self.selected = Some(first.id);
                }
                self.curves.extend(curves);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Append a derived curve with its own colour and select it.
    fn push_derived(&mut self, mut curve: Curve) {
        let palette = color::generate_palette(DERIVED_PALETTE_SIZE);
        curve.style.color = Some(color::to_hex(palette[self.curves.len() % DERIVED_PALETTE_SIZE]));
        self.selected = Some(curve.id);
        self.curves.push(curve);
    }

    pub fn apply_step(&mut self, step: ProcessingStep) {
        let Some(source) = find(&self.curves, self.selected) else {
            self.status_message = Some("Select a curve first".into());
            return;
        };
        let derived = step.apply(source, &mut self.ids);
        self.push_derived(derived);
    }

    /// Run peak detection on the selected curve with the configured parameters.
    pub fn detect_peaks(&mut self) {
        let Some(curve) = find(&self.curves, self.selected) else {
            self.peaks.clear();
            return;
        };
        self.peaks = peaks::detect_curve(curve, &self.config.peaks);
        self.status_message = Some(format!("{} peak(s) in {}", self.peaks.len(), curve.label));
    }

    pub fn compare(&mut self, op: CompareOp) {
        let (Some(a), Some(b)) = (find(&self.curves, self.selected), find(&self.curves, self.reference))
        else {
            self.status_message = Some("Select a curve and a reference".into());
            return;
        };
        let r = algebra::correlation(a, b);
        let derived = match op {
            CompareOp::Difference => algebra::difference(a, b, &mut self.ids),
            CompareOp::Sum => algebra::sum(a, b, &mut self.ids),
            CompareOp::Residual => algebra::residual(a, b, &mut self.ids),
        };
        self.status_message = Some(format!("r = {r:.4}"));
        self.push_derived(derived);
    }

    /// Resample the reference curve onto the selected curve's x-axis.
    pub fn align_reference(&mut self) {
        let (Some(target), Some(source)) =
            (find(&self.curves, self.selected), find(&self.curves, self.reference))
        else {
            return;
        };
        let grid = target.x_prefix(target.len());
        let derived = interpolate::interpolate_to_grid(source, &grid, &mut self.ids);
        self.push_derived(derived);
    }

    /// Mean of all visible curves.
    pub fn average_visible(&mut self) {
        let visible: Vec<Curve> = self.visible_curves().cloned().collect();
        if let Some(mean) = algebra::average(&visible, &mut self.ids) {
            self.push_derived(mean);
        }
    }

    pub fn remove(&mut self, id: CurveId) {
        self.curves.retain(|c| c.id != id);
        self.peaks.retain(|p| p.curve_id != Some(id));
        if self.selected == Some(id) {
            self.selected = self.curves.last().map(|c| c.id);
        }
        if self.reference == Some(id) {
            self.reference = None;
        }
    }

    pub fn clear(&mut self) {
        self.curves.clear();
        self.peaks.clear();
        self.selected = None;
        self.reference = None;
    }
}

fn find(curves: &[Curve], id: Option<CurveId>) -> Option<&Curve> {
    let id = id?;
    curves.iter().find(|c| c.id == id)
}
