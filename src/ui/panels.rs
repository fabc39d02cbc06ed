use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use rusty_spectra::color;
use rusty_spectra::data::model::CurveId;
use rusty_spectra::processing::ProcessingStep;

use crate::state::{AppState, CompareOp};

// ---------------------------------------------------------------------------
// Left side panel – curve list and processing
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Curves");
    ui.separator();

    if state.curves.is_empty() {
        ui.label("No curves loaded.");
        return;
    }

    let mut removed: Option<CurveId> = None;
    ScrollArea::vertical()
        .id_salt("curve_list")
        .max_height(ui.available_height() * 0.5)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for curve in &mut state.curves {
                ui.horizontal(|ui: &mut Ui| {
                    ui.checkbox(&mut curve.style.visible, "");

                    let mut text = RichText::new(&curve.label);
                    if let Some([r, g, b]) = curve.style.color.as_deref().and_then(color::parse_hex) {
                        text = text.color(Color32::from_rgb(r, g, b));
                    }
                    let is_selected = state.selected == Some(curve.id);
                    if ui
                        .selectable_label(is_selected, text)
                        .on_hover_text(format!("{} · {} samples", curve.id, curve.len()))
                        .clicked()
                    {
                        state.selected = Some(curve.id);
                    }
                    if ui.small_button("✕").clicked() {
                        removed = Some(curve.id);
                    }
                });
            }
        });
    if let Some(id) = removed {
        state.remove(id);
    }

    ui.separator();
    processing_section(ui, state);
    ui.separator();
    compare_section(ui, state);
}

fn processing_section(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Processing");
    let window = state.config.processing.smoothing_window;
    let steps = [
        ("Baseline", ProcessingStep::Baseline),
        ("Min-max", ProcessingStep::MinMax),
        ("Area", ProcessingStep::Area),
        ("SNV", ProcessingStep::Snv),
        ("Smooth", ProcessingStep::Smooth { window }),
        ("1st derivative", ProcessingStep::Derivative),
        ("2nd derivative", ProcessingStep::SecondDerivative),
    ];
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, step) in steps {
            if ui.button(label).clicked() {
                state.apply_step(step);
            }
        }
    });

    ui.add_space(4.0);
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Prominence");
        ui.add(
            egui::DragValue::new(&mut state.config.peaks.prominence)
                .speed(0.005)
                .range(0.0..=1.0),
        );
        ui.label("Distance");
        ui.add(egui::DragValue::new(&mut state.config.peaks.min_distance).range(1..=1000));
    });
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Find peaks").clicked() {
            state.detect_peaks();
        }
        ui.checkbox(&mut state.show_peaks, "Show peaks");
    });
}

fn compare_section(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Compare");
    let reference_label = state
        .reference
        .and_then(|id| state.curve(id))
        .map(|c| c.label.clone())
        .unwrap_or_else(|| "(reference)".into());

    let mut chosen = state.reference;
    egui::ComboBox::from_id_salt("reference_curve")
        .selected_text(reference_label)
        .show_ui(ui, |ui: &mut Ui| {
            for curve in &state.curves {
                ui.selectable_value(&mut chosen, Some(curve.id), &curve.label);
            }
        });
    state.reference = chosen;

    ui.horizontal_wrapped(|ui: &mut Ui| {
        if ui.button("A − B").clicked() {
            state.compare(CompareOp::Difference);
        }
        if ui.button("A + B").clicked() {
            state.compare(CompareOp::Sum);
        }
        if ui.button("|A − B|").clicked() {
            state.compare(CompareOp::Residual);
        }
        if ui.button("Align B to A").clicked() {
            state.align_reference();
        }
        if ui.button("Average visible").clicked() {
            state.average_visible();
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Clear").clicked() {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} curves loaded, {} visible",
            state.curves.len(),
            state.visible_curves().count()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let extensions = state.registry.extensions();
    let files = rfd::FileDialog::new()
        .set_title("Open spectral data")
        .add_filter("Supported files", extensions.as_slice())
        .add_filter("SPC", &["spc"])
        .pick_files();

    for path in files.into_iter().flatten() {
        state.load_path(&path);
    }
}
