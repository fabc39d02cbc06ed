use eframe::egui::{Color32, Ui};
use egui_plot::{Line, Plot, PlotPoint, PlotPoints, PlotUi, Points, Text};

use rusty_spectra::color;
use rusty_spectra::data::model::{Curve, LineStyle};
use rusty_spectra::view::{binary_search_closest, render_window, visible_range, LinearPixelMap};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Spectral plot (central panel)
// ---------------------------------------------------------------------------

fn curve_color(curve: &Curve) -> Color32 {
    curve
        .style
        .color
        .as_deref()
        .and_then(color::parse_hex)
        .map(|[r, g, b]| Color32::from_rgb(r, g, b))
        .unwrap_or(Color32::LIGHT_BLUE)
}

fn line_style(style: LineStyle) -> egui_plot::LineStyle {
    match style {
        LineStyle::Solid => egui_plot::LineStyle::Solid,
        LineStyle::Dashed => egui_plot::LineStyle::dashed_loose(),
        LineStyle::Dotted => egui_plot::LineStyle::dotted_loose(),
    }
}

/// Finite `(min, max)` over all visible samples of both axes.
fn data_bounds<'a>(curves: impl Iterator<Item = &'a Curve>) -> Option<([f64; 2], [f64; 2])> {
    let mut bounds: Option<([f64; 2], [f64; 2])> = None;
    for curve in curves {
        let (x, y) = curve.samples();
        for (&xi, &yi) in x.iter().zip(y) {
            if !(xi.is_finite() && yi.is_finite()) {
                continue;
            }
            let b = bounds.get_or_insert(([xi, yi], [xi, yi]));
            b.0 = [b.0[0].min(xi), b.0[1].min(yi)];
            b.1 = [b.1[0].max(xi), b.1[1].max(yi)];
        }
    }
    bounds
}

/// Render the spectral plot in the central panel.
pub fn spectral_plot(ui: &mut Ui, state: &AppState) {
    if state.curves.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view spectra  (File → Open…)");
        });
        return;
    }

    let (x_label, y_label) = state
        .selected_curve()
        .map(|c| {
            (
                c.x_unit.clone().unwrap_or_else(|| "x".into()),
                c.y_unit.clone().unwrap_or_else(|| "Intensity".into()),
            )
        })
        .unwrap_or_else(|| ("x".into(), "Intensity".into()));

    let size = ui.available_size();
    let mut plot = Plot::new("spectral_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    // Auto-bounds cover every visible sample, not just the last drawn window.
    if let Some((min, max)) = data_bounds(state.visible_curves()) {
        plot = plot.include_x(min[0]).include_x(max[0]).include_y(min[1]).include_y(max[1]);
    }

    plot.show(ui, |plot_ui| {
        let bounds = plot_ui.plot_bounds();
        let (min, max) = (bounds.min(), bounds.max());
        let map_x = LinearPixelMap::horizontal(min[0], max[0], f64::from(size.x));
        let map_y = LinearPixelMap::vertical(min[1], max[1], f64::from(size.y));

        for curve in state.visible_curves() {
            let (x, y) = curve.samples();
            let window = visible_range(x, min[0], max[0]);
            let points: PlotPoints = render_window(curve, window, &map_x, &map_y, &state.config.render)
                .iter()
                .map(|p| [x[p.source_index], y[p.source_index]])
                .collect();

            let line = Line::new(points)
                .name(&curve.label)
                .color(curve_color(curve))
                .width(curve.style.line_width)
                .style(line_style(curve.style.line_style));
            plot_ui.line(line);
        }

        if state.show_peaks {
            peak_markers(plot_ui, state);
        }
        hover_marker(plot_ui, state);
    });
}

fn peak_markers(plot_ui: &mut PlotUi, state: &AppState) {
    let visible = |peak: &&rusty_spectra::Peak| {
        peak.curve_id
            .and_then(|id| state.curve(id))
            .is_some_and(|c| c.style.visible)
    };
    let marked: Vec<[f64; 2]> = state.peaks.iter().filter(visible).map(|p| [p.x, p.y]).collect();
    plot_ui.points(
        Points::new(marked)
            .name("Peaks")
            .radius(3.5)
            .color(Color32::from_rgb(230, 80, 60)),
    );
    for peak in state.peaks.iter().filter(visible) {
        if let Some(label) = &peak.label {
            plot_ui.text(
                Text::new(PlotPoint::new(peak.x, peak.y), label.as_str())
                    .color(Color32::GRAY)
                    .anchor(eframe::egui::Align2::CENTER_BOTTOM),
            );
        }
    }
}

/// Snap the pointer to the nearest sample of the selected curve.
fn hover_marker(plot_ui: &mut PlotUi, state: &AppState) {
    let (Some(pointer), Some(curve)) = (plot_ui.pointer_coordinate(), state.selected_curve()) else {
        return;
    };
    if !curve.style.visible {
        return;
    }
    let (x, y) = curve.samples();
    let Some(i) = binary_search_closest(x, pointer.x) else {
        return;
    };
    plot_ui.points(
        Points::new(vec![[x[i], y[i]]])
            .radius(5.0)
            .color(curve_color(curve)),
    );
    plot_ui.text(
        Text::new(PlotPoint::new(x[i], y[i]), format!("  {:.2}, {:.4}", x[i], y[i]))
            .anchor(eframe::egui::Align2::LEFT_BOTTOM),
    );
}
