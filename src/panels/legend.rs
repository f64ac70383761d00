//! Legend strip and graph header
//!
//! Tier swatches come from `risk::legend()`, so the ranges shown here follow
//! the thresholds without restating them.

use egui::{Color32, RichText, Stroke, Ui, Vec2};

use crate::graph::risk::{legend, LegendEntry};

const SWATCH_SIZE: f32 = 10.0;

/// Header line above the graph, e.g. `12 accounts · 30 transactions`
pub fn graph_summary_text(accounts: usize, transactions: usize) -> String {
    format!(
        "{} account{} · {} transaction{}",
        accounts,
        if accounts == 1 { "" } else { "s" },
        transactions,
        if transactions == 1 { "" } else { "s" },
    )
}

/// One row of swatches with their labels
pub fn legend_strip(ui: &mut Ui) {
    ui.horizontal_wrapped(|ui| {
        for entry in legend() {
            legend_item(ui, &entry);
            ui.add_space(8.0);
        }
    });
}

fn legend_item(ui: &mut Ui, entry: &LegendEntry) {
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(SWATCH_SIZE), egui::Sense::hover());
    let painter = ui.painter();
    let radius = SWATCH_SIZE / 2.0;
    if entry.border {
        painter.circle(rect.center(), radius - 1.0, Color32::TRANSPARENT, Stroke::new(2.0, entry.color));
    } else {
        painter.circle_filled(rect.center(), radius, entry.color);
    }
    ui.label(RichText::new(&entry.label).small().monospace());
}
