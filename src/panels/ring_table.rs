//! Fraud ring table
//!
//! One row per detected ring, riskiest first, with a short member preview.

use egui::{RichText, Ui};

use crate::graph::risk::{style_for_score, TierStyle};
use crate::graph::types::{FraudRing, PatternType};

pub const EMPTY_TABLE_MESSAGE: &str = "No fraud rings detected";

/// Glyph shown next to the pattern name
pub fn pattern_icon(pattern: PatternType) -> &'static str {
    match pattern {
        PatternType::Cycle => "↺",
        PatternType::Smurfing | PatternType::FanOut => "⇉",
        PatternType::FanIn => "⇇",
        PatternType::ShellChain => "⛓",
        PatternType::Other => "◈",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingRow {
    pub ring_id: String,
    pub pattern: PatternType,
    pub pattern_icon: &'static str,
    pub member_count: usize,
    pub member_preview: Vec<String>,
    /// Members not in the preview
    pub overflow: usize,
    pub risk_score: f64,
    pub risk: TierStyle,
}

impl RingRow {
    /// `+N more`, if anything was cut
    pub fn overflow_text(&self) -> Option<String> {
        (self.overflow > 0).then(|| format!("+{} more", self.overflow))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingTable {
    pub rows: Vec<RingRow>,
}

impl RingTable {
    /// Rows sorted by risk score, highest first; ties keep input order.
    pub fn build(rings: &[FraudRing], preview_limit: usize) -> Self {
        let mut rows: Vec<RingRow> = rings
            .iter()
            .map(|ring| {
                let member_count = ring.member_accounts.len();
                let preview: Vec<String> = ring
                    .member_accounts
                    .iter()
                    .take(preview_limit)
                    .cloned()
                    .collect();
                RingRow {
                    ring_id: ring.ring_id.clone(),
                    pattern: ring.pattern_type,
                    pattern_icon: pattern_icon(ring.pattern_type),
                    member_count,
                    overflow: member_count - preview.len(),
                    member_preview: preview,
                    risk_score: ring.risk_score,
                    risk: style_for_score(ring.risk_score),
                }
            })
            .collect();

        rows.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `"3 rings found"` / `"1 ring found"`
    pub fn heading(&self) -> String {
        let n = self.rows.len();
        format!("{} ring{} found", n, if n == 1 { "" } else { "s" })
    }
}

/// Render the ring table
pub fn ring_table_panel(ui: &mut Ui, table: &RingTable) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("Fraud Rings").strong());
        if !table.is_empty() {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(table.heading()).small());
            });
        }
    });
    ui.separator();

    if table.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(12.0);
            ui.label(RichText::new(EMPTY_TABLE_MESSAGE).monospace().weak());
        });
        return;
    }

    egui::ScrollArea::horizontal().show(ui, |ui| {
        egui::Grid::new("fraud_ring_table")
            .striped(true)
            .num_columns(5)
            .show(ui, |ui| {
                for header in ["Ring ID", "Pattern", "Members", "Account IDs", "Risk Score"] {
                    ui.label(RichText::new(header).small().weak());
                }
                ui.end_row();

                for row in &table.rows {
                    ui.label(RichText::new(&row.ring_id).monospace().small());
                    ui.label(
                        RichText::new(format!("{} {}", row.pattern_icon, row.pattern))
                            .monospace()
                            .small(),
                    );
                    ui.label(RichText::new(row.member_count.to_string()).monospace());
                    ui.horizontal_wrapped(|ui| {
                        for member in &row.member_preview {
                            ui.label(RichText::new(member).monospace().small());
                        }
                        if let Some(more) = row.overflow_text() {
                            ui.label(RichText::new(more).small().weak());
                        }
                    });
                    ui.label(
                        RichText::new(row.risk_score.to_string())
                            .monospace()
                            .color(row.risk.color)
                            .background_color(row.risk.background),
                    );
                    ui.end_row();
                }
            });
    });
}
