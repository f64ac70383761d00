//! Account detail panel
//!
//! Shows the selected account: id, tier badge, score bar, ring badge and
//! detector flags. Read-only; driven entirely by the current selection.

use egui::{Color32, RichText, Ui};

use crate::graph::risk::{color_for, ring_member_border, style_for, RiskTier, TierStyle, MAX_SCORE, MIN_SCORE};
use crate::graph::style::flag_color;
use crate::graph::{RingMembershipIndex, SelectionState};

pub const EMPTY_DETAIL_PROMPT: &str = "Click any node to inspect";

/// Shown for accounts that only appear as a transaction endpoint
pub const PLACEHOLDER_NOTE: &str = "Not in analysis result";

/// Score text for placeholders, which carry no score
pub const NO_SCORE_TEXT: &str = "n/a";

#[derive(Debug, Clone, PartialEq)]
pub struct FlagBadge {
    pub flag: String,
    pub color: Color32,
}

/// Everything the detail panel shows for one account
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDetail {
    pub account_id: String,
    pub risk: TierStyle,
    /// e.g. `85/100`
    pub score_text: String,
    /// Bar fill, 0.0 - 1.0
    pub score_fraction: f32,
    /// Account missing from the snapshot, drawn as an `Unknown` node
    pub placeholder: bool,
    pub in_ring: bool,
    pub ring_ids: Vec<String>,
    pub flags: Vec<FlagBadge>,
}

impl AccountDetail {
    /// `None` while nothing is selected.
    pub fn from_selection(selection: &SelectionState, rings: &RingMembershipIndex) -> Option<Self> {
        let account = selection.selected()?;
        let score = account.suspicion_score;

        let fraction = if score.is_nan() || account.placeholder {
            0.0
        } else {
            ((score - MIN_SCORE) / (MAX_SCORE - MIN_SCORE)).clamp(0.0, 1.0) as f32
        };
        let score_text = if account.placeholder {
            NO_SCORE_TEXT.to_string()
        } else {
            format!("{}/{}", score, MAX_SCORE)
        };

        Some(Self {
            account_id: account.id.clone(),
            risk: style_for(account.tier),
            score_text,
            score_fraction: fraction,
            placeholder: account.placeholder,
            in_ring: account.in_ring,
            ring_ids: rings.rings_for(&account.id).to_vec(),
            flags: account
                .flags
                .iter()
                .map(|flag| FlagBadge {
                    flag: flag.clone(),
                    color: flag_color(flag),
                })
                .collect(),
        })
    }
}

/// Render the detail panel
pub fn account_detail_panel(ui: &mut Ui, detail: Option<&AccountDetail>) {
    ui.label(RichText::new("Node Details").strong());
    ui.separator();

    let Some(detail) = detail else {
        ui.vertical_centered(|ui| {
            ui.add_space(12.0);
            ui.label(RichText::new(EMPTY_DETAIL_PROMPT).monospace().weak());
        });
        return;
    };

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(RichText::new("ACCOUNT ID").small().weak());
            ui.label(RichText::new(&detail.account_id).monospace().heading());
            if detail.placeholder {
                ui.label(
                    RichText::new(PLACEHOLDER_NOTE)
                        .small()
                        .italics()
                        .color(color_for(RiskTier::Unknown)),
                );
            }
            if detail.in_ring {
                ui.label(RichText::new("In Fraud Ring").small().color(ring_member_border()));
            }
        });
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
            badge(ui, detail.risk.label, detail.risk.color, detail.risk.background);
        });
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Suspicion Score").small().weak());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(&detail.score_text).monospace().color(detail.risk.color));
        });
    });
    ui.add(
        egui::ProgressBar::new(detail.score_fraction)
            .fill(detail.risk.color)
            .desired_height(6.0),
    );

    if !detail.ring_ids.is_empty() {
        ui.add_space(8.0);
        ui.label(RichText::new("Rings").small().weak());
        ui.horizontal_wrapped(|ui| {
            for ring_id in &detail.ring_ids {
                ui.label(RichText::new(ring_id).monospace().small());
            }
        });
    }

    if !detail.flags.is_empty() {
        ui.add_space(8.0);
        ui.label(RichText::new("Detection Flags").small().weak());
        ui.horizontal_wrapped(|ui| {
            for badge_data in &detail.flags {
                badge(
                    ui,
                    &badge_data.flag,
                    badge_data.color,
                    badge_data.color.gamma_multiply(0.12),
                );
            }
        });
    }
}

fn badge(ui: &mut Ui, text: &str, color: Color32, background: Color32) {
    egui::Frame::none()
        .fill(background)
        .stroke(egui::Stroke::new(1.0, color.gamma_multiply(0.4)))
        .rounding(4.0)
        .inner_margin(egui::Margin::symmetric(6.0, 2.0))
        .show(ui, |ui| {
            ui.label(RichText::new(text).monospace().small().color(color));
        });
}
