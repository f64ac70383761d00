//! Risk tiers and their color palette
//!
//! The only place that knows the tier boundaries. Node fill, the detail
//! panel badge, the ring table and the legend all go through
//! [`classify`] / [`style_for`], so they cannot drift apart.

use egui::Color32;
use serde::Serialize;

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Lowest score that counts as HIGH risk.
pub const HIGH_RISK_THRESHOLD: f64 = 71.0;

/// Lowest score that counts as MEDIUM risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 41.0;

/// Score range accepted from upstream; anything outside is clamped.
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

// =============================================================================
// RISK TIER
// =============================================================================

/// Coarse risk bucket derived from a suspicion score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    /// Placeholder nodes only; [`classify`] never returns this.
    Unknown,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
            RiskTier::Unknown => "UNKNOWN",
        }
    }

    /// The three tiers a real score can land in, lowest first
    pub fn scored() -> &'static [RiskTier] {
        &[RiskTier::Low, RiskTier::Medium, RiskTier::High]
    }
}

impl std::str::FromStr for RiskTier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            _ => Self::Unknown,
        })
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a suspicion score to its tier.
///
/// Out-of-range scores clamp to the nearest boundary tier; NaN counts as 0.
pub fn classify(score: f64) -> RiskTier {
    let score = if score.is_nan() {
        MIN_SCORE
    } else {
        score.clamp(MIN_SCORE, MAX_SCORE)
    };

    if score >= HIGH_RISK_THRESHOLD {
        RiskTier::High
    } else if score >= MEDIUM_RISK_THRESHOLD {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

// =============================================================================
// COLORS
// =============================================================================

/// Base color for a tier
pub fn color_for(tier: RiskTier) -> Color32 {
    match tier {
        RiskTier::High => Color32::from_rgb(239, 68, 68),     // Red-500
        RiskTier::Medium => Color32::from_rgb(234, 179, 8),   // Yellow-500
        RiskTier::Low => Color32::from_rgb(34, 197, 94),      // Green-500
        RiskTier::Unknown => Color32::from_rgb(148, 163, 184), // Slate-400
    }
}

/// Badge/panel styling for a tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierStyle {
    pub label: &'static str,
    pub color: Color32,
    pub background: Color32,
    pub border: Color32,
}

pub fn style_for(tier: RiskTier) -> TierStyle {
    let color = color_for(tier);
    let label = match tier {
        RiskTier::High => "HIGH RISK",
        RiskTier::Medium => "MEDIUM RISK",
        RiskTier::Low => "LOW RISK",
        RiskTier::Unknown => "UNKNOWN",
    };
    TierStyle {
        label,
        color,
        background: with_alpha(color, 0.10),
        border: with_alpha(color, 0.30),
    }
}

/// Shorthand for `style_for(classify(score))`
pub fn style_for_score(score: f64) -> TierStyle {
    style_for(classify(score))
}

fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (alpha * 255.0).round() as u8,
    )
}

// =============================================================================
// LEGEND
// =============================================================================

/// Border color used to emphasise fraud-ring members
pub fn ring_member_border() -> Color32 {
    Color32::from_rgb(255, 68, 68)
}

/// Border color for the selected node
pub fn selection_highlight() -> Color32 {
    Color32::from_rgb(0, 255, 200)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color32,
    /// Drawn as a ring border swatch rather than a fill
    pub border: bool,
}

/// Legend strip entries, ranges derived from the thresholds
pub fn legend() -> Vec<LegendEntry> {
    let low_max = MEDIUM_RISK_THRESHOLD - 1.0;
    let medium_max = HIGH_RISK_THRESHOLD - 1.0;
    vec![
        LegendEntry {
            label: format!("Low Risk ({}-{})", MIN_SCORE, low_max),
            color: color_for(RiskTier::Low),
            border: false,
        },
        LegendEntry {
            label: format!("Medium Risk ({}-{})", MEDIUM_RISK_THRESHOLD, medium_max),
            color: color_for(RiskTier::Medium),
            border: false,
        },
        LegendEntry {
            label: format!("High Risk ({}-{})", HIGH_RISK_THRESHOLD, MAX_SCORE),
            color: color_for(RiskTier::High),
            border: false,
        },
        LegendEntry {
            label: "In Fraud Ring".to_string(),
            color: ring_member_border(),
            border: true,
        },
    ]
}

// =============================================================================
// TESTS
// =============================================================================
