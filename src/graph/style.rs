//! Declarative style rules handed to the render surface
//!
//! Cascade for nodes: base → ring member → selected, later rules override
//! size and border. Fill always comes from the risk tier.

use egui::Color32;

use super::risk::{color_for, ring_member_border, selection_highlight};
use super::types::VisualNode;

/// Size/border override for one node rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRule {
    /// Diameter in points
    pub size: f32,
    pub border_width: f32,
    /// `None` = use the tier color
    pub border_color: Option<Color32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRule {
    pub width: f32,
    pub line_color: Color32,
    pub arrow_color: Color32,
    pub arrow_size: f32,
    pub show_label: bool,
    pub label_size: f32,
    pub label_color: Color32,
    pub label_background: Color32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleSheet {
    pub node: NodeRule,
    pub ring_member: NodeRule,
    pub selected: NodeRule,
    /// Opacity of the tier-colored base border
    pub base_border_opacity: f32,
    pub node_label_size: f32,
    pub node_label_color: Color32,
    pub edge: EdgeRule,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            node: NodeRule {
                size: 42.0,
                border_width: 2.0,
                border_color: None,
            },
            ring_member: NodeRule {
                size: 50.0,
                border_width: 3.0,
                border_color: Some(ring_member_border()),
            },
            selected: NodeRule {
                size: 54.0,
                border_width: 3.0,
                border_color: Some(selection_highlight()),
            },
            base_border_opacity: 0.8,
            node_label_size: 10.0,
            node_label_color: Color32::WHITE,
            edge: EdgeRule {
                width: 1.5,
                line_color: Color32::from_rgba_unmultiplied(0, 255, 200, 77),
                arrow_color: Color32::from_rgba_unmultiplied(0, 255, 200, 153),
                arrow_size: 8.0,
                show_label: true,
                label_size: 8.0,
                label_color: Color32::from_rgba_unmultiplied(200, 230, 255, 166),
                label_background: Color32::from_rgba_unmultiplied(2, 11, 24, 217),
            },
        }
    }
}

/// Resolved style for one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub size: f32,
    pub fill: Color32,
    pub border_width: f32,
    pub border_color: Color32,
}

impl StyleSheet {
    pub fn node_style(&self, node: &VisualNode, selected: bool) -> NodeStyle {
        let fill = color_for(node.tier);
        let base_border = Color32::from_rgba_unmultiplied(
            fill.r(),
            fill.g(),
            fill.b(),
            (self.base_border_opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
        );

        let mut style = NodeStyle {
            size: self.node.size,
            fill,
            border_width: self.node.border_width,
            border_color: self.node.border_color.unwrap_or(base_border),
        };

        let mut apply = |rule: &NodeRule| {
            style.size = rule.size;
            style.border_width = rule.border_width;
            if let Some(color) = rule.border_color {
                style.border_color = color;
            }
        };
        if node.in_ring {
            apply(&self.ring_member);
        }
        if selected {
            apply(&self.selected);
        }
        style
    }

    /// Largest diameter any node can take
    pub fn max_node_size(&self) -> f32 {
        self.node
            .size
            .max(self.ring_member.size)
            .max(self.selected.size)
    }
}

/// Badge color for a detector flag
pub fn flag_color(flag: &str) -> Color32 {
    match flag {
        "cycle_length_3" | "cycle_length_4" | "cycle_length_5" => Color32::from_rgb(248, 113, 113),
        "fan_out" => Color32::from_rgb(251, 146, 60),
        "fan_in" => Color32::from_rgb(167, 139, 250),
        "shell_account" => Color32::from_rgb(96, 165, 250),
        "high_velocity" => Color32::from_rgb(250, 204, 21),
        _ => Color32::from_rgb(148, 163, 184),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::risk::RiskTier;

    fn node(tier: RiskTier, in_ring: bool) -> VisualNode {
        VisualNode {
            id: "A".into(),
            label: "A".into(),
            tier,
            in_ring,
            suspicion_score: 0.0,
            flags: vec![],
            placeholder: false,
        }
    }

    #[test]
    fn base_node_uses_tier_color() {
        let sheet = StyleSheet::default();
        let style = sheet.node_style(&node(RiskTier::High, false), false);
        assert_eq!(style.size, 42.0);
        assert_eq!(style.fill, color_for(RiskTier::High));
        assert_eq!(style.border_width, 2.0);
        let fill = style.fill;
        assert_eq!(
            style.border_color,
            Color32::from_rgba_unmultiplied(fill.r(), fill.g(), fill.b(), 204)
        );
    }

    #[test]
    fn ring_member_emphasis() {
        let style = StyleSheet::default().node_style(&node(RiskTier::Low, true), false);
        assert_eq!(style.size, 50.0);
        assert_eq!(style.border_width, 3.0);
        assert_eq!(style.border_color, ring_member_border());
        assert_eq!(style.fill, color_for(RiskTier::Low));
    }

    #[test]
    fn selection_overrides_ring() {
        let style = StyleSheet::default().node_style(&node(RiskTier::Medium, true), true);
        assert_eq!(style.size, 54.0);
        assert_eq!(style.border_color, selection_highlight());
        assert_eq!(StyleSheet::default().max_node_size(), 54.0);
    }

    #[test]
    fn flag_palette() {
        assert_eq!(flag_color("cycle_length_4"), flag_color("cycle_length_3"));
        assert_eq!(flag_color("fan_in"), Color32::from_rgb(167, 139, 250));
        assert_eq!(flag_color("high_volume_merchant"), flag_color("whatever"));
    }
}
