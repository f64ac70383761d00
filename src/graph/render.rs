//! Rendering - draws the element graph with egui::Painter
//!
//! Positions are graph space. `render` translates them by a fixed offset;
//! `render_view` maps them through a [`Camera2D`] and scales sizes with its
//! zoom. Edges first (line, arrow head, amount label), then nodes on top.

use egui::{Color32, FontId, Pos2, Rect, Stroke, Vec2};

use super::camera::Camera2D;
use super::selection::SelectionState;
use super::style::{EdgeRule, StyleSheet};
use super::types::ElementGraph;

/// Labels smaller than this on screen are skipped
const MIN_LABEL_SIZE: f32 = 5.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphRenderer;

impl GraphRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the whole graph.
    ///
    /// `positions` is aligned with `graph.nodes`; nodes without a position
    /// (and edges touching them) are skipped.
    pub fn render(
        &self,
        painter: &egui::Painter,
        graph: &ElementGraph,
        positions: &[Pos2],
        selection: &SelectionState,
        stylesheet: &StyleSheet,
        offset: Vec2,
    ) {
        draw(painter, graph, positions, selection, stylesheet, |p| p + offset, 1.0);
    }

    /// Draw through a camera into `screen_rect`.
    #[allow(clippy::too_many_arguments)]
    pub fn render_view(
        &self,
        painter: &egui::Painter,
        graph: &ElementGraph,
        positions: &[Pos2],
        selection: &SelectionState,
        stylesheet: &StyleSheet,
        camera: &Camera2D,
        screen_rect: Rect,
    ) {
        draw(
            painter,
            graph,
            positions,
            selection,
            stylesheet,
            |p| camera.world_to_screen(p, screen_rect),
            camera.zoom(),
        );
    }
}

fn draw(
    painter: &egui::Painter,
    graph: &ElementGraph,
    positions: &[Pos2],
    selection: &SelectionState,
    stylesheet: &StyleSheet,
    to_screen: impl Fn(Pos2) -> Pos2,
    scale: f32,
) {
    for edge in &graph.edges {
        let (Some(si), Some(ti)) = (
            graph.node_position_index(&edge.source),
            graph.node_position_index(&edge.target),
        ) else {
            continue;
        };
        let (Some(&from), Some(&to)) = (positions.get(si), positions.get(ti)) else {
            continue;
        };
        if si == ti {
            continue;
        }

        let target_radius = stylesheet
            .node_style(&graph.nodes[ti], selection.is_selected(&edge.target))
            .size
            / 2.0;
        render_edge(
            painter,
            to_screen(from),
            to_screen(to),
            target_radius * scale,
            &edge.label,
            &stylesheet.edge,
            scale,
        );
    }

    let label_size = stylesheet.node_label_size * scale;
    for (node, &pos) in graph.nodes.iter().zip(positions) {
        let style = stylesheet.node_style(node, selection.is_selected(&node.id));
        let center = to_screen(pos);
        let radius = style.size / 2.0 * scale;

        painter.circle_filled(center, radius, style.fill);
        painter.circle_stroke(
            center,
            radius,
            Stroke::new(style.border_width * scale, style.border_color),
        );
        if label_size >= MIN_LABEL_SIZE {
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                &node.label,
                FontId::monospace(label_size),
                stylesheet.node_label_color,
            );
        }
    }
}

fn render_edge(
    painter: &egui::Painter,
    from: Pos2,
    to: Pos2,
    target_radius: f32,
    label: &str,
    rule: &EdgeRule,
    scale: f32,
) {
    let delta = to - from;
    if delta.length() <= f32::EPSILON {
        return;
    }
    let dir = delta.normalized();
    let tip = to - dir * target_radius;

    painter.line_segment([from, tip], Stroke::new(rule.width * scale, rule.line_color));
    render_arrow_head(painter, tip, dir, rule.arrow_size * scale, rule.arrow_color);

    let label_size = rule.label_size * scale;
    if rule.show_label && !label.is_empty() && label_size >= MIN_LABEL_SIZE {
        render_edge_label(painter, from + delta * 0.5, label, label_size, rule);
    }
}

fn render_arrow_head(painter: &egui::Painter, tip: Pos2, dir: Vec2, size: f32, color: Color32) {
    let perp = Vec2::new(-dir.y, dir.x);
    let p2 = tip - dir * size + perp * size * 0.5;
    let p3 = tip - dir * size - perp * size * 0.5;
    painter.add(egui::Shape::convex_polygon(
        vec![tip, p2, p3],
        color,
        Stroke::NONE,
    ));
}

/// Amount label on a background pill at the edge midpoint
fn render_edge_label(
    painter: &egui::Painter,
    position: Pos2,
    label: &str,
    size: f32,
    rule: &EdgeRule,
) {
    let galley = painter.layout_no_wrap(
        label.to_string(),
        FontId::monospace(size),
        rule.label_color,
    );
    let padding = Vec2::splat(2.0);
    let rect = egui::Rect::from_center_size(position, galley.size() + padding * 2.0);
    painter.rect_filled(rect, 2.0, rule.label_background);
    painter.galley(rect.min + padding, galley, rule.label_color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphElementBuilder;
    use crate::graph::rings::RingMembershipIndex;
    use crate::graph::types::{Account, Transaction};

    #[test]
    fn draws_shapes_headless() {
        let out = GraphElementBuilder::new().build(
            &[Account::new("A", 90.0), Account::new("B", 10.0)],
            &[Transaction::new("A", "B", 250.0)],
            &RingMembershipIndex::new(),
        );
        let positions = vec![Pos2::new(40.0, 40.0), Pos2::new(200.0, 40.0)];

        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                GraphRenderer::new().render(
                    ui.painter(),
                    &out.graph,
                    &positions,
                    &SelectionState::Unselected,
                    &StyleSheet::default(),
                    Vec2::ZERO,
                );
            });
        });

        // Panel background, edge line/arrow/label pill/text, two nodes x 3
        assert!(output.shapes.len() >= 10);
    }

    #[test]
    fn missing_positions_are_skipped() {
        let out = GraphElementBuilder::new().build(
            &[Account::new("A", 90.0), Account::new("B", 10.0)],
            &[Transaction::new("A", "B", 250.0)],
            &RingMembershipIndex::new(),
        );

        let ctx = egui::Context::default();
        let baseline = ctx.run(egui::RawInput::default(), |_| {});
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            GraphRenderer::new().render(
                &ctx.layer_painter(egui::LayerId::background()),
                &out.graph,
                &[],
                &SelectionState::Unselected,
                &StyleSheet::default(),
                Vec2::ZERO,
            );
        });
        assert_eq!(output.shapes.len(), baseline.shapes.len());
    }

    #[test]
    fn zoomed_out_view_drops_labels() {
        let out = GraphElementBuilder::new().build(
            &[Account::new("A", 90.0), Account::new("B", 10.0)],
            &[Transaction::new("A", "B", 250.0)],
            &RingMembershipIndex::new(),
        );
        let positions = vec![Pos2::new(40.0, 40.0), Pos2::new(2000.0, 40.0)];
        let screen = Rect::from_min_size(Pos2::ZERO, Vec2::new(400.0, 300.0));

        let count = |zoom_factor: f32| {
            let mut camera = Camera2D::new();
            camera.zoom_at(zoom_factor, screen.center(), screen);
            let ctx = egui::Context::default();
            let baseline = ctx.run(egui::RawInput::default(), |_| {});
            let output = ctx.run(egui::RawInput::default(), |ctx| {
                GraphRenderer::new().render_view(
                    &ctx.layer_painter(egui::LayerId::background()),
                    &out.graph,
                    &positions,
                    &SelectionState::Unselected,
                    &StyleSheet::default(),
                    &camera,
                    screen,
                );
            });
            output.shapes.len() - baseline.shapes.len()
        };

        // Edge label pill + text and the two node labels disappear
        let full = count(1.0);
        let zoomed_out = count(0.2);
        assert!(zoomed_out >= 6);
        assert_eq!(full - zoomed_out, 4);
    }
}
