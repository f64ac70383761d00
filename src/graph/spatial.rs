//! Spatial index for tap hit testing
//!
//! R-tree (via `rstar`) over node discs and edge segments in graph space, so a
//! tap resolves in O(log n) even at the 10k edge ceiling. Nodes win over edges
//! when both are within tolerance.

use egui::Pos2;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use super::style::StyleSheet;
use super::types::ElementGraph;

/// What a pointer tap landed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapTarget {
    Node(String),
    Edge(String),
    Background,
}

// =============================================================================
// ENTRIES
// =============================================================================

/// Node disc
#[derive(Debug, Clone)]
pub struct SpatialNode {
    pub id: String,
    pub center: [f32; 2],
    pub radius: f32,
}

impl SpatialNode {
    pub fn new(id: impl Into<String>, center: [f32; 2], radius: f32) -> Self {
        Self {
            id: id.into(),
            center,
            radius,
        }
    }
}

impl RTreeObject for SpatialNode {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.center[0] - self.radius, self.center[1] - self.radius],
            [self.center[0] + self.radius, self.center[1] + self.radius],
        )
    }
}

impl PointDistance for SpatialNode {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let d = distance_to_disc(*point, self.center, self.radius);
        d * d
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        distance_to_disc(*point, self.center, self.radius) <= 0.0
    }
}

/// Edge segment between two node centers
#[derive(Debug, Clone)]
pub struct SpatialEdge {
    pub id: String,
    pub from: [f32; 2],
    pub to: [f32; 2],
}

impl RTreeObject for SpatialEdge {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.from, self.to)
    }
}

impl PointDistance for SpatialEdge {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let d = distance_to_segment(*point, self.from, self.to);
        d * d
    }
}

// =============================================================================
// INDEX
// =============================================================================

#[derive(Clone, Default)]
pub struct SpatialIndex {
    nodes: RTree<SpatialNode>,
    edges: RTree<SpatialEdge>,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("nodes", &self.nodes.size())
            .field("edges", &self.edges.size())
            .finish()
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `graph` at `positions` (aligned with `graph.nodes`). Node radii
    /// follow the unselected style, so ring members are larger targets.
    pub fn build(graph: &ElementGraph, positions: &[Pos2], style: &StyleSheet) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .zip(positions)
            .map(|(node, p)| {
                let radius = style.node_style(node, false).size / 2.0;
                SpatialNode::new(node.id.clone(), [p.x, p.y], radius)
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .filter_map(|edge| {
                let s = positions.get(graph.node_position_index(&edge.source)?)?;
                let t = positions.get(graph.node_position_index(&edge.target)?)?;
                Some(SpatialEdge {
                    id: edge.id.clone(),
                    from: [s.x, s.y],
                    to: [t.x, t.y],
                })
            })
            .collect();

        Self {
            nodes: RTree::bulk_load(nodes),
            edges: RTree::bulk_load(edges),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Resolve a tap in graph coordinates.
    pub fn hit_test(&self, point: Pos2, tolerance: f32) -> TapTarget {
        let p = [point.x, point.y];
        let search = AABB::from_corners(
            [p[0] - tolerance, p[1] - tolerance],
            [p[0] + tolerance, p[1] + tolerance],
        );

        let node = self
            .nodes
            .locate_in_envelope_intersecting(&search)
            .map(|n| (n, distance_to_disc(p, n.center, n.radius)))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((node, _)) = node {
            return TapTarget::Node(node.id.clone());
        }

        let edge = self
            .edges
            .locate_in_envelope_intersecting(&search)
            .map(|e| (e, distance_to_segment(p, e.from, e.to)))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        match edge {
            Some((edge, _)) => TapTarget::Edge(edge.id.clone()),
            None => TapTarget::Background,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.size()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.size()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.size() == 0 && self.edges.size() == 0
    }
}

/// Distance from point to disc boundary; 0 inside
fn distance_to_disc(point: [f32; 2], center: [f32; 2], radius: f32) -> f32 {
    let dx = point[0] - center[0];
    let dy = point[1] - center[1];
    ((dx * dx + dy * dy).sqrt() - radius).max(0.0)
}

fn distance_to_segment(point: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    let (abx, aby) = (b[0] - a[0], b[1] - a[1]);
    let (apx, apy) = (point[0] - a[0], point[1] - a[1]);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a[0] + abx * t - point[0], a[1] + aby * t - point[1]);
    (cx * cx + cy * cy).sqrt()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphElementBuilder;
    use crate::graph::rings::RingMembershipIndex;
    use crate::graph::types::{Account, Transaction};

    fn indexed() -> SpatialIndex {
        let out = GraphElementBuilder::new().build(
            &[Account::new("A", 10.0), Account::new("B", 20.0)],
            &[Transaction::new("A", "B", 5.0)],
            &RingMembershipIndex::new(),
        );
        let positions = [Pos2::new(0.0, 0.0), Pos2::new(200.0, 0.0)];
        SpatialIndex::build(&out.graph, &positions, &StyleSheet::default())
    }

    #[test]
    fn tap_inside_node() {
        let index = indexed();
        assert_eq!(index.hit_test(Pos2::new(5.0, 5.0), 4.0), TapTarget::Node("A".into()));
        assert_eq!(index.hit_test(Pos2::new(198.0, 0.0), 4.0), TapTarget::Node("B".into()));
    }

    #[test]
    fn tap_on_edge_between_nodes() {
        let index = indexed();
        assert_eq!(index.hit_test(Pos2::new(100.0, 2.0), 4.0), TapTarget::Edge("e0".into()));
    }

    #[test]
    fn node_wins_over_edge() {
        // Node disc and edge segment both cover this point
        let index = indexed();
        assert_eq!(index.hit_test(Pos2::new(22.0, 0.0), 4.0), TapTarget::Node("A".into()));
    }

    #[test]
    fn empty_space_is_background() {
        let index = indexed();
        assert_eq!(index.hit_test(Pos2::new(100.0, 80.0), 4.0), TapTarget::Background);
        assert_eq!(SpatialIndex::new().hit_test(Pos2::ZERO, 4.0), TapTarget::Background);
    }

    #[test]
    fn segment_distance() {
        assert_eq!(distance_to_segment([5.0, 3.0], [0.0, 0.0], [10.0, 0.0]), 3.0);
        assert_eq!(distance_to_segment([-4.0, 3.0], [0.0, 0.0], [10.0, 0.0]), 5.0);
        assert_eq!(distance_to_segment([3.0, 4.0], [0.0, 0.0], [0.0, 0.0]), 5.0);
    }
}
