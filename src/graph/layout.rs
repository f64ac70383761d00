//! Force-directed layout
//!
//! Spring embedder for the transaction network:
//! - Edges are springs pulling endpoints toward `ideal_edge_length`
//! - Every nearby pair of nodes repels (inverse square law)
//! - Weak gravity toward the centroid keeps components from drifting apart
//! - Step size cools each iteration; the run stops on convergence, on the
//!   iteration or time budget, or when cancelled
//!
//! Repulsion only considers pairs in neighbouring grid cells (cell size is a
//! few edge lengths), so an iteration stays close to linear for the
//! 10,000-edge inputs the viewer accepts.
//!
//! # Usage
//! ```ignore
//! let outcome = ForceDirectedLayout.layout(&graph, &LayoutConfig::default(), &CancelToken::new());
//! for (node, pos) in graph.nodes.iter().zip(&outcome.positions) {
//!     draw_node(node, *pos);
//! }
//! ```

use egui::{Pos2, Rect, Vec2};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::types::ElementGraph;
use crate::error::GraphError;

/// Golden angle in radians, for the deterministic spiral seed
const GOLDEN_ANGLE: f32 = 2.399_963;

/// Distances below this are treated as coincident
const MIN_DISTANCE: f32 = 1.0;

/// Repulsion is ignored beyond this many ideal edge lengths
const REPULSION_RANGE: f32 = 4.0;

// =============================================================================
// LAYOUT CONFIG
// =============================================================================

/// Configuration for the force-directed layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Rest length of an edge spring
    pub ideal_edge_length: f32,

    /// Repulsion constant between node pairs
    pub node_repulsion: f32,

    /// Margin between the layout bounds and the origin
    pub padding: f32,

    /// Animate from the initial placement to the result
    pub animate: bool,

    /// Animation length in milliseconds
    pub animation_duration_ms: u64,

    /// Random initial placement instead of the deterministic spiral
    pub randomize: bool,

    /// Seed for randomized placement (None = fresh entropy each run)
    pub seed: Option<u64>,

    /// Spring stiffness
    pub spring_strength: f32,

    /// Pull toward the centroid
    pub gravity: f32,

    /// Step-size decay per iteration (0.0 - 1.0)
    pub cooling: f32,

    /// Iteration budget
    pub max_iterations: usize,

    /// Mean per-node displacement that counts as converged
    pub convergence_threshold: f32,

    /// Wall-clock budget in milliseconds
    pub time_budget_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ideal_edge_length: 120.0,
            node_repulsion: 8000.0,
            padding: 40.0,
            animate: true,
            animation_duration_ms: 700,
            randomize: false,
            seed: None,
            spring_strength: 0.08,
            gravity: 0.005,
            cooling: 0.95,
            max_iterations: 1000,
            convergence_threshold: 0.05,
            time_budget_ms: 5000,
        }
    }
}

impl LayoutConfig {
    /// Preset for inputs near the 10,000 edge ceiling: fewer iterations,
    /// faster cooling, no animation.
    pub fn large_graph() -> Self {
        Self {
            animate: false,
            cooling: 0.9,
            max_iterations: 300,
            convergence_threshold: 0.2,
            time_budget_ms: 3000,
            ..Self::default()
        }
    }

    /// Reject values the simulation cannot work with.
    pub fn validate(&self) -> Result<(), GraphError> {
        if !(self.ideal_edge_length > 0.0) {
            return Err(GraphError::InvalidLayoutConfig(
                "ideal_edge_length must be > 0".into(),
            ));
        }
        if self.node_repulsion < 0.0 || self.spring_strength < 0.0 || self.gravity < 0.0 {
            return Err(GraphError::InvalidLayoutConfig(
                "forces must be non-negative".into(),
            ));
        }
        if !(self.cooling > 0.0 && self.cooling <= 1.0) {
            return Err(GraphError::InvalidLayoutConfig(
                "cooling must be in (0, 1]".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(GraphError::InvalidLayoutConfig(
                "max_iterations must be > 0".into(),
            ));
        }
        if self.padding < 0.0 {
            return Err(GraphError::InvalidLayoutConfig(
                "padding must be >= 0".into(),
            ));
        }
        Ok(())
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Shared flag checked once per iteration
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Positions for every node, aligned with `ElementGraph::nodes`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutOutcome {
    /// Seed placement the run started from (animation origin)
    pub initial_positions: Vec<Pos2>,
    pub positions: Vec<Pos2>,
    pub iterations: usize,
    /// False when a budget ran out first; positions are best effort
    pub converged: bool,
    pub cancelled: bool,
}

impl LayoutOutcome {
    /// Bounding rectangle of the positions
    pub fn bounds(&self) -> Rect {
        bounds_of(&self.positions)
    }
}

pub fn bounds_of(positions: &[Pos2]) -> Rect {
    if positions.is_empty() {
        return Rect::NOTHING;
    }
    let mut rect = Rect::from_min_max(positions[0], positions[0]);
    for &p in &positions[1..] {
        rect.extend_with(p);
    }
    rect
}

// =============================================================================
// ALGORITHM TRAIT
// =============================================================================

/// Pluggable layout capability.
///
/// Implementations must check `cancel` regularly and return whatever they
/// have when it fires.
pub trait LayoutAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    fn layout(
        &self,
        graph: &ElementGraph,
        config: &LayoutConfig,
        cancel: &CancelToken,
    ) -> LayoutOutcome;
}

// =============================================================================
// FORCE-DIRECTED LAYOUT
// =============================================================================

/// Spring embedder with grid-bucketed repulsion
#[derive(Debug, Clone, Copy, Default)]
pub struct ForceDirectedLayout;

impl LayoutAlgorithm for ForceDirectedLayout {
    fn name(&self) -> &'static str {
        "force_directed"
    }

    fn layout(
        &self,
        graph: &ElementGraph,
        config: &LayoutConfig,
        cancel: &CancelToken,
    ) -> LayoutOutcome {
        let n = graph.node_count();
        if n == 0 {
            return LayoutOutcome {
                converged: true,
                ..LayoutOutcome::default()
            };
        }

        let mut initial = initial_positions(n, config);
        normalize_positions(&mut initial, config.padding);
        let edges = graph.edge_endpoints();
        let deadline = Instant::now() + Duration::from_millis(config.time_budget_ms);

        let mut positions = initial.clone();
        let mut temperature = config.ideal_edge_length;
        let mut iterations = 0;
        let mut converged = false;
        let mut cancelled = false;

        while iterations < config.max_iterations {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            if Instant::now() >= deadline {
                break;
            }

            let forces = calculate_forces(&positions, &edges, config);

            let mut total_displacement = 0.0;
            for (pos, force) in positions.iter_mut().zip(&forces) {
                let len = force.length();
                if len <= f32::EPSILON {
                    continue;
                }
                let step = len.min(temperature);
                *pos += *force / len * step;
                total_displacement += step;
            }

            iterations += 1;
            temperature *= config.cooling;

            if total_displacement / n as f32 <= config.convergence_threshold {
                converged = true;
                break;
            }
        }

        normalize_positions(&mut positions, config.padding);

        LayoutOutcome {
            initial_positions: initial,
            positions,
            iterations,
            converged,
            cancelled,
        }
    }
}

/// Seed placement: a sunflower spiral (deterministic) or a seeded/entropy
/// scatter over a square of matching area.
pub fn initial_positions(n: usize, config: &LayoutConfig) -> Vec<Pos2> {
    let spacing = config.ideal_edge_length * 0.5;

    if !config.randomize {
        return (0..n)
            .map(|i| {
                let radius = spacing * (i as f32).sqrt();
                Pos2::ZERO + Vec2::angled(i as f32 * GOLDEN_ANGLE) * radius
            })
            .collect();
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let side = spacing * (n as f32).sqrt().max(1.0) * 2.0;
    (0..n)
        .map(|_| Pos2::new(rng.gen_range(0.0..side), rng.gen_range(0.0..side)))
        .collect()
}

/// Net force on every node
fn calculate_forces(positions: &[Pos2], edges: &[(usize, usize)], config: &LayoutConfig) -> Vec<Vec2> {
    let n = positions.len();
    let mut forces = vec![Vec2::ZERO; n];

    // Repulsion between nearby pairs
    let cell_size = config.ideal_edge_length * REPULSION_RANGE;
    let grid = build_grid(positions, cell_size);
    let range_sq = cell_size * cell_size;

    for i in 0..n {
        let (cx, cy) = cell_of(positions[i], cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &j in bucket {
                    if j <= i {
                        continue;
                    }
                    let mut delta = positions[i] - positions[j];
                    let mut dist_sq = delta.length_sq();
                    if dist_sq > range_sq {
                        continue;
                    }
                    if dist_sq < MIN_DISTANCE * MIN_DISTANCE {
                        // Coincident: push apart along a fixed per-pair direction
                        delta = Vec2::angled((i * 31 + j * 17) as f32 * GOLDEN_ANGLE);
                        dist_sq = MIN_DISTANCE * MIN_DISTANCE;
                    }
                    let dist = dist_sq.sqrt();
                    let force = delta / dist * (config.node_repulsion / dist_sq);
                    forces[i] += force;
                    forces[j] -= force;
                }
            }
        }
    }

    // Edge springs
    for &(s, t) in edges {
        if s == t {
            continue;
        }
        let delta = positions[t] - positions[s];
        let dist = delta.length().max(MIN_DISTANCE);
        let stretch = dist - config.ideal_edge_length;
        let force = delta / dist * (stretch * config.spring_strength);
        forces[s] += force;
        forces[t] -= force;
    }

    // Gravity toward the centroid
    if config.gravity > 0.0 {
        let centroid = positions
            .iter()
            .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2())
            / n as f32;
        for (force, pos) in forces.iter_mut().zip(positions) {
            *force += (centroid - pos.to_vec2()) * config.gravity;
        }
    }

    forces
}

/// Bucket node indices by grid cell; buckets keep index order.
fn build_grid(positions: &[Pos2], cell_size: f32) -> HashMap<(i32, i32), Vec<usize>> {
    let mut grid: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
    for (i, &p) in positions.iter().enumerate() {
        grid.entry(cell_of(p, cell_size)).or_default().push(i);
    }
    grid
}

fn cell_of(p: Pos2, cell_size: f32) -> (i32, i32) {
    (
        (p.x / cell_size).floor() as i32,
        (p.y / cell_size).floor() as i32,
    )
}

/// Translate so the bounding box starts at (padding, padding)
fn normalize_positions(positions: &mut [Pos2], padding: f32) {
    let bounds = bounds_of(positions);
    if !bounds.is_finite() {
        return;
    }
    let shift = Vec2::new(padding - bounds.min.x, padding - bounds.min.y);
    for p in positions.iter_mut() {
        *p += shift;
    }
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
    use proptest::prelude::*;

    fn graph_of(n: usize, edges: &[(usize, usize)]) -> ElementGraph {
        let accounts: Vec<_> = (0..n)
            .map(|i| Account::new(format!("N{}", i), 10.0))
            .collect();
        let transactions: Vec<_> = edges
            .iter()
            .map(|&(s, t)| Transaction::new(format!("N{}", s), format!("N{}", t), 1.0))
            .collect();
        GraphElementBuilder::new()
            .build(&accounts, &transactions, &RingMembershipIndex::new())
            .graph
    }

    fn dist(a: Pos2, b: Pos2) -> f32 {
        (a - b).length()
    }

    #[test]
    fn empty_graph_is_trivially_converged() {
        let outcome = ForceDirectedLayout.layout(
            &ElementGraph::default(),
            &LayoutConfig::default(),
            &CancelToken::new(),
        );
        assert!(outcome.converged);
        assert!(outcome.positions.is_empty());
    }

    #[test]
    fn connected_pair_settles_near_edge_length() {
        let graph = graph_of(2, &[(0, 1)]);
        let config = LayoutConfig::default();
        let outcome = ForceDirectedLayout.layout(&graph, &config, &CancelToken::new());

        assert_eq!(outcome.positions.len(), 2);
        assert!(outcome.converged);
        let d = dist(outcome.positions[0], outcome.positions[1]);
        assert!(d > config.ideal_edge_length * 0.5, "too close: {}", d);
        assert!(d < config.ideal_edge_length * 2.0, "too far: {}", d);
    }

    #[test]
    fn unconnected_nodes_spread_out() {
        let graph = graph_of(3, &[]);
        let config = LayoutConfig {
            gravity: 0.0,
            ..LayoutConfig::default()
        };
        let outcome = ForceDirectedLayout.layout(&graph, &config, &CancelToken::new());
        let spread = |ps: &[Pos2]| dist(ps[0], ps[1]) + dist(ps[1], ps[2]) + dist(ps[0], ps[2]);
        assert!(spread(&outcome.positions) > spread(&outcome.initial_positions));
    }

    #[test]
    fn positions_start_at_padding() {
        let graph = graph_of(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
        let config = LayoutConfig::default();
        let outcome = ForceDirectedLayout.layout(&graph, &config, &CancelToken::new());
        let bounds = outcome.bounds();
        assert!((bounds.min.x - config.padding).abs() < 1e-3);
        assert!((bounds.min.y - config.padding).abs() < 1e-3);
    }

    #[test]
    fn iteration_budget_gives_partial_layout() {
        let graph = graph_of(20, &[(0, 1), (1, 2), (5, 9)]);
        let config = LayoutConfig {
            max_iterations: 2,
            convergence_threshold: 0.0,
            ..LayoutConfig::default()
        };
        let outcome = ForceDirectedLayout.layout(&graph, &config, &CancelToken::new());
        assert_eq!(outcome.iterations, 2);
        assert!(!outcome.converged);
        assert_eq!(outcome.positions.len(), 20);
    }

    #[test]
    fn cancelled_before_start_returns_seed() {
        let graph = graph_of(4, &[(0, 1)]);
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = ForceDirectedLayout.layout(&graph, &LayoutConfig::default(), &cancel);
        assert!(outcome.cancelled);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.positions.len(), 4);
    }

    #[test]
    fn seeded_random_placement_is_reproducible() {
        let config = LayoutConfig {
            randomize: true,
            seed: Some(7),
            ..LayoutConfig::default()
        };
        assert_eq!(initial_positions(10, &config), initial_positions(10, &config));
    }

    #[test]
    fn self_loops_and_parallel_edges_are_fine() {
        let graph = graph_of(2, &[(0, 0), (0, 1), (0, 1)]);
        let outcome =
            ForceDirectedLayout.layout(&graph, &LayoutConfig::default(), &CancelToken::new());
        assert!(outcome.positions.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn large_graph_finishes_within_budget() {
        let n = 2000;
        let edges: Vec<_> = (0..10_000).map(|i| (i % n, (i * 7 + 1) % n)).collect();
        let graph = graph_of(n, &edges);
        let config = LayoutConfig {
            time_budget_ms: 1500,
            ..LayoutConfig::large_graph()
        };
        let started = Instant::now();
        let outcome = ForceDirectedLayout.layout(&graph, &config, &CancelToken::new());
        assert_eq!(outcome.positions.len(), n);
        // Budget plus one iteration of slack
        assert!(started.elapsed() < Duration::from_millis(1500 + 2000));
    }

    #[test]
    fn config_validation() {
        assert!(LayoutConfig::default().validate().is_ok());
        assert!(LayoutConfig::large_graph().validate().is_ok());
        let bad = LayoutConfig {
            max_iterations: 0,
            ..LayoutConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = LayoutConfig {
            ideal_edge_length: 0.0,
            ..LayoutConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn deterministic_without_randomization(
            n in 1usize..25,
            raw_edges in proptest::collection::vec((0usize..25, 0usize..25), 0..40),
        ) {
            let edges: Vec<_> = raw_edges
                .into_iter()
                .map(|(s, t)| (s % n, t % n))
                .collect();
            let graph = graph_of(n, &edges);
            let config = LayoutConfig {
                max_iterations: 200,
                ..LayoutConfig::default()
            };

            let a = ForceDirectedLayout.layout(&graph, &config, &CancelToken::new());
            let b = ForceDirectedLayout.layout(&graph, &config, &CancelToken::new());

            prop_assert_eq!(a.iterations, b.iterations);
            for (pa, pb) in a.positions.iter().zip(&b.positions) {
                prop_assert!(dist(*pa, *pb) < 1e-4);
            }
        }
    }
}
