//! GraphView - composition root
//!
//! Owns the current snapshot and everything derived from it: element graph,
//! ring index, positions, spatial index and selection. A new snapshot bumps
//! the generation; anything tagged with an older generation (layout results,
//! taps) is dropped on arrival.
//!
//! Lifecycle per dataset:
//!
//! ```text
//! rebuild(Some(result))
//!   ├─ generation += 1
//!   ├─ selection → Unselected (observer notified)
//!   ├─ cancel in-flight layout
//!   ├─ build elements (warnings logged)
//!   └─ request layout(generation)
//!
//! process_pending_layouts()           once per frame
//!   └─ result.generation == current ? animate to positions : drop
//!
//! ui()
//!   ├─ fit camera to the new layout (once per applied layout)
//!   ├─ drag pans, scroll zooms
//!   └─ click → screen_to_world → hit test → tap
//! ```

use std::sync::Arc;

use egui::{Pos2, Rect};
use tracing::{debug, info, warn};

use super::animation::LayoutAnimation;
use super::builder::{BuildOutput, GraphElementBuilder};
use super::camera::{bounds_of, Camera2D};
use super::layout::{ForceDirectedLayout, LayoutAlgorithm, LayoutConfig};
use super::render::GraphRenderer;
use super::rings::RingMembershipIndex;
use super::runner::{LayoutResult, LayoutRunner};
use super::selection::{SelectedAccount, SelectionController, SelectionObserver, SelectionState};
use super::spatial::{SpatialIndex, TapTarget};
use super::style::StyleSheet;
use super::types::{AnalysisResult, ElementGraph};
use crate::config::{global_settings, GraphSettings};
use crate::error::BuildWarning;
use crate::panels::{graph_summary_text, legend_strip, AccountDetail, RingTable};

/// Zoom change per point of scroll
const SCROLL_ZOOM_RATE: f32 = 0.002;

/// Where layouts run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutExecution {
    /// Worker thread per request
    #[default]
    Background,
    /// On the caller's thread inside `rebuild`; result still applied by
    /// `process_pending_layouts`
    Inline,
}

/// A tap reported by the render surface, tagged with the generation it was
/// produced under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapEvent {
    pub generation: u64,
    pub target: TapTarget,
}

pub struct GraphView {
    settings: GraphSettings,
    stylesheet: StyleSheet,
    execution: LayoutExecution,

    snapshot: Option<AnalysisResult>,
    ring_index: RingMembershipIndex,
    elements: Arc<ElementGraph>,
    warnings: Vec<BuildWarning>,

    generation: u64,
    layout_pending: bool,
    animation: Option<LayoutAnimation>,
    spatial: SpatialIndex,
    camera: Camera2D,
    needs_fit: bool,

    selection: SelectionController,
    runner: LayoutRunner,
    renderer: GraphRenderer,
}

impl std::fmt::Debug for GraphView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphView")
            .field("generation", &self.generation)
            .field("nodes", &self.elements.node_count())
            .field("edges", &self.elements.edge_count())
            .field("layout_pending", &self.layout_pending)
            .field("selection", self.selection.state())
            .finish_non_exhaustive()
    }
}

impl Default for GraphView {
    fn default() -> Self {
        Self::new(global_settings().clone())
    }
}

impl GraphView {
    pub fn new(settings: GraphSettings) -> Self {
        Self::with_algorithm(settings, Arc::new(ForceDirectedLayout))
    }

    /// Use a different layout implementation.
    pub fn with_algorithm(settings: GraphSettings, algorithm: Arc<dyn LayoutAlgorithm>) -> Self {
        Self {
            settings,
            stylesheet: StyleSheet::default(),
            execution: LayoutExecution::default(),
            snapshot: None,
            ring_index: RingMembershipIndex::new(),
            elements: Arc::new(ElementGraph::default()),
            warnings: Vec::new(),
            generation: 0,
            layout_pending: false,
            animation: None,
            spatial: SpatialIndex::new(),
            camera: Camera2D::new(),
            needs_fit: false,
            selection: SelectionController::new(),
            runner: LayoutRunner::new(algorithm),
            renderer: GraphRenderer::new(),
        }
    }

    /// Builder: choose where layouts run
    pub fn with_execution(mut self, execution: LayoutExecution) -> Self {
        self.execution = execution;
        self
    }

    /// Builder: custom style rules
    pub fn with_stylesheet(mut self, stylesheet: StyleSheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    // =========================================================================
    // DATASET
    // =========================================================================

    /// Pure element derivation, no view state touched.
    pub fn rebuild_elements(result: &AnalysisResult) -> BuildOutput {
        GraphElementBuilder::new().build_from_result(result).0
    }

    /// Replace the current snapshot (`None` clears the view).
    ///
    /// Always resets selection and invalidates in-flight layouts before the
    /// new elements exist.
    pub fn rebuild(&mut self, result: Option<AnalysisResult>) {
        self.generation += 1;
        self.runner.cancel();
        self.selection.dataset_replaced();
        self.animation = None;
        self.spatial.clear();
        self.layout_pending = false;
        self.needs_fit = false;

        let Some(result) = result else {
            info!(generation = self.generation, "graph cleared");
            self.snapshot = None;
            self.ring_index = RingMembershipIndex::new();
            self.elements = Arc::new(ElementGraph::default());
            self.warnings.clear();
            return;
        };

        let (output, ring_index) = GraphElementBuilder::new().build_from_result(&result);
        for warning in &output.warnings {
            warn!(kind = warning.kind(), "{}", warning);
        }
        info!(
            generation = self.generation,
            nodes = output.graph.node_count(),
            edges = output.graph.edge_count(),
            rings = result.fraud_rings.len(),
            warnings = output.warnings.len(),
            "dataset replaced"
        );

        self.ring_index = ring_index;
        self.elements = Arc::new(output.graph);
        self.warnings = output.warnings;
        self.snapshot = Some(result);

        if !self.elements.is_empty() {
            self.request_layout();
        }
    }

    pub fn clear(&mut self) {
        self.rebuild(None);
    }

    fn request_layout(&mut self) {
        let config = self.layout_config().clone();
        debug!(
            generation = self.generation,
            algorithm = self.runner.algorithm_name(),
            execution = ?self.execution,
            "layout requested"
        );
        self.layout_pending = true;
        match self.execution {
            LayoutExecution::Background => {
                self.runner
                    .request(self.generation, Arc::clone(&self.elements), config)
            }
            LayoutExecution::Inline => {
                self.runner
                    .run_blocking(self.generation, &self.elements, &config)
            }
        }
    }

    // =========================================================================
    // LAYOUT RESULTS
    // =========================================================================

    /// Apply whatever layouts have finished. Returns true if positions
    /// changed.
    pub fn process_pending_layouts(&mut self) -> bool {
        let mut applied = false;
        for result in self.runner.drain() {
            applied |= self.apply_layout_result(result);
        }
        applied
    }

    /// Apply one layout result; stale generations are dropped.
    pub fn apply_layout_result(&mut self, result: LayoutResult) -> bool {
        if result.generation != self.generation {
            debug!(
                stale = result.generation,
                current = self.generation,
                "discarding stale layout result"
            );
            return false;
        }
        let outcome = result.outcome;
        if outcome.positions.len() != self.elements.node_count() {
            warn!(
                expected = self.elements.node_count(),
                got = outcome.positions.len(),
                "layout result does not match element graph"
            );
            return false;
        }
        if !outcome.converged {
            debug!(
                iterations = outcome.iterations,
                "layout budget exhausted, using partial layout"
            );
        }

        self.spatial = SpatialIndex::build(&self.elements, &outcome.positions, &self.stylesheet);

        let animate = self.settings.layout.animate;
        let duration = self.settings.layout.animation_duration().as_secs_f32();
        self.animation = Some(if animate {
            LayoutAnimation::new(outcome.initial_positions, outcome.positions, duration)
        } else {
            LayoutAnimation::settled(outcome.positions)
        });
        self.layout_pending = false;
        self.needs_fit = true;
        true
    }

    /// Advance the layout animation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if let Some(animation) = &mut self.animation {
            animation.tick(dt);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.as_ref().is_some_and(|a| !a.is_complete())
    }

    /// Current node positions (animated), aligned with `elements().nodes`.
    /// Empty until the first layout lands.
    pub fn positions(&self) -> Vec<Pos2> {
        self.animation
            .as_ref()
            .map(LayoutAnimation::positions)
            .unwrap_or_default()
    }

    /// Settled positions of the latest applied layout
    pub fn target_positions(&self) -> &[Pos2] {
        self.animation
            .as_ref()
            .map(LayoutAnimation::target)
            .unwrap_or(&[])
    }

    // =========================================================================
    // INTERACTION
    // =========================================================================

    /// Subscribe to selection changes. Replaces any previous observer.
    pub fn on_selection_change<O>(&mut self, observer: O)
    where
        O: SelectionObserver + 'static,
    {
        self.selection.set_observer(Box::new(observer));
    }

    /// Tag a target with the current generation
    pub fn tap_event(&self, target: TapTarget) -> TapEvent {
        TapEvent {
            generation: self.generation,
            target,
        }
    }

    /// Dispatch a tap. Returns false if it was stale and ignored.
    pub fn handle_tap(&mut self, event: TapEvent) -> bool {
        if event.generation != self.generation {
            debug!(
                stale = event.generation,
                current = self.generation,
                "ignoring stale tap"
            );
            return false;
        }
        match &event.target {
            TapTarget::Node(id) => match self.elements.get_node(id) {
                Some(node) => self.selection.tap_node(node),
                None => {
                    debug!(node = %id, "tap on unknown node treated as background");
                    self.selection.tap_background();
                }
            },
            TapTarget::Edge(_) => self.selection.tap_edge(),
            TapTarget::Background => self.selection.tap_background(),
        }
        true
    }

    /// Hit-test a point in graph coordinates and dispatch the tap.
    pub fn pointer_tap(&mut self, pos: Pos2) -> TapTarget {
        self.tap_at(pos, self.settings.interaction.hit_tolerance)
    }

    /// Hit-test a point on screen inside `screen_rect`, through the camera.
    /// Tolerance stays constant in screen points whatever the zoom.
    pub fn screen_tap(&mut self, screen_pos: Pos2, screen_rect: Rect) -> TapTarget {
        let world = self.camera.screen_to_world(screen_pos, screen_rect);
        let tolerance = self.settings.interaction.hit_tolerance / self.camera.zoom();
        self.tap_at(world, tolerance)
    }

    fn tap_at(&mut self, pos: Pos2, tolerance: f32) -> TapTarget {
        let target = self.spatial.hit_test(pos, tolerance);
        self.handle_tap(self.tap_event(target.clone()));
        target
    }

    // =========================================================================
    // CAMERA
    // =========================================================================

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    /// Refit on the next frame
    pub fn request_fit(&mut self) {
        self.needs_fit = !self.target_positions().is_empty();
    }

    /// Center and zoom so every settled node fits in `screen_rect`, keeping
    /// the layout padding as a screen margin.
    pub fn fit_to_screen(&mut self, screen_rect: Rect) {
        let margin = self.stylesheet.max_node_size() / 2.0;
        if let Some(bounds) = bounds_of(self.target_positions(), margin) {
            self.camera
                .fit_to_bounds(bounds, screen_rect, self.settings.layout.padding);
            debug!(zoom = self.camera.zoom(), "camera fitted to layout");
        }
        self.needs_fit = false;
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn selected_account(&self) -> Option<&SelectedAccount> {
        self.selection.state().selected()
    }

    pub fn selected_detail(&self) -> Option<AccountDetail> {
        AccountDetail::from_selection(self.selection.state(), &self.ring_index)
    }

    pub fn ring_table(&self) -> RingTable {
        let rings = self
            .snapshot
            .as_ref()
            .map(|s| s.fraud_rings.as_slice())
            .unwrap_or(&[]);
        RingTable::build(rings, self.settings.table.member_preview_limit)
    }

    pub fn elements(&self) -> &ElementGraph {
        &self.elements
    }

    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    pub fn snapshot(&self) -> Option<&AnalysisResult> {
        self.snapshot.as_ref()
    }

    pub fn ring_index(&self) -> &RingMembershipIndex {
        &self.ring_index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_layout_pending(&self) -> bool {
        self.layout_pending
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.settings.layout
    }

    pub fn stylesheet(&self) -> &StyleSheet {
        &self.stylesheet
    }

    // =========================================================================
    // EGUI
    // =========================================================================

    /// Header, legend and the graph canvas in the remaining space of `ui`.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> egui::Response {
        self.process_pending_layouts();

        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(graph_summary_text(
                    self.elements.node_count(),
                    self.elements.edge_count(),
                ))
                .monospace()
                .small(),
            );
        });
        legend_strip(ui);

        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let screen_rect = response.rect;

        if self.needs_fit {
            self.fit_to_screen(screen_rect);
        }

        self.tick(ui.input(|i| i.stable_dt));
        if self.is_animating() || self.layout_pending {
            ui.ctx().request_repaint();
        }

        if response.dragged() {
            self.camera.pan(response.drag_delta());
        }
        if response.hovered() {
            let (scroll, pinch, hover) =
                ui.input(|i| (i.smooth_scroll_delta.y, i.zoom_delta(), i.pointer.hover_pos()));
            let factor = pinch * (scroll * SCROLL_ZOOM_RATE).exp();
            if let Some(hover) = hover {
                self.camera.zoom_at(factor, hover, screen_rect);
            }
        }
        if response.double_clicked() {
            self.request_fit();
        } else if response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.screen_tap(pointer, screen_rect);
            }
        }

        self.renderer.render_view(
            &painter,
            &self.elements,
            &self.positions(),
            self.selection.state(),
            &self.stylesheet,
            &self.camera,
            screen_rect,
        );
        response
    }
}
