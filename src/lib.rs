//! Fincrime Graph
//!
//! Transaction network engine for fraud review: risk tiers, fraud-ring
//! membership, force-directed layout and single selection, rendered with
//! egui. No HTTP, no app shell; the host owns both and feeds analysis
//! snapshots into [`GraphView`].

pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod panels;

pub use config::{global_settings, GraphSettings, InteractionConfig, TableConfig};
pub use error::{BuildWarning, GraphError};
pub use graph::{
    // Snapshot
    Account,
    AnalysisResult,
    FraudRing,
    ParsedAnalysis,
    PatternType,
    Transaction,
    // Elements
    BuildOutput,
    ElementGraph,
    GraphElementBuilder,
    VisualEdge,
    VisualNode,
    // Risk
    classify,
    RiskTier,
    RingMembershipIndex,
    // Layout
    ForceDirectedLayout,
    LayoutAlgorithm,
    LayoutConfig,
    // Interaction
    Camera2D,
    GraphView,
    SelectionState,
    TapTarget,
};
pub use logging::init_tracing;
pub use panels::{legend_strip, AccountDetail, RingTable};
