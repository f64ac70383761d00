//! Transaction Network Graph Module
//!
//! Turns a fraud-analysis snapshot into a laid-out, selectable graph of
//! accounts (nodes) and transactions (edges).
//!
//! # Architecture
//!
//! ```text
//! AnalysisResult (from analysis service)
//!        │
//!        ├──► RingMembershipIndex (which accounts sit in a ring)
//!        │
//!        ▼
//! GraphElementBuilder ◄── risk::classify (tier thresholds)
//!        │
//!        ▼
//! ElementGraph (nodes/edges, input order)
//!        │
//!        ├──► LayoutRunner ──► LayoutAlgorithm (ForceDirectedLayout)
//!        │         │                 worker thread, cancelable
//!        │         ▼
//!        │    LayoutResult{generation} ──► LayoutAnimation
//!        │
//!        ├──► GraphRenderer (egui::Painter, StyleSheet rules, Camera2D)
//!        │
//!        └──► SpatialIndex (screen tap → Camera2D → TapTarget)
//!                    │
//!                    ▼
//!            SelectionController ──► SelectionObserver
//! ```
//!
//! `GraphView` owns all of the above and is the only thing a host touches.
//!
//! # Usage
//!
//! ```ignore
//! let mut view = GraphView::default();
//! view.on_selection_change(|s: &SelectionState| println!("{:?}", s.selected_id()));
//! view.rebuild(Some(parsed.result));
//! // each frame
//! view.ui(ui);
//! ```

pub mod animation;
pub mod builder;
pub mod camera;
pub mod layout;
pub mod render;
pub mod rings;
pub mod risk;
pub mod runner;
pub mod selection;
pub mod spatial;
pub mod style;
pub mod types;
pub mod view;

pub use animation::LayoutAnimation;
pub use builder::{format_amount, BuildOutput, GraphElementBuilder};
pub use camera::{bounds_of, Camera2D};
pub use layout::{CancelToken, ForceDirectedLayout, LayoutAlgorithm, LayoutConfig, LayoutOutcome};
pub use render::GraphRenderer;
pub use rings::RingMembershipIndex;
pub use risk::{classify, legend, style_for, LegendEntry, RiskTier, TierStyle};
pub use runner::{LayoutResult, LayoutRunner};
pub use selection::{SelectedAccount, SelectionController, SelectionObserver, SelectionState};
pub use spatial::{SpatialIndex, TapTarget};
pub use style::{flag_color, NodeStyle, StyleSheet};
pub use types::*;
pub use view::{GraphView, LayoutExecution, TapEvent};
