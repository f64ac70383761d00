//! Single-selection state machine
//!
//! Two states, `Unselected` (initial) and `Selected`. Every event is a
//! transition and every transition is pushed to the observer synchronously,
//! in order.

use serde::Serialize;

use super::risk::RiskTier;
use super::types::VisualNode;

/// Snapshot of the node at the moment it was tapped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedAccount {
    pub id: String,
    pub suspicion_score: f64,
    pub flags: Vec<String>,
    pub in_ring: bool,
    /// Tier the node is drawn with; `Unknown` for placeholders
    pub tier: RiskTier,
    /// Referenced by a transaction but missing from the account list
    pub placeholder: bool,
}

impl From<&VisualNode> for SelectedAccount {
    fn from(node: &VisualNode) -> Self {
        Self {
            id: node.id.clone(),
            suspicion_score: node.suspicion_score,
            flags: node.flags.clone(),
            in_ring: node.in_ring,
            tier: node.tier,
            placeholder: node.placeholder,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "account", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    Unselected,
    Selected(SelectedAccount),
}

impl SelectionState {
    pub fn selected(&self) -> Option<&SelectedAccount> {
        match self {
            SelectionState::Selected(account) => Some(account),
            SelectionState::Unselected => None,
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected().map(|a| a.id.as_str())
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_id() == Some(id)
    }
}

/// Receives every selection transition
pub trait SelectionObserver: Send {
    fn selection_changed(&mut self, state: &SelectionState);
}

impl<F> SelectionObserver for F
where
    F: FnMut(&SelectionState) + Send,
{
    fn selection_changed(&mut self, state: &SelectionState) {
        self(state)
    }
}

#[derive(Default)]
pub struct SelectionController {
    state: SelectionState,
    observer: Option<Box<dyn SelectionObserver>>,
}

impl std::fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionController")
            .field("state", &self.state)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the observer. Only one is held at a time.
    pub fn set_observer(&mut self, observer: Box<dyn SelectionObserver>) {
        self.observer = Some(observer);
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn tap_node(&mut self, node: &VisualNode) {
        self.transition(SelectionState::Selected(SelectedAccount::from(node)));
    }

    pub fn tap_background(&mut self) {
        self.transition(SelectionState::Unselected);
    }

    pub fn tap_edge(&mut self) {
        self.transition(SelectionState::Unselected);
    }

    /// New snapshot arrived (or the view was cleared)
    pub fn dataset_replaced(&mut self) {
        self.transition(SelectionState::Unselected);
    }

    fn transition(&mut self, next: SelectionState) {
        tracing::trace!(from = ?self.state.selected_id(), to = ?next.selected_id(), "selection transition");
        self.state = next;
        if let Some(observer) = self.observer.as_mut() {
            observer.selection_changed(&self.state);
        }
    }
}
