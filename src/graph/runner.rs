//! Background layout execution
//!
//! Each request runs on its own worker thread against a shared, immutable
//! element graph. Results land in a pending slot that the owning view drains
//! once per frame, the same pull model the UI uses for other async work.
//!
//! ```text
//! request(gen=3) ──► thread ──► Mutex<Vec<LayoutResult>> ──► drain() ──► GraphView
//!      │                                                                   │
//!      └─ cancels gen=2 token                     gen != current → dropped ┘
//! ```

use std::sync::{Arc, Mutex};
use std::thread;

use super::layout::{CancelToken, LayoutAlgorithm, LayoutConfig, LayoutOutcome};
use super::types::ElementGraph;

/// A finished layout tagged with the dataset generation it was computed for
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub generation: u64,
    pub outcome: LayoutOutcome,
}

pub struct LayoutRunner {
    algorithm: Arc<dyn LayoutAlgorithm>,
    pending: Arc<Mutex<Vec<LayoutResult>>>,
    active: Option<CancelToken>,
}

impl std::fmt::Debug for LayoutRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutRunner")
            .field("algorithm", &self.algorithm.name())
            .field("active", &self.active.is_some())
            .finish_non_exhaustive()
    }
}

impl LayoutRunner {
    pub fn new(algorithm: Arc<dyn LayoutAlgorithm>) -> Self {
        Self {
            algorithm,
            pending: Arc::new(Mutex::new(Vec::new())),
            active: None,
        }
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// Start a layout for `generation`, cancelling whatever was in flight.
    pub fn request(&mut self, generation: u64, graph: Arc<ElementGraph>, config: LayoutConfig) {
        self.cancel();

        let token = CancelToken::new();
        self.active = Some(token.clone());

        let algorithm = Arc::clone(&self.algorithm);
        let pending = Arc::clone(&self.pending);

        let spawned = thread::Builder::new()
            .name(format!("layout-gen-{}", generation))
            .spawn(move || {
                let outcome = algorithm.layout(&graph, &config, &token);
                tracing::debug!(
                    generation,
                    iterations = outcome.iterations,
                    converged = outcome.converged,
                    cancelled = outcome.cancelled,
                    "layout finished"
                );
                if outcome.cancelled {
                    return;
                }
                if let Ok(mut slot) = pending.lock() {
                    slot.push(LayoutResult {
                        generation,
                        outcome,
                    });
                }
            });

        if let Err(e) = spawned {
            tracing::error!(generation, error = %e, "failed to spawn layout thread");
        }
    }

    /// Run synchronously on the caller's thread; the result still goes
    /// through the pending slot.
    pub fn run_blocking(&mut self, generation: u64, graph: &ElementGraph, config: &LayoutConfig) {
        self.cancel();
        let outcome = self.algorithm.layout(graph, config, &CancelToken::new());
        if let Ok(mut slot) = self.pending.lock() {
            slot.push(LayoutResult {
                generation,
                outcome,
            });
        }
    }

    /// Cancel the in-flight request, if any
    pub fn cancel(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }

    /// Take every result that has arrived since the last drain, oldest first.
    pub fn drain(&self) -> Vec<LayoutResult> {
        match self.pending.lock() {
            Ok(mut slot) => std::mem::take(&mut *slot),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Test hook: deliver a result as if a worker had produced it.
    pub fn inject(&self, result: LayoutResult) {
        if let Ok(mut slot) = self.pending.lock() {
            slot.push(result);
        }
    }
}

impl Drop for LayoutRunner {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::layout::ForceDirectedLayout;
    use crate::graph::types::{VisualEdge, VisualNode};
    use crate::graph::risk::RiskTier;
    use std::time::{Duration, Instant};

    fn pair_graph() -> ElementGraph {
        let node = |id: &str| VisualNode {
            id: id.into(),
            label: id.into(),
            tier: RiskTier::Low,
            in_ring: false,
            suspicion_score: 0.0,
            flags: vec![],
            placeholder: false,
        };
        ElementGraph::new(
            vec![node("A"), node("B")],
            vec![VisualEdge {
                id: "e0".into(),
                source: "A".into(),
                target: "B".into(),
                amount: 1.0,
                label: "$1.00".into(),
            }],
        )
    }

    fn wait_for(runner: &LayoutRunner) -> Vec<LayoutResult> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let results = runner.drain();
            if !results.is_empty() || Instant::now() > deadline {
                return results;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn background_result_carries_generation() {
        let mut runner = LayoutRunner::new(Arc::new(ForceDirectedLayout));
        runner.request(7, Arc::new(pair_graph()), LayoutConfig::default());

        let results = wait_for(&runner);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].generation, 7);
        assert_eq!(results[0].outcome.positions.len(), 2);
    }

    #[test]
    fn blocking_run_fills_slot() {
        let mut runner = LayoutRunner::new(Arc::new(ForceDirectedLayout));
        runner.run_blocking(1, &pair_graph(), &LayoutConfig::default());
        let results = runner.drain();
        assert_eq!(results.len(), 1);
        assert!(runner.drain().is_empty());
    }

    #[test]
    fn drain_preserves_arrival_order() {
        let runner = LayoutRunner::new(Arc::new(ForceDirectedLayout));
        for generation in [3, 1, 2] {
            runner.inject(LayoutResult {
                generation,
                outcome: LayoutOutcome::default(),
            });
        }
        let gens: Vec<_> = runner.drain().iter().map(|r| r.generation).collect();
        assert_eq!(gens, [3, 1, 2]);
    }
}
