//! Reveal state machine.
//!
//! Turns a completed graph into a growing sequence of sub-graphs, one node
//! per tick in the graph's node order. It owns no timer; the driver calls
//! [`RevealScheduler::tick`] on its cadence.

use std::sync::Arc;

use cartograph_models::Graph;

/// Where a reveal stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealState {
    /// No graph presented yet, or torn down.
    #[default]
    Idle,
    /// Nodes are still being added.
    Revealing,
    /// The full graph is visible.
    Complete,
}

impl RevealState {
    /// Returns true while ticks are still needed.
    pub fn needs_ticks(&self) -> bool {
        matches!(self, RevealState::Revealing)
    }
}

/// One emitted snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealStep {
    /// Visible sub-graph; satisfies the endpoint invariant.
    pub visible: Arc<Graph>,
    pub state: RevealState,
}

/// Reveal state machine over one graph at a time.
#[derive(Debug, Default)]
pub struct RevealScheduler {
    graph: Arc<Graph>,
    visible_count: usize,
    state: RevealState,
}

impl RevealScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever is being revealed with `graph`.
    ///
    /// An empty graph completes immediately; anything else restarts from an
    /// empty visible set.
    pub fn present(&mut self, graph: Arc<Graph>) -> RevealStep {
        self.graph = graph;
        self.visible_count = 0;

        if self.graph.is_empty() {
            self.state = RevealState::Complete;
            return self.step(Arc::clone(&self.graph));
        }

        self.state = RevealState::Revealing;
        self.step(Arc::new(Graph::empty()))
    }

    /// Adds the next node. Returns `None` unless a reveal is in progress.
    pub fn tick(&mut self) -> Option<RevealStep> {
        if !self.state.needs_ticks() {
            return None;
        }

        self.visible_count += 1;
        if self.visible_count >= self.graph.node_count() {
            self.visible_count = self.graph.node_count();
            self.state = RevealState::Complete;
            return Some(self.step(Arc::clone(&self.graph)));
        }

        Some(self.step(Arc::new(self.graph.prefix(self.visible_count))))
    }

    /// Abandons the current reveal.
    pub fn teardown(&mut self) {
        self.graph = Arc::new(Graph::empty());
        self.visible_count = 0;
        self.state = RevealState::Idle;
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    /// Nodes currently visible.
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// Nodes in the graph being revealed.
    pub fn total(&self) -> usize {
        self.graph.node_count()
    }

    /// The graph being revealed.
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    fn step(&self, visible: Arc<Graph>) -> RevealStep {
        RevealStep {
            visible,
            state: self.state,
        }
    }
}
