//! Timer-driven reveal task.
//!
//! The driver owns the [`RevealScheduler`] and its interval. Consumers
//! subscribe to [`RevealFrame`] snapshots; they never see a graph under
//! construction. Cancelling a reveal drops its interval, so a cancelled
//! reveal can never tick again.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, trace};

use cartograph_models::{Generation, Graph};

use crate::error::{PipelineError, Result};
use crate::scheduler::{RevealScheduler, RevealState, RevealStep};

/// Snapshot published after every reveal step.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealFrame {
    /// Scan the graph came from.
    pub generation: Generation,
    /// Visible sub-graph.
    pub visible: Arc<Graph>,
    pub state: RevealState,
    /// Nodes in the full graph.
    pub total_nodes: usize,
}

impl RevealFrame {
    fn idle() -> Self {
        Self {
            generation: Generation::INITIAL,
            visible: Arc::new(Graph::empty()),
            state: RevealState::Idle,
            total_nodes: 0,
        }
    }

    /// Returns true once the full graph is visible.
    pub fn is_complete(&self) -> bool {
        self.state == RevealState::Complete
    }
}

#[derive(Debug)]
enum RevealCommand {
    Present {
        generation: Generation,
        graph: Arc<Graph>,
    },
    Teardown,
}

/// Handle to a running reveal task.
#[derive(Debug)]
pub struct RevealHandle {
    commands: mpsc::UnboundedSender<RevealCommand>,
    frames: watch::Receiver<RevealFrame>,
    task: Option<JoinHandle<()>>,
}

impl RevealHandle {
    /// Spawns the reveal task. Must be called within a tokio runtime.
    pub fn spawn(period: Duration) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (frame_tx, frames) = watch::channel(RevealFrame::idle());

        let driver = RevealDriver {
            scheduler: RevealScheduler::new(),
            generation: Generation::INITIAL,
            period,
            commands: command_rx,
            frames: frame_tx,
        };
        let task = tokio::spawn(driver.run());

        Self {
            commands,
            frames,
            task: Some(task),
        }
    }

    /// Starts revealing `graph`, cancelling any reveal in progress.
    pub fn present(&self, generation: Generation, graph: Arc<Graph>) -> Result<()> {
        self.commands
            .send(RevealCommand::Present { generation, graph })
            .map_err(|_| PipelineError::Shutdown)
    }

    /// Subscribes to reveal frames.
    pub fn subscribe(&self) -> watch::Receiver<RevealFrame> {
        self.frames.clone()
    }

    /// Latest frame.
    pub fn current(&self) -> RevealFrame {
        self.frames.borrow().clone()
    }

    /// Stops the task and waits for it to exit.
    pub async fn shutdown(mut self) -> Result<()> {
        let _ = self.commands.send(RevealCommand::Teardown);
        if let Some(task) = self.task.take() {
            task.await.map_err(|_| PipelineError::Shutdown)?;
        }
        Ok(())
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.commands.send(RevealCommand::Teardown);
        }
    }
}

struct RevealDriver {
    scheduler: RevealScheduler,
    generation: Generation,
    period: Duration,
    commands: mpsc::UnboundedReceiver<RevealCommand>,
    frames: watch::Sender<RevealFrame>,
}

impl RevealDriver {
    async fn run(mut self) {
        let mut ticker: Option<Interval> = None;
        debug!(period_ms = self.period.as_millis() as u64, "reveal driver started");

        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(RevealCommand::Present { generation, graph }) => {
                        if generation < self.generation {
                            debug!(generation = %generation, current = %self.generation, "ignoring stale graph");
                            continue;
                        }
                        self.generation = generation;
                        let step = self.scheduler.present(graph);
                        ticker = step.state.needs_ticks().then(|| self.new_ticker());
                        debug!(
                            generation = %generation,
                            nodes = self.scheduler.total(),
                            "reveal started"
                        );
                        self.publish(step);
                    }
                    Some(RevealCommand::Teardown) | None => {
                        ticker = None;
                        self.scheduler.teardown();
                        break;
                    }
                },
                _ = next_tick(&mut ticker), if ticker.is_some() => {
                    if let Some(step) = self.scheduler.tick() {
                        if !step.state.needs_ticks() {
                            ticker = None;
                        }
                        self.publish(step);
                    }
                }
            }
        }

        drop(ticker);
        debug!("reveal driver stopped");
    }

    fn new_ticker(&self) -> Interval {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    fn publish(&self, step: RevealStep) {
        trace!(
            generation = %self.generation,
            visible = step.visible.node_count(),
            state = ?step.state,
            "reveal frame"
        );
        self.frames.send_replace(RevealFrame {
            generation: self.generation,
            visible: step.visible,
            state: step.state,
            total_nodes: self.scheduler.total(),
        });
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartograph_models::{GraphEdge, GraphNode, NodeKind};

    fn graph(n: usize) -> Arc<Graph> {
        let nodes = (0..n)
            .map(|i| GraphNode::new(format!("n{}", i), format!("n{}.py", i), NodeKind::Core))
            .collect();
        let edges = (1..n)
            .map(|i| GraphEdge::new(format!("n{}", i), "n0", "imports"))
            .collect();
        Arc::new(Graph::new(nodes, edges))
    }

    async fn next_frame(frames: &mut watch::Receiver<RevealFrame>) -> RevealFrame {
        frames.changed().await.unwrap();
        frames.borrow_and_update().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveals_one_node_per_tick() {
        let handle = RevealHandle::spawn(Duration::from_millis(50));
        let mut frames = handle.subscribe();
        let full = graph(3);

        handle.present(Generation::from_raw(1), Arc::clone(&full)).unwrap();

        let frame = next_frame(&mut frames).await;
        assert_eq!(frame.state, RevealState::Revealing);
        assert_eq!(frame.visible.node_count(), 0);
        assert_eq!(frame.total_nodes, 3);

        for expected in 1..=3 {
            let frame = next_frame(&mut frames).await;
            assert_eq!(frame.visible.node_count(), expected);
            assert_eq!(frame.visible.edge_count(), expected - 1);
            assert!(frame.visible.is_consistent());
        }
        assert!(handle.current().is_complete());
        assert!(Arc::ptr_eq(&handle.current().visible, &full));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_graph_cancels_pending_ticks() {
        let handle = RevealHandle::spawn(Duration::from_millis(50));
        let mut frames = handle.subscribe();

        handle.present(Generation::from_raw(1), graph(10)).unwrap();
        next_frame(&mut frames).await;
        next_frame(&mut frames).await;

        let replacement = graph(2);
        handle.present(Generation::from_raw(2), Arc::clone(&replacement)).unwrap();

        let frame = next_frame(&mut frames).await;
        assert_eq!(frame.generation, Generation::from_raw(2));
        assert_eq!(frame.visible.node_count(), 0);
        assert_eq!(frame.total_nodes, 2);

        next_frame(&mut frames).await;
        let frame = next_frame(&mut frames).await;
        assert!(frame.is_complete());
        assert!(Arc::ptr_eq(&frame.visible, &replacement));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!frames.has_changed().unwrap());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_graph_never_ticks() {
        let handle = RevealHandle::spawn(Duration::from_millis(50));
        let mut frames = handle.subscribe();

        handle.present(Generation::from_raw(1), Arc::new(Graph::empty())).unwrap();

        let frame = next_frame(&mut frames).await;
        assert!(frame.is_complete());
        assert!(frame.visible.is_empty());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!frames.has_changed().unwrap());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_is_ignored() {
        let handle = RevealHandle::spawn(Duration::from_millis(50));
        let mut frames = handle.subscribe();

        handle.present(Generation::from_raw(5), graph(1)).unwrap();
        handle.present(Generation::from_raw(4), graph(7)).unwrap();

        next_frame(&mut frames).await;
        let frame = next_frame(&mut frames).await;
        assert!(frame.is_complete());
        assert_eq!(frame.generation, Generation::from_raw(5));
        assert_eq!(frame.total_nodes, 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_ticks() {
        let handle = RevealHandle::spawn(Duration::from_millis(50));
        let mut frames = handle.subscribe();

        handle.present(Generation::from_raw(1), graph(4)).unwrap();
        next_frame(&mut frames).await;

        handle.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(frames.changed().await.is_err());
        assert_eq!(frames.borrow().visible.node_count(), 0);
    }
}
