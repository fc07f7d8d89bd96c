//! In-process message transport between the coordinator and workers.
//!
//! Provides the collective operations the two-phase protocol needs: reliable
//! point-to-point send/receive, one-to-all broadcast, a barrier, and
//! non-blocking probes. Work items and tick-completion signals travel on
//! separate channels, which stands in for message tags; result frames carry
//! the sender's rank so the coordinator can match them to busy workers.
//!
//! Channels are unbounded, so sends never block. A closed channel is a fatal
//! transport failure; the protocol performs no retries.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use flock_core::{Boid, Vector2D};
use flock_shared::BoidState;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Barrier;

/// Pack a boid into its wire record.
pub fn pack(boid: &Boid) -> BoidState {
    BoidState::new(
        boid.id,
        boid.position.x,
        boid.position.y,
        boid.velocity.x,
        boid.velocity.y,
    )
}

/// Unpack a wire record into a fresh boid.
pub fn unpack(state: &BoidState) -> Boid {
    Boid::new(
        state.id,
        Vector2D::new(state.pos_x, state.pos_y),
        Vector2D::new(state.vel_x, state.vel_y),
    )
}

/// Overwrite a boid's fields in place from a wire record.
pub fn apply(boid: &mut Boid, state: &BoidState) {
    boid.id = state.id;
    boid.position = Vector2D::new(state.pos_x, state.pos_y);
    boid.velocity = Vector2D::new(state.vel_x, state.vel_y);
}

/// A worker's result message, tagged with its source rank.
#[derive(Debug, Clone, Copy)]
pub struct ResultFrame {
    pub source: usize,
    pub state: BoidState,
}

/// Coordinator-side sender handles for one worker.
struct WorkerLink {
    rank: usize,
    bcast_tx: UnboundedSender<BoidState>,
    work_tx: UnboundedSender<BoidState>,
    done_tx: UnboundedSender<()>,
}

/// Coordinator side of the transport.
pub struct CoordinatorEndpoint {
    barrier: Arc<Barrier>,
    links: Vec<WorkerLink>,
    result_rx: UnboundedReceiver<ResultFrame>,
}

/// Worker side of the transport.
pub struct WorkerEndpoint {
    rank: usize,
    barrier: Arc<Barrier>,
    bcast_rx: UnboundedReceiver<BoidState>,
    work_rx: UnboundedReceiver<BoidState>,
    done_rx: UnboundedReceiver<()>,
    result_tx: UnboundedSender<ResultFrame>,
}

/// Build a network of one coordinator and `workers` worker endpoints.
///
/// Worker ranks start at 1; rank 0 is the coordinator.
pub fn network(workers: usize) -> (CoordinatorEndpoint, Vec<WorkerEndpoint>) {
    let barrier = Arc::new(Barrier::new(workers + 1));
    let (result_tx, result_rx) = mpsc::unbounded_channel();

    let mut links = Vec::with_capacity(workers);
    let mut endpoints = Vec::with_capacity(workers);
    for rank in 1..=workers {
        let (bcast_tx, bcast_rx) = mpsc::unbounded_channel();
        let (work_tx, work_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        links.push(WorkerLink {
            rank,
            bcast_tx,
            work_tx,
            done_tx,
        });
        endpoints.push(WorkerEndpoint {
            rank,
            barrier: barrier.clone(),
            bcast_rx,
            work_rx,
            done_rx,
            result_tx: result_tx.clone(),
        });
    }

    (
        CoordinatorEndpoint {
            barrier,
            links,
            result_rx,
        },
        endpoints,
    )
}

impl CoordinatorEndpoint {
    pub fn worker_ranks(&self) -> impl Iterator<Item = usize> + '_ {
        self.links.iter().map(|link| link.rank)
    }

    /// Wait until every process has reached the same phase boundary.
    pub async fn barrier(&self) {
        self.barrier.wait().await;
    }

    /// Deliver one record to every worker's broadcast inbox.
    pub fn broadcast(&self, state: &BoidState) -> Result<()> {
        for link in &self.links {
            link.bcast_tx
                .send(*state)
                .map_err(|_| anyhow!("broadcast to worker {} failed", link.rank))?;
        }
        Ok(())
    }

    /// Send one work item to a single worker.
    pub fn send_assignment(&self, rank: usize, state: &BoidState) -> Result<()> {
        self.link(rank)?
            .work_tx
            .send(*state)
            .map_err(|_| anyhow!("assignment send to worker {rank} failed"))
    }

    /// Send the tick-completion signal to a single worker.
    pub fn send_done(&self, rank: usize) -> Result<()> {
        self.link(rank)?
            .done_tx
            .send(())
            .map_err(|_| anyhow!("done send to worker {rank} failed"))
    }

    /// Non-blocking probe for a worker result.
    pub fn try_recv_result(&mut self) -> Option<ResultFrame> {
        self.result_rx.try_recv().ok()
    }

    fn link(&self, rank: usize) -> Result<&WorkerLink> {
        self.links
            .iter()
            .find(|link| link.rank == rank)
            .ok_or_else(|| anyhow!("unknown worker rank {rank}"))
    }
}

impl WorkerEndpoint {
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Wait until every process has reached the same phase boundary.
    pub async fn barrier(&self) {
        self.barrier.wait().await;
    }

    /// Blocking receive of the next phase-1 broadcast record.
    pub async fn recv_broadcast(&mut self) -> Result<BoidState> {
        self.bcast_rx
            .recv()
            .await
            .ok_or_else(|| anyhow!("broadcast channel closed"))
    }

    /// Non-blocking probe for a work item.
    pub fn try_recv_assignment(&mut self) -> Option<BoidState> {
        self.work_rx.try_recv().ok()
    }

    /// Non-blocking probe for the tick-completion signal; consumes it when present.
    pub fn try_recv_done(&mut self) -> bool {
        self.done_rx.try_recv().is_ok()
    }

    /// Send an updated boid back to the coordinator, tagged with this rank.
    pub fn send_result(&self, state: &BoidState) -> Result<()> {
        self.result_tx
            .send(ResultFrame {
                source: self.rank,
                state: *state,
            })
            .map_err(|_| anyhow!("result channel closed"))
    }
}
