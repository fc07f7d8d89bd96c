//! The worker: mirrors the population and handles farmed assignments.

use anyhow::Result;
use flock_core::rules::{self, RuleParams};
use flock_core::{k_nearest, Boid, Vector2D};
use flock_shared::SimConfig;

use crate::transport::{apply, pack, unpack, WorkerEndpoint};

/// One worker process: refreshes its mirror every tick, then polls for
/// assignments until the coordinator signals the tick complete.
pub struct Worker {
    endpoint: WorkerEndpoint,
    config: SimConfig,
    params: RuleParams,
    mirror: Vec<Boid>,
}

impl Worker {
    /// Pre-allocate one mirror slot per boid. Slots are keyed by position in
    /// the broadcast sequence, not by boid id; each broadcast overwrites its
    /// slot wholesale.
    pub fn new(config: SimConfig, endpoint: WorkerEndpoint) -> Self {
        let mirror = (0..config.boids)
            .map(|i| Boid::new(i as u32, Vector2D::zero(), Vector2D::zero()))
            .collect();
        let params = RuleParams {
            max_speed: config.max_speed,
            max_accel: config.accel,
            arena_width: config.width as f64,
            arena_height: config.height as f64,
            ..RuleParams::default()
        };

        Self {
            endpoint,
            config,
            params,
            mirror,
        }
    }

    /// Participate in every tick of the simulation.
    pub async fn run(mut self) -> Result<()> {
        let k = self.config.effective_k();
        for tick in 0..self.config.loops {
            self.mirror_phase().await?;
            self.farm_phase(k).await?;
            log::debug!("worker {} finished tick {tick}", self.endpoint.rank());
        }
        Ok(())
    }

    /// Phase 1: refresh every mirror slot from the broadcast stream, in the
    /// coordinator's emission order.
    async fn mirror_phase(&mut self) -> Result<()> {
        self.endpoint.barrier().await;
        for slot in 0..self.mirror.len() {
            let state = self.endpoint.recv_broadcast().await?;
            apply(&mut self.mirror[slot], &state);
        }
        Ok(())
    }

    /// Phase 2: handle assignments as they arrive; leave the phase when the
    /// tick-completion signal is consumed.
    async fn farm_phase(&mut self, k: usize) -> Result<()> {
        self.endpoint.barrier().await;
        loop {
            if let Some(state) = self.endpoint.try_recv_assignment() {
                let mut boid = unpack(&state);
                let nearest = k_nearest(&boid, &self.mirror, k);
                rules::update(&mut boid, &nearest, &self.params);
                self.endpoint.send_result(&pack(&boid))?;
            }
            if self.endpoint.try_recv_done() {
                return Ok(());
            }
            tokio::task::yield_now().await;
        }
    }

    /// The worker's current view of the population.
    pub fn mirror(&self) -> &[Boid] {
        &self.mirror
    }
}
