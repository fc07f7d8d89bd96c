//! The coordinator: owns the authoritative population and drives both phases.

use std::collections::VecDeque;
use std::io::Write;

use anyhow::{anyhow, Context, Result};
use flock_core::Boid;
use flock_shared::SimConfig;

use crate::registry::ClientRegistry;
use crate::telemetry::Telemetry;
use crate::transport::{apply, pack, CoordinatorEndpoint};

/// Per-tick accounting, kept for inspection after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    /// Boids sent out as assignments
    pub dealt: usize,
    /// Results collected back from workers
    pub reported: usize,
    /// Tick-completion signals sent during the drain
    pub done_signals: usize,
}

/// Drives the per-tick protocol: Broadcasting, then Farming, then Draining.
///
/// Every boid is owned by exactly one container at any instant: the pending
/// queue, the in-flight queue, or the transport. The registry's pools and
/// both queues are touched only by this control loop, so no locking is
/// involved.
pub struct Coordinator<W: Write> {
    config: SimConfig,
    endpoint: CoordinatorEndpoint,
    registry: ClientRegistry,
    pending: VecDeque<Boid>,
    in_flight: VecDeque<Boid>,
    telemetry: Telemetry<W>,
    stats: Vec<TickStats>,
}

impl<W: Write> Coordinator<W> {
    /// Seed a random population and register every worker as available.
    pub fn new(config: SimConfig, endpoint: CoordinatorEndpoint, telemetry: Telemetry<W>) -> Self {
        let pending = (0..config.boids)
            .map(|i| {
                Boid::random(
                    i as u32,
                    config.width as f64,
                    config.height as f64,
                    config.max_speed,
                )
            })
            .collect();
        let ranks: Vec<usize> = endpoint.worker_ranks().collect();

        Self {
            config,
            endpoint,
            registry: ClientRegistry::new(ranks),
            pending,
            in_flight: VecDeque::new(),
            telemetry,
            stats: Vec::new(),
        }
    }

    /// Run the configured number of ticks to completion.
    pub async fn run(&mut self) -> Result<()> {
        self.telemetry.run_header(&self.config)?;

        for tick in 0..self.config.loops {
            log::debug!("coordinator entering tick {tick}");
            self.broadcast_phase()
                .await
                .with_context(|| format!("broadcast phase of tick {tick}"))?;
            let mut stats = self
                .farm_phase()
                .await
                .with_context(|| format!("farm phase of tick {tick}"))?;
            stats.done_signals = self
                .drain()
                .with_context(|| format!("drain of tick {tick}"))?;
            self.stats.push(stats);
        }
        Ok(())
    }

    /// Phase 1: emit every boid, in rotation order, to all workers.
    async fn broadcast_phase(&mut self) -> Result<()> {
        self.endpoint.barrier().await;
        for _ in 0..self.config.boids {
            let boid = self
                .pending
                .pop_front()
                .ok_or_else(|| anyhow!("pending queue exhausted during broadcast"))?;
            self.telemetry.boid_line(&boid)?;
            self.endpoint.broadcast(&pack(&boid))?;
            self.pending.push_back(boid);
        }
        Ok(())
    }

    /// Phase 2: deal boids to available workers and collect results until
    /// every boid has been dealt and reported back.
    async fn farm_phase(&mut self) -> Result<TickStats> {
        self.endpoint.barrier().await;
        let total = self.config.boids;
        let mut dealt = 0;
        let mut reported = 0;

        while dealt < total || reported < total {
            // Deal to every free worker before attempting one collection.
            while dealt < total && self.registry.has_available() {
                let boid = self
                    .pending
                    .pop_front()
                    .ok_or_else(|| anyhow!("pending queue exhausted during farming"))?;
                let rank = self
                    .registry
                    .assign(boid.id)
                    .ok_or_else(|| anyhow!("available pool emptied during assignment"))?;
                self.endpoint.send_assignment(rank, &pack(&boid))?;
                log::debug!("dealt boid {} to worker {rank}", boid.id);
                self.in_flight.push_back(boid);
                dealt += 1;
            }

            if reported < total {
                match self.endpoint.try_recv_result() {
                    Some(frame) => {
                        let boid_id = self.registry.complete(frame.source).ok_or_else(|| {
                            anyhow!("result from worker {} which holds no assignment", frame.source)
                        })?;
                        let idx = self
                            .in_flight
                            .iter()
                            .position(|boid| boid.id == boid_id)
                            .ok_or_else(|| anyhow!("no in-flight boid {boid_id}"))?;
                        let mut boid = self
                            .in_flight
                            .remove(idx)
                            .ok_or_else(|| anyhow!("in-flight queue lost boid {boid_id}"))?;
                        apply(&mut boid, &frame.state);
                        self.pending.push_back(boid);
                        reported += 1;
                        log::debug!("collected boid {boid_id} from worker {}", frame.source);
                    }
                    None => tokio::task::yield_now().await,
                }
            }
        }

        Ok(TickStats {
            dealt,
            reported,
            done_signals: 0,
        })
    }

    /// Tick completion: one Done signal to every worker.
    fn drain(&mut self) -> Result<usize> {
        let ranks: Vec<usize> = self.endpoint.worker_ranks().collect();
        for rank in &ranks {
            self.endpoint.send_done(*rank)?;
        }
        Ok(ranks.len())
    }

    /// Accounting for every completed tick, in order.
    pub fn stats(&self) -> &[TickStats] {
        &self.stats
    }

    /// The current population, in rotation order.
    pub fn boids(&self) -> impl Iterator<Item = &Boid> {
        self.pending.iter()
    }

    pub fn into_telemetry(self) -> Telemetry<W> {
        self.telemetry
    }
}
