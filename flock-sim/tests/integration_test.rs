use std::sync::{Arc, Mutex};

use anyhow::Result;
use flock_shared::SimConfig;
use flock_sim::coordinator::{Coordinator, TickStats};
use flock_sim::telemetry::Telemetry;
use flock_sim::transport;
use flock_sim::worker::Worker;

/// Everything observable after a full run: per-tick accounting, the raw
/// telemetry lines, and the final population.
struct RunOutcome {
    stats: Vec<TickStats>,
    lines: Vec<String>,
    final_ids: Vec<u32>,
    final_positions: Vec<(f64, f64)>,
    max_final_speed: f64,
}

/// Wire up a network, spawn the workers, run the coordinator to completion
/// and join every worker.
async fn run_sim(config: SimConfig, workers: usize) -> Result<RunOutcome> {
    let (endpoint, worker_endpoints) = transport::network(workers);

    let mut handles = Vec::with_capacity(workers);
    for worker_endpoint in worker_endpoints {
        let worker = Worker::new(config.clone(), worker_endpoint);
        handles.push(tokio::spawn(worker.run()));
    }

    let telemetry = Telemetry::new(Vec::new(), true);
    let mut coordinator = Coordinator::new(config, endpoint, telemetry);
    coordinator.run().await?;

    for handle in handles {
        handle.await??;
    }

    let stats = coordinator.stats().to_vec();
    let mut final_ids: Vec<u32> = coordinator.boids().map(|b| b.id).collect();
    final_ids.sort_unstable();
    let final_positions: Vec<(f64, f64)> = coordinator
        .boids()
        .map(|b| (b.position.x, b.position.y))
        .collect();
    let max_final_speed = coordinator
        .boids()
        .map(|b| b.velocity.magnitude())
        .fold(0.0, f64::max);

    let output = String::from_utf8(coordinator.into_telemetry().into_inner())?;
    let lines = output.lines().map(String::from).collect();

    Ok(RunOutcome {
        stats,
        lines,
        final_ids,
        final_positions,
        max_final_speed,
    })
}

fn small_config(boids: usize, loops: usize, k: usize) -> SimConfig {
    SimConfig {
        boids,
        loops,
        k,
        max_speed: 10.0,
        accel: 2.5,
        width: 100,
        height: 100,
    }
}

#[tokio::test]
async fn test_single_tick_accounting() -> Result<()> {
    let outcome = run_sim(small_config(4, 1, 2), 2).await?;

    // Exactly 4 assignments, 4 results and 2 completion signals for the tick
    assert_eq!(
        outcome.stats,
        vec![TickStats {
            dealt: 4,
            reported: 4,
            done_signals: 2,
        }]
    );

    // 3 header lines plus one telemetry line per boid
    assert_eq!(outcome.lines.len(), 3 + 4);
    assert_eq!(outcome.lines[0], "#header");
    assert_eq!(outcome.lines[2], "#endheader");

    // No boid dropped or duplicated
    assert_eq!(outcome.final_ids, vec![0, 1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_every_boid_broadcast_each_tick() -> Result<()> {
    let outcome = run_sim(small_config(5, 3, 2), 2).await?;

    // One line per boid per tick after the header block
    let boid_lines = &outcome.lines[3..];
    assert_eq!(boid_lines.len(), 5 * 3);

    // Within each tick, all 5 ids appear exactly once
    for tick_lines in boid_lines.chunks(5) {
        let mut ids: Vec<&str> = tick_lines
            .iter()
            .map(|line| line.split_whitespace().next().unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    }
    Ok(())
}

#[tokio::test]
async fn test_multi_tick_invariants() -> Result<()> {
    let outcome = run_sim(small_config(6, 5, 3), 3).await?;

    assert_eq!(outcome.stats.len(), 5);
    for stats in &outcome.stats {
        assert_eq!(stats.dealt, 6);
        assert_eq!(stats.reported, 6);
        assert_eq!(stats.done_signals, 3);
    }

    assert_eq!(outcome.final_ids, vec![0, 1, 2, 3, 4, 5]);
    assert!(outcome.max_final_speed <= 10.0 + 1e-9);

    // The wrap runs before the velocity is applied, so a boid can end a tick
    // at most one max-speed step outside the arena
    for (x, y) in &outcome.final_positions {
        assert!(*x >= -10.0 && *x < 100.0 + 10.0, "x out of range: {x}");
        assert!(*y >= -10.0 && *y < 100.0 + 10.0, "y out of range: {y}");
    }
    Ok(())
}

#[tokio::test]
async fn test_each_boid_dealt_exactly_once_per_tick() -> Result<()> {
    let config = small_config(5, 3, 2);
    let workers = 2;
    let (endpoint, worker_endpoints) = transport::network(workers);

    // Every assignment a worker receives, tagged with the tick it arrived in
    let dealt_log: Arc<Mutex<Vec<(usize, u32)>>> = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::with_capacity(workers);
    for mut worker in worker_endpoints {
        let dealt_log = dealt_log.clone();
        let loops = config.loops;
        let boids = config.boids;
        handles.push(tokio::spawn(async move {
            for tick in 0..loops {
                worker.barrier().await;
                for _ in 0..boids {
                    worker.recv_broadcast().await.unwrap();
                }
                worker.barrier().await;
                loop {
                    if let Some(state) = worker.try_recv_assignment() {
                        dealt_log.lock().unwrap().push((tick, state.id));
                        worker.send_result(&state).unwrap();
                    }
                    if worker.try_recv_done() {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
            }
        }));
    }

    let telemetry = Telemetry::new(Vec::new(), true);
    let mut coordinator = Coordinator::new(config, endpoint, telemetry);
    coordinator.run().await?;
    for handle in handles {
        handle.await?;
    }

    // Within each tick, the assignments across both workers cover every boid
    // id exactly once: nothing dealt twice, nothing skipped
    let log = dealt_log.lock().unwrap();
    for tick in 0..3 {
        let mut ids: Vec<u32> = log
            .iter()
            .filter(|(t, _)| *t == tick)
            .map(|(_, id)| *id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3, 4], "tick {tick}");
    }
    Ok(())
}

#[tokio::test]
async fn test_more_workers_than_boids() -> Result<()> {
    let outcome = run_sim(small_config(2, 2, 1), 4).await?;

    for stats in &outcome.stats {
        assert_eq!(stats.dealt, 2);
        assert_eq!(stats.reported, 2);
        assert_eq!(stats.done_signals, 4);
    }
    assert_eq!(outcome.final_ids, vec![0, 1]);
    Ok(())
}

#[tokio::test]
async fn test_oversized_k_is_clamped() -> Result<()> {
    // K=10 against a population of 3 must clamp to 2 and still complete
    let outcome = run_sim(small_config(3, 2, 10), 2).await?;

    assert_eq!(outcome.stats.len(), 2);
    assert_eq!(outcome.final_ids, vec![0, 1, 2]);
    Ok(())
}

#[tokio::test]
async fn test_single_worker_handles_whole_population() -> Result<()> {
    let outcome = run_sim(small_config(5, 2, 2), 1).await?;

    for stats in &outcome.stats {
        assert_eq!(stats.dealt, 5);
        assert_eq!(stats.reported, 5);
        assert_eq!(stats.done_signals, 1);
    }
    assert_eq!(outcome.final_ids, vec![0, 1, 2, 3, 4]);
    Ok(())
}
