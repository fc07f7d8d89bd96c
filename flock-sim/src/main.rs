use anyhow::{ensure, Context, Result};
use clap::Parser;
use flock_shared::SimConfig;
use flock_sim::coordinator::Coordinator;
use flock_sim::telemetry::Telemetry;
use flock_sim::transport;
use flock_sim::worker::Worker;

#[derive(Parser, Debug)]
#[command(author, version, about = "Distributed boid flocking simulation", long_about = None)]
struct Args {
    /// Number of boids to simulate
    #[arg(short, long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    boids: u32,

    /// Number of simulation ticks to run
    #[arg(short, long, default_value_t = 500, value_parser = clap::value_parser!(u32).range(1..))]
    loops: u32,

    /// Nearest neighbors considered per boid (clamped to boids - 1)
    #[arg(short, long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(1..))]
    k: u32,

    /// Maximum boid speed
    #[arg(long, default_value_t = 10.0)]
    maxv: f64,

    /// Maximum boid acceleration per tick
    #[arg(long, default_value_t = 2.5)]
    acc: f64,

    /// Arena width
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Arena height
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Worker tasks to spawn (defaults to available parallelism minus one)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    workers: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Suppress per-boid telemetry lines
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    ensure!(args.maxv > 0.0, "max speed must be positive");
    ensure!(args.acc > 0.0, "max acceleration must be positive");

    let workers = args.workers.map(|w| w as usize).unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(1)
    });

    let config = SimConfig {
        boids: args.boids as usize,
        loops: args.loops as usize,
        k: args.k as usize,
        max_speed: args.maxv,
        accel: args.acc,
        width: args.width,
        height: args.height,
    };

    log::info!(
        "starting simulation: {} boids, {} ticks, k={}, {} workers",
        config.boids,
        config.loops,
        config.effective_k(),
        workers
    );

    let (endpoint, worker_endpoints) = transport::network(workers);

    let mut handles = Vec::with_capacity(workers);
    for worker_endpoint in worker_endpoints {
        let worker = Worker::new(config.clone(), worker_endpoint);
        handles.push(tokio::spawn(worker.run()));
    }

    let telemetry = Telemetry::new(std::io::stdout(), !args.quiet);
    let mut coordinator = Coordinator::new(config, endpoint, telemetry);
    coordinator.run().await.context("coordinator failed")?;

    for handle in handles {
        handle
            .await
            .context("worker task panicked")?
            .context("worker failed")?;
    }

    log::info!("simulation complete");
    Ok(())
}
