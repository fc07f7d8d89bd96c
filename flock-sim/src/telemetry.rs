//! Run-start report and per-tick boid output.

use std::io::Write;

use anyhow::Result;
use flock_core::Boid;
use flock_shared::SimConfig;

/// Writes the run header and, unless suppressed, one line per boid per tick.
pub struct Telemetry<W: Write> {
    out: W,
    per_boid: bool,
}

impl<W: Write> Telemetry<W> {
    pub fn new(out: W, per_boid: bool) -> Self {
        Self { out, per_boid }
    }

    /// One-time delimited block of resolved configuration values.
    pub fn run_header(&mut self, config: &SimConfig) -> Result<()> {
        writeln!(self.out, "{}", config.header())?;
        Ok(())
    }

    /// One line per boid per tick: `id pos.x pos.y vel.x vel.y`.
    pub fn boid_line(&mut self, boid: &Boid) -> Result<()> {
        if self.per_boid {
            writeln!(
                self.out,
                "{} {:.6} {:.6} {:.6} {:.6}",
                boid.id, boid.position.x, boid.position.y, boid.velocity.x, boid.velocity.y
            )?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
