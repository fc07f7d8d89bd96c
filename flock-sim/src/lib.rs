//! Coordinator/worker flocking simulation over an in-process transport.
//!
//! Every tick runs two phases. Phase 1: the coordinator broadcasts the full
//! population, one boid at a time, and every worker refreshes its mirror.
//! Phase 2: the coordinator farms individual boids out to available workers,
//! collects updated state asynchronously, and signals tick completion once
//! every boid has been dealt and reported back.

pub mod coordinator;
pub mod registry;
pub mod telemetry;
pub mod transport;
pub mod worker;
