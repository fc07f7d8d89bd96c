//! Ordered-by-distance neighbor selection.

use crate::Boid;

/// A candidate boid annotated with its distance to the current subject.
///
/// Entries are transient: a worker rebuilds them from its mirror for every
/// assignment it handles.
#[derive(Debug, Clone)]
pub struct NeighborEntry {
    pub boid: Boid,
    pub distance: f64,
}

/// Holds candidate boids in ascending order of distance to a subject boid.
///
/// Distances are recomputed relative to the subject on every sort, so the
/// same set of candidates can be re-sorted against different subjects.
#[derive(Debug, Default)]
pub struct NeighborQueue {
    entries: Vec<NeighborEntry>,
}

impl NeighborQueue {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a queue over cloned snapshots of `candidates`.
    pub fn from_candidates(candidates: &[Boid]) -> Self {
        Self {
            entries: candidates
                .iter()
                .map(|boid| NeighborEntry {
                    boid: boid.clone(),
                    distance: 0.0,
                })
                .collect(),
        }
    }

    pub fn push(&mut self, boid: Boid) {
        self.entries.push(NeighborEntry {
            boid,
            distance: 0.0,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recompute every distance relative to `subject`, then sort ascending.
    /// The sort is stable: candidates at equal distance keep input order.
    pub fn sort_by_distance(&mut self, subject: &Boid) {
        for entry in &mut self.entries {
            entry.distance = subject.position.distance(&entry.boid.position);
        }
        self.entries.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    }

    /// Remove and return the entry at the head of the queue.
    pub fn pop_front(&mut self) -> Option<NeighborEntry> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &NeighborEntry> {
        self.entries.iter()
    }
}

/// Select the `k` nearest neighbors of `subject` from the full mirror.
///
/// The mirror includes the subject itself; its zero-distance entry sorts to
/// the head and is discarded before the `k` nearest are taken. The caller is
/// responsible for clamping `k` to the population size minus one.
pub fn k_nearest(subject: &Boid, mirror: &[Boid], k: usize) -> Vec<NeighborEntry> {
    let mut queue = NeighborQueue::from_candidates(mirror);
    queue.sort_by_distance(subject);

    // The subject's own mirror slot
    let _ = queue.pop_front();

    let mut nearest = Vec::with_capacity(k);
    for _ in 0..k {
        match queue.pop_front() {
            Some(entry) => nearest.push(entry),
            None => break,
        }
    }
    nearest
}
