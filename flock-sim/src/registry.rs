//! Available/busy bookkeeping for the worker pool.

use std::collections::VecDeque;

/// Handle to one worker, tracking the boid it is currently handling.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerHandle {
    pub rank: usize,
    pub assigned: Option<u32>,
}

/// Two disjoint pools of worker handles.
///
/// Every handle is in exactly one pool at any instant. A handle moves to busy
/// only while holding an assigned boid id and returns to available only after
/// that id is cleared.
#[derive(Debug)]
pub struct ClientRegistry {
    available: VecDeque<WorkerHandle>,
    busy: Vec<WorkerHandle>,
}

impl ClientRegistry {
    pub fn new(ranks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            available: ranks
                .into_iter()
                .map(|rank| WorkerHandle {
                    rank,
                    assigned: None,
                })
                .collect(),
            busy: Vec::new(),
        }
    }

    pub fn has_available(&self) -> bool {
        !self.available.is_empty()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn busy_count(&self) -> usize {
        self.busy.len()
    }

    pub fn total(&self) -> usize {
        self.available.len() + self.busy.len()
    }

    /// Bind `boid_id` to the next available worker and move it to the busy
    /// pool. Returns the chosen worker's rank, or None if every worker is
    /// busy.
    pub fn assign(&mut self, boid_id: u32) -> Option<usize> {
        let mut handle = self.available.pop_front()?;
        handle.assigned = Some(boid_id);
        let rank = handle.rank;
        self.busy.push(handle);
        Some(rank)
    }

    /// Release the busy worker with the given rank, returning the boid id it
    /// was handling. Returns None if no busy worker matches, which the caller
    /// must treat as a protocol violation.
    pub fn complete(&mut self, rank: usize) -> Option<u32> {
        let idx = self.busy.iter().position(|handle| handle.rank == rank)?;
        let mut handle = self.busy.swap_remove(idx);
        let boid_id = handle.assigned.take();
        self.available.push_back(handle);
        boid_id
    }
}
