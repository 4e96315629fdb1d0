//! Shared-memory communicator with one thread per rank.
//!
//! Each collective writes the calling rank's contribution into a shared
//! slot, waits at a barrier until every rank has written, reads the
//! combined result, and waits at a second barrier before returning so no
//! rank can overwrite a slot the others are still reading.

use std::sync::{Arc, Barrier, Mutex};

use super::Communicator;
use crate::{CollisionConfig, CollisionEvent};

#[derive(Debug)]
struct Shared {
    barrier: Barrier,
    counts: Mutex<Vec<usize>>,
    events: Mutex<Vec<Vec<CollisionEvent>>>,
    config: Mutex<Option<CollisionConfig>>,
}

/// Factory for the per-rank handles of a shared-memory cluster.
#[derive(Debug)]
pub struct LocalCluster;

impl LocalCluster {
    /// Creates `size` communicator handles, one per rank thread.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(size: usize) -> Vec<LocalComm> {
        assert!(size > 0, "cluster size must be positive");
        let shared = Arc::new(Shared {
            barrier: Barrier::new(size),
            counts: Mutex::new(vec![0; size]),
            events: Mutex::new(vec![Vec::new(); size]),
            config: Mutex::new(None),
        });
        (0..size)
            .map(|rank| LocalComm {
                rank,
                size,
                shared: Arc::clone(&shared),
            })
            .collect()
    }
}

/// One rank's handle into a [`LocalCluster`].
#[derive(Debug, Clone)]
pub struct LocalComm {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn reduce_count(&self, local: usize) -> usize {
        {
            let mut counts = self.shared.counts.lock().unwrap();
            counts[self.rank] = local;
        }
        self.shared.barrier.wait();
        let total = self.shared.counts.lock().unwrap().iter().sum();
        self.shared.barrier.wait();
        total
    }

    fn gather_events(&self, local: &[CollisionEvent]) -> Vec<CollisionEvent> {
        {
            let mut slots = self.shared.events.lock().unwrap();
            slots[self.rank] = local.to_vec();
        }
        self.shared.barrier.wait();
        let gathered = {
            let slots = self.shared.events.lock().unwrap();
            slots.iter().flatten().copied().collect()
        };
        self.shared.barrier.wait();
        gathered
    }

    fn broadcast_config(&self, config: &CollisionConfig) -> CollisionConfig {
        if self.rank == 0 {
            let mut slot = self.shared.config.lock().unwrap();
            *slot = Some(config.clone());
        }
        self.shared.barrier.wait();
        let replicated = {
            let slot = self.shared.config.lock().unwrap();
            slot.clone().expect("rank 0 published its configuration")
        };
        self.shared.barrier.wait();
        replicated
    }
}
