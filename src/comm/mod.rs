//! Collective-communication collaborators.
//!
//! Ranks cooperate through exactly three collectives: a count reduction
//! and a variable-length event gather once per step (and only when
//! three-particle binding is active), plus a parameter broadcast when the
//! configuration changes. There is no point-to-point messaging; every
//! rank must enter each collective or the run deadlocks.
//!
//! [`SingleRank`] is the degenerate single-process implementation.
//! [`LocalCluster`] is a shared-memory, barrier-synchronized implementation
//! with one thread per rank, used to exercise the multi-rank invariants
//! without an MPI launcher. An MPI-backed driver implements
//! [`Communicator`] over its own transport.

mod local;

pub use local::{LocalCluster, LocalComm};

use crate::{CollisionConfig, CollisionEvent};

/// The collective operations the collision pipeline needs.
pub trait Communicator {
    /// This rank's index in `0..size()`.
    fn rank(&self) -> usize;

    /// Number of participating ranks.
    fn size(&self) -> usize;

    /// Sum of `local` over all ranks. Collective.
    fn reduce_count(&self, local: usize) -> usize;

    /// Concatenation of every rank's events, in rank order, identical on
    /// all ranks. Collective.
    fn gather_events(&self, local: &[CollisionEvent]) -> Vec<CollisionEvent>;

    /// Rank 0's configuration, replicated to all ranks. Collective.
    fn broadcast_config(&self, config: &CollisionConfig) -> CollisionConfig;
}

/// Trivial communicator for single-process runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleRank;

impl Communicator for SingleRank {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn reduce_count(&self, local: usize) -> usize {
        local
    }

    fn gather_events(&self, local: &[CollisionEvent]) -> Vec<CollisionEvent> {
        local.to_vec()
    }

    fn broadcast_config(&self, config: &CollisionConfig) -> CollisionConfig {
        config.clone()
    }
}
