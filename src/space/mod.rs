//! Spatial-partition collaborators for neighbor search.
//!
//! The three-particle binding phase needs to find candidate third particles
//! near a collision. Which search it runs depends on the partitioning
//! scheme the driver has active, queried through [`Partition`]:
//!
//! - [`CellGrid`] reports itself cell-indexed; the search scans only the
//!   27-cell neighborhoods of the colliding pair.
//! - [`SweepList`] models an unstructured scheme; the search falls back to
//!   a full sweep over all locally stored particles.

mod grid;

pub use grid::CellGrid;

use crate::model::particle::ParticleId;

/// Integer cell coordinates in a uniform cell grid.
pub type CellKey = (i32, i32, i32);

/// Interface to the active spatial-partitioning scheme of one rank.
pub trait Partition {
    /// Whether the scheme maps positions to cells. Non-cell-indexed schemes
    /// force the full-sweep neighbor search.
    fn is_cell_indexed(&self) -> bool;

    /// Cell containing `position`, or `None` for non-cell-indexed schemes.
    fn cell_of(&self, position: [f64; 3]) -> Option<CellKey>;

    /// Particle ids stored in `cell` and its 26 neighboring cells.
    fn neighborhood(&self, cell: CellKey) -> Vec<ParticleId>;

    /// All locally stored particle ids, ghosts included.
    fn stored_ids(&self) -> Vec<ParticleId>;
}

/// Unstructured particle list, for drivers without a cell system.
#[derive(Debug, Clone, Default)]
pub struct SweepList {
    ids: Vec<ParticleId>,
}

impl SweepList {
    pub fn new(ids: Vec<ParticleId>) -> Self {
        Self { ids }
    }
}

impl Partition for SweepList {
    fn is_cell_indexed(&self) -> bool {
        false
    }

    fn cell_of(&self, _position: [f64; 3]) -> Option<CellKey> {
        None
    }

    fn neighborhood(&self, _cell: CellKey) -> Vec<ParticleId> {
        Vec::new()
    }

    fn stored_ids(&self) -> Vec<ParticleId> {
        self.ids.clone()
    }
}
