//! Uniform cell grid for cell-indexed neighbor search.
//!
//! Divides space into cubic cells of the interaction range and stores
//! particle ids per cell, so that all particles within one cutoff of a
//! point are found by scanning a 27-cell neighborhood.

use std::collections::HashMap;

use super::{CellKey, Partition};
use crate::model::particle::ParticleId;

/// Grid-based spatial partition over one rank's stored particles.
#[derive(Debug, Clone)]
pub struct CellGrid {
    /// Inverse cell size for fast coordinate-to-cell conversion.
    inv_cell_size: f64,
    /// Map from cell coordinates to stored particle ids.
    cells: HashMap<CellKey, Vec<ParticleId>>,
}

impl CellGrid {
    /// Creates an empty grid with the given cell size.
    ///
    /// The cell size should be at least the collision threshold so that a
    /// 27-cell scan covers the full search radius.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size <= 0.0`.
    pub fn new(cell_size: f64) -> Self {
        assert!(cell_size > 0.0, "cell size must be positive");
        Self {
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
        }
    }

    /// Creates a grid and populates it from `(id, position)` pairs.
    pub fn from_particles<I>(particles: I, cell_size: f64) -> Self
    where
        I: IntoIterator<Item = (ParticleId, [f64; 3])>,
    {
        let mut grid = Self::new(cell_size);
        for (id, position) in particles {
            grid.insert(id, position);
        }
        grid
    }

    fn cell_coords(&self, position: [f64; 3]) -> CellKey {
        (
            (position[0] * self.inv_cell_size).floor() as i32,
            (position[1] * self.inv_cell_size).floor() as i32,
            (position[2] * self.inv_cell_size).floor() as i32,
        )
    }

    /// Inserts a particle id at the given position.
    pub fn insert(&mut self, id: ParticleId, position: [f64; 3]) {
        let cell = self.cell_coords(position);
        self.cells.entry(cell).or_default().push(id);
    }
}

impl Partition for CellGrid {
    fn is_cell_indexed(&self) -> bool {
        true
    }

    fn cell_of(&self, position: [f64; 3]) -> Option<CellKey> {
        Some(self.cell_coords(position))
    }

    fn neighborhood(&self, cell: CellKey) -> Vec<ParticleId> {
        let (cx, cy, cz) = cell;
        let mut ids = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(stored) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) {
                        ids.extend_from_slice(stored);
                    }
                }
            }
        }
        ids
    }

    fn stored_ids(&self) -> Vec<ParticleId> {
        let mut ids: Vec<_> = self.cells.values().flatten().copied().collect();
        ids.sort_unstable();
        ids
    }
}
