//! Collision policy flags, parameters, and their validation.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::model::particle::{BondTypeId, ParticleTypeId};
use crate::model::store::ParticleStore;

/// Fixed bond type joining the two virtual sites placed at one location
/// (the zero-length holding bond used by the pair and triangle modes).
pub const AUX_SITE_BOND: BondTypeId = 3;

/// Orthogonal collision policy flags.
///
/// Flags are independent capabilities, not a mode enum: several can be
/// active at once, and some imply others. [`expanded`](Self::expanded)
/// applies the implications in one explicit step; nothing else in the
/// pipeline ORs flags together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionMode {
    /// Insert a center bond between colliding particles.
    pub bond: bool,
    /// Place a virtual site on each collision partner, joined by a bond.
    pub vs_pair: bool,
    /// Glue a particle to a surface particle via one virtual site.
    pub glue_to_surface: bool,
    /// Place three site pairs at the corners of a triangle around the
    /// collision axis.
    pub triangle: bool,
    /// Bind a nearby third particle with an angle-bucketed bond.
    pub three_particles: bool,
    /// Surface a non-fatal runtime notice for every collision.
    pub exception: bool,
}

impl CollisionMode {
    /// Mode with no flag set; the pipeline is inactive.
    pub fn none() -> Self {
        Self::default()
    }

    /// True if any flag is set.
    pub fn is_active(&self) -> bool {
        self.bond
            || self.vs_pair
            || self.glue_to_surface
            || self.triangle
            || self.three_particles
            || self.exception
    }

    /// Applies the implied flags: every binding mode needs the center
    /// bond, so the virtual-site modes and three-particle binding all
    /// switch `bond` on.
    pub fn expanded(mut self) -> Self {
        if self.vs_pair || self.glue_to_surface || self.triangle || self.three_particles {
            self.bond = true;
        }
        self
    }

    /// True if any flag that creates virtual sites is set.
    pub fn needs_virtual_sites(&self) -> bool {
        self.vs_pair || self.glue_to_surface || self.triangle
    }

    /// The virtual-site modes only work on a single rank.
    pub fn single_rank_only(&self) -> bool {
        self.needs_virtual_sites()
    }
}

/// Validated collision-detection parameters, broadcast to all ranks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionConfig {
    /// Active policy flags, after implied-flag expansion.
    pub mode: CollisionMode,
    /// Pair distance at or below which a contact counts as a collision.
    pub distance: f64,
    /// Pair bond type inserted between colliding particle centers.
    pub bond_centers: BondTypeId,
    /// Bond type used by the virtual-site modes.
    pub bond_vs: BondTypeId,
    /// Particle type assigned to newly created virtual sites.
    pub vs_particle_type: ParticleTypeId,
    /// Distance from the attach-to particle to the glue site.
    pub glue_distance: f64,
    /// Type of the particle to be glued to a surface.
    pub type_to_be_glued: ParticleTypeId,
    /// Type of the surface particle the site attaches to.
    pub type_to_attach_vs: ParticleTypeId,
    /// Type the glued particle is switched to, removing it from further
    /// glue eligibility.
    pub type_after_glueing: ParticleTypeId,
    /// First bond type of the angular range; bucket `k` maps to
    /// `bond_three_particles + k`.
    pub bond_three_particles: BondTypeId,
    /// Number of angle buckets over [0, π].
    pub angle_resolution: usize,
    /// Edge scale of the triangle-mode corner placement.
    pub triangle_size: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            mode: CollisionMode::none(),
            distance: 0.0,
            bond_centers: 0,
            bond_vs: 0,
            vs_particle_type: 0,
            glue_distance: 0.0,
            type_to_be_glued: 0,
            type_to_attach_vs: 0,
            type_after_glueing: 0,
            bond_three_particles: 0,
            angle_resolution: 0,
            triangle_size: 1.0,
        }
    }
}

/// Checks an already-expanded configuration against the store's bond
/// table, its virtual-site capability, and the active rank count.
pub(crate) fn validate<S: ParticleStore>(
    config: &CollisionConfig,
    store: &S,
    ranks: usize,
) -> Result<(), ConfigError> {
    let mode = config.mode;

    if mode.needs_virtual_sites() && !store.supports_virtual_sites() {
        return Err(ConfigError::UnsupportedCapability);
    }

    if mode.single_rank_only() && ranks != 1 {
        return Err(ConfigError::WrongRankCount { ranks });
    }

    if mode.bond {
        expect_arity(store, config.bond_centers, &[1], "1")?;
    }

    if mode.vs_pair || mode.glue_to_surface {
        expect_arity(store, config.bond_vs, &[1, 2], "1 or 2")?;
    }

    // The holding bond between paired sites is a fixed type; it is only
    // exercised by the triangle mode and the arity-2 variant of vs_pair.
    if mode.triangle || (mode.vs_pair && store.bond_arity(config.bond_vs) == Some(2)) {
        expect_arity(store, AUX_SITE_BOND, &[1], "1")?;
    }

    if mode.three_particles {
        if config.angle_resolution == 0 {
            return Err(ConfigError::InvalidAngularRange {
                base: config.bond_three_particles,
                resolution: 0,
            });
        }
        for kind in config.bond_three_particles..config.bond_three_particles + config.angle_resolution
        {
            match store.bond_arity(kind) {
                None => {
                    return Err(ConfigError::InvalidAngularRange {
                        base: config.bond_three_particles,
                        resolution: config.angle_resolution,
                    });
                }
                Some(2) => {}
                Some(arity) => {
                    return Err(ConfigError::WrongBondArity {
                        kind,
                        arity,
                        expected: "2",
                    });
                }
            }
        }
    }

    Ok(())
}

fn expect_arity<S: ParticleStore>(
    store: &S,
    kind: BondTypeId,
    allowed: &[u32],
    expected: &'static str,
) -> Result<(), ConfigError> {
    match store.bond_arity(kind) {
        None => Err(ConfigError::UnknownBondType { kind }),
        Some(arity) if allowed.contains(&arity) => Ok(()),
        Some(arity) => Err(ConfigError::WrongBondArity {
            kind,
            arity,
            expected,
        }),
    }
}
