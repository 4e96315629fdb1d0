//! End-of-step binding of queued collisions.
//!
//! Applies the local (single-rank) effects for each event, in the fixed
//! policy order: center bonds, then the virtual-site modes. The detector
//! already guaranteed no duplicate center bond is queued, so no re-check
//! happens here. All mutations go to particles this rank owns; a pair
//! whose records are both ghost replicas is left to the owning rank.

use rand::Rng;

use super::config::{AUX_SITE_BOND, CollisionConfig};
use super::geometry;
use super::queue::CollisionEvent;
use crate::model::bond::BondEntry;
use crate::model::store::ParticleStore;

/// What a binder pass changed, for the driver and for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindOutcome {
    pub bonds_created: usize,
    pub sites_created: usize,
    pub particles_retyped: usize,
}

impl BindOutcome {
    /// True if an effect fired that requires a spatial resort.
    pub fn needs_resort(&self) -> bool {
        self.sites_created > 0 || self.particles_retyped > 0
    }
}

/// Inserts the center bond for one event, rooted on the non-ghost owner.
pub(crate) fn bind_centers<S: ParticleStore>(
    store: &mut S,
    config: &CollisionConfig,
    event: &CollisionEvent,
    outcome: &mut BindOutcome,
) {
    let (primary, secondary) = if !store.is_ghost(event.id1) {
        (event.id1, event.id2)
    } else if !store.is_ghost(event.id2) {
        (event.id2, event.id1)
    } else {
        // Neither record is owned here; the owning rank binds this pair.
        log::trace!(
            "skipping center bond {}-{}: both records are ghosts",
            event.id1,
            event.id2
        );
        return;
    };

    store.add_bond(primary, BondEntry::pair(config.bond_centers, secondary));
    outcome.bonds_created += 1;
}

/// Places one virtual site per collision partner at the point of
/// collision and joins the sites.
///
/// With an arity-1 vs bond the sites are bonded directly. With arity 2
/// each site gets a bond referencing the original pair, and the sites are
/// held together by the fixed zero-length [`AUX_SITE_BOND`].
pub(crate) fn bind_at_point_of_collision<S: ParticleStore>(
    store: &mut S,
    config: &CollisionConfig,
    event: &CollisionEvent,
    outcome: &mut BindOutcome,
) {
    let point = event.point_of_collision;
    let site1 = store.place_virtual_site(point, event.id1, config.vs_particle_type);
    let site2 = store.place_virtual_site(point, event.id2, config.vs_particle_type);
    outcome.sites_created += 2;

    match store.bond_arity(config.bond_vs) {
        Some(1) => {
            store.add_bond(site2, BondEntry::pair(config.bond_vs, site1));
            outcome.bonds_created += 1;
        }
        Some(2) => {
            store.add_bond(site1, BondEntry::angular(config.bond_vs, event.id1, event.id2));
            store.add_bond(site2, BondEntry::angular(config.bond_vs, event.id1, event.id2));
            store.add_bond(site2, BondEntry::pair(AUX_SITE_BOND, site1));
            outcome.bonds_created += 3;
        }
        // Validation admits nothing else.
        _ => {}
    }
}

/// Glues `id2` to the surface particle `id1` through a single site.
///
/// The site sits at the point of collision and is related to the
/// attach-to particle; the glued particle is bonded to it and retyped out
/// of further glue eligibility.
pub(crate) fn glue_to_surface<S: ParticleStore>(
    store: &mut S,
    config: &CollisionConfig,
    event: &CollisionEvent,
    outcome: &mut BindOutcome,
) {
    let site = store.place_virtual_site(
        event.point_of_collision,
        event.id1,
        config.vs_particle_type,
    );
    store.add_bond(event.id2, BondEntry::pair(config.bond_vs, site));
    store.set_type(event.id2, config.type_after_glueing);

    outcome.sites_created += 1;
    outcome.bonds_created += 1;
    outcome.particles_retyped += 1;
}

/// Places three site pairs at the corners of a triangle around the pair
/// axis.
///
/// The corners come from a random vector orthogonal to the axis, rotated
/// by 0°, 120°, and 240° around it. Each corner hosts one site related to
/// each collision partner, joined by the fixed [`AUX_SITE_BOND`].
pub(crate) fn bind_triangle<S: ParticleStore, R: Rng>(
    store: &mut S,
    config: &CollisionConfig,
    rng: &mut R,
    event: &CollisionEvent,
    outcome: &mut BindOutcome,
) {
    let (Some(pos1), Some(pos2)) = (store.position(event.id1), store.position(event.id2)) else {
        return;
    };

    for corner in triangle_corners(rng, pos1, pos2, config.triangle_size) {
        let site1 = store.place_virtual_site(corner, event.id1, config.vs_particle_type);
        let site2 = store.place_virtual_site(corner, event.id2, config.vs_particle_type);
        store.add_bond(site2, BondEntry::pair(AUX_SITE_BOND, site1));
        outcome.sites_created += 2;
        outcome.bonds_created += 1;
    }
}

fn triangle_corners<R: Rng>(
    rng: &mut R,
    pos1: [f64; 3],
    pos2: [f64; 3],
    size: f64,
) -> [[f64; 3]; 3] {
    let axis = geometry::sub(pos2, pos1);
    let center = geometry::midpoint(pos1, pos2);

    let orthogonal = geometry::random_orthogonal(rng, axis);
    let radius = 0.5 * size;
    let director1 = geometry::scale(orthogonal, radius / geometry::norm(orthogonal));
    let third_turn = 2.0 * std::f64::consts::PI / 3.0;
    let director2 = geometry::rotate_about(axis, third_turn, director1);
    let director3 = geometry::rotate_about(axis, third_turn, director2);

    [
        geometry::add(center, director1),
        geometry::add(center, director2),
        geometry::add(center, director3),
    ]
}
