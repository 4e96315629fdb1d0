//! Per-pair collision detection.
//!
//! Runs inline with the force loop, once per candidate pair. A pair that
//! passes every filter becomes one [`CollisionEvent`] in the rank-local
//! queue; binding is deferred to the end of the step because mutating
//! topology mid-loop would invalidate the neighbor iteration in progress.
//! Every rejection is a silent defensive skip.

use super::config::CollisionConfig;
use super::geometry;
use super::queue::CollisionEvent;
use crate::model::particle::ParticleId;
use crate::model::store::ParticleStore;

/// Interaction magnitudes within this epsilon of zero do not count as a
/// real contact.
pub(crate) const INTERACTION_EPSILON: f64 = 1e-3;

/// Examines one candidate pair and appends an event if it collides.
///
/// `distance` and `interaction` come precomputed from the pairwise
/// evaluator. The ids may refer to ghost replicas; they resolve to the
/// canonical records through the store.
pub(crate) fn detect_collision<S: ParticleStore>(
    config: &CollisionConfig,
    store: &S,
    queue: &mut Vec<CollisionEvent>,
    id1: ParticleId,
    id2: ParticleId,
    distance: f64,
    interaction: f64,
) {
    if !config.mode.is_active() || distance > config.distance {
        return;
    }

    // A vanishing interaction magnitude means the evaluator saw no real
    // contact at this distance.
    if interaction.abs() <= INTERACTION_EPSILON {
        return;
    }

    let (Some(type1), Some(type2)) = (store.type_of(id1), store.type_of(id2)) else {
        return;
    };

    // In glue mode only pairs of exactly {to-be-glued, attach-to} bind.
    if config.mode.glue_to_surface {
        let forward =
            type1 == config.type_to_be_glued && type2 == config.type_to_attach_vs;
        let reverse =
            type2 == config.type_to_be_glued && type1 == config.type_to_attach_vs;
        if !forward && !reverse {
            return;
        }
    }

    if store.supports_virtual_sites() && (store.is_virtual(id1) || store.is_virtual(id2)) {
        return;
    }

    if id1 == id2 {
        return;
    }

    if store.has_pair_bond(id1, config.bond_centers, id2)
        || store.has_pair_bond(id2, config.bond_centers, id1)
    {
        return;
    }

    let (Some(pos1), Some(pos2)) = (store.position(id1), store.position(id2)) else {
        return;
    };

    let event = if config.mode.glue_to_surface {
        // Canonical ordering: id1 is the attach-to particle. The site goes
        // glue_distance along the pair axis, measured from it.
        let (attach, glued, attach_pos, glued_pos) = if type1 == config.type_to_attach_vs {
            (id1, id2, pos1, pos2)
        } else {
            (id2, id1, pos2, pos1)
        };
        let fraction = config.glue_distance / distance;
        let point = geometry::add(
            attach_pos,
            geometry::scale(geometry::sub(glued_pos, attach_pos), fraction),
        );
        CollisionEvent::new(attach, glued, point)
    } else {
        CollisionEvent::new(id1, id2, geometry::midpoint(pos1, pos2))
    };

    log::debug!(
        "queueing collision between particles {} and {} at distance {distance}",
        event.id1,
        event.id2
    );
    queue.push(event);
}
