//! Global reconciliation and three-particle angular binding.
//!
//! Every rank contributes its local events to a collective count
//! reduction and, when the total is non-zero, to a variable-length gather
//! that leaves an identical global queue on all ranks. Each rank then
//! searches its own particles for a third partner near every globally
//! known collision and inserts an angle-bucketed bond on the center.
//! Because the global queue is bit-identical everywhere and ghost centers
//! are never mutated, no second synchronization round is needed.

use super::config::CollisionConfig;
use super::geometry;
use super::queue::CollisionEvent;
use crate::comm::Communicator;
use crate::model::bond::BondEntry;
use crate::model::particle::ParticleId;
use crate::model::store::ParticleStore;
use crate::space::Partition;

/// Margin keeping the cosine strictly inside [-1, 1] so that arccos never
/// sees a domain error at near-colinear geometry.
const COS_CLAMP: f64 = 1.0 - 1e-10;

/// Runs the reconciliation and the three-particle binding phase.
///
/// Collective: every rank must call this once per step when three-particle
/// binding is active, with its own local queue. Returns the number of
/// angular bonds inserted on this rank.
pub(crate) fn bind_three_particles<C, S, P>(
    comm: &C,
    store: &mut S,
    partition: &P,
    config: &CollisionConfig,
    local: &[CollisionEvent],
) -> usize
where
    C: Communicator,
    S: ParticleStore,
    P: Partition,
{
    let total = comm.reduce_count(local.len());
    if total == 0 {
        return 0;
    }

    let global = comm.gather_events(local);
    debug_assert_eq!(global.len(), total);
    log::debug!(
        "rank {}: three-particle binding over {} global events",
        comm.rank(),
        global.len()
    );

    if partition.is_cell_indexed() {
        cell_indexed_search(store, partition, config, &global)
    } else {
        full_sweep(store, partition, config, &global)
    }
}

/// Pairs every locally stored, non-ghost particle with every global event.
fn full_sweep<S: ParticleStore, P: Partition>(
    store: &mut S,
    partition: &P,
    config: &CollisionConfig,
    global: &[CollisionEvent],
) -> usize {
    let mut created = 0;
    for third in partition.stored_ids() {
        if store.is_ghost(third) {
            continue;
        }
        for event in global {
            if third == event.id1 || third == event.id2 {
                continue;
            }
            created += attempt_cyclic(store, config, third, event);
        }
    }
    created
}

/// Scans only the 27-cell neighborhoods around each event's participants.
///
/// When both participants share a cell, one scan suffices; otherwise both
/// neighborhoods are visited. Overlapping neighborhoods may offer the same
/// third particle twice; the duplicate-bond check makes that harmless.
fn cell_indexed_search<S: ParticleStore, P: Partition>(
    store: &mut S,
    partition: &P,
    config: &CollisionConfig,
    global: &[CollisionEvent],
) -> usize {
    let mut created = 0;
    for event in global {
        let (Some(pos1), Some(pos2)) = (store.position(event.id1), store.position(event.id2))
        else {
            continue;
        };
        let (Some(cell1), Some(cell2)) = (partition.cell_of(pos1), partition.cell_of(pos2))
        else {
            continue;
        };

        let mut cells = vec![cell1];
        if cell2 != cell1 {
            cells.push(cell2);
        }
        for cell in cells {
            for third in partition.neighborhood(cell) {
                if third == event.id1 || third == event.id2 {
                    continue;
                }
                created += attempt_cyclic(store, config, third, event);
            }
        }
    }
    created
}

/// Tries the three cyclic center/partner assignments for one candidate
/// triplet. The bond roots on the center; partner order is irrelevant, so
/// non-cyclic permutations add nothing.
fn attempt_cyclic<S: ParticleStore>(
    store: &mut S,
    config: &CollisionConfig,
    third: ParticleId,
    event: &CollisionEvent,
) -> usize {
    let mut created = 0;
    created += usize::from(try_angular_bond(store, config, third, event.id1, event.id2));
    created += usize::from(try_angular_bond(store, config, event.id1, third, event.id2));
    created += usize::from(try_angular_bond(store, config, event.id2, third, event.id1));
    created
}

/// Attempts one angular-bond placement on `center`.
///
/// Rejects ghost or unresolvable centers, partners beyond the collision
/// threshold, and triplets already carrying an equivalent bond in the
/// configured type range. On success inserts a 2-partner bond whose type
/// encodes the observed angle.
fn try_angular_bond<S: ParticleStore>(
    store: &mut S,
    config: &CollisionConfig,
    center: ParticleId,
    partner1: ParticleId,
    partner2: ParticleId,
) -> bool {
    if store.is_ghost(center) {
        return false;
    }
    let Some(center_pos) = store.position(center) else {
        return false;
    };
    let (Some(pos1), Some(pos2)) = (store.position(partner1), store.position(partner2)) else {
        return false;
    };

    let vec1 = geometry::sub(pos1, center_pos);
    let dist1 = geometry::norm(vec1);
    if dist1 == 0.0 || dist1 > config.distance {
        return false;
    }
    let vec2 = geometry::sub(pos2, center_pos);
    let dist2 = geometry::norm(vec2);
    if dist2 == 0.0 || dist2 > config.distance {
        return false;
    }

    if angular_bond_exists(store, config, center, partner1, partner2) {
        return false;
    }

    let cosine = (geometry::dot(vec1, vec2) / (dist1 * dist2)).clamp(-COS_CLAMP, COS_CLAMP);
    let phi = cosine.acos();
    let bucket = angle_bucket(phi, config.angle_resolution);

    store.add_bond(
        center,
        BondEntry::angular(config.bond_three_particles + bucket, partner1, partner2),
    );
    log::trace!("angular bond on {center} with partners {partner1}, {partner2} (phi = {phi:.4})");
    true
}

/// True if `center` already carries a bond in the configured angular type
/// range with exactly these two partners, in either order.
fn angular_bond_exists<S: ParticleStore>(
    store: &S,
    config: &CollisionConfig,
    center: ParticleId,
    partner1: ParticleId,
    partner2: ParticleId,
) -> bool {
    let range = config.bond_three_particles..config.bond_three_particles + config.angle_resolution;
    store
        .bonds(center)
        .iter()
        .any(|entry| range.contains(&entry.kind) && entry.has_partners(partner1, partner2))
}

/// Maps an angle φ ∈ [0, π] to a bucket in [0, resolution − 1] by
/// nearest-bucket rounding.
pub(crate) fn angle_bucket(phi: f64, resolution: usize) -> usize {
    (phi / std::f64::consts::PI * (resolution - 1) as f64 + 0.5).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::config::CollisionMode;
    use crate::comm::{LocalCluster, SingleRank};
    use crate::model::world::World;
    use crate::space::{CellGrid, SweepList};
    use std::f64::consts::PI;
    use std::thread;

    /// Center bond at id 0, angular range ids 1..=4 (resolution 4).
    fn three_particle_world() -> (World, CollisionConfig) {
        let mut world = World::new();
        let bond_centers = world.register_bond_type(1);
        let base = world.register_bond_type(2);
        for _ in 1..4 {
            world.register_bond_type(2);
        }
        let config = CollisionConfig {
            mode: CollisionMode {
                bond: true,
                three_particles: true,
                ..Default::default()
            },
            distance: 1.0,
            bond_centers,
            bond_three_particles: base,
            angle_resolution: 4,
            ..CollisionConfig::default()
        };
        (world, config)
    }

    #[test]
    fn bucket_edges_map_to_first_and_last() {
        assert_eq!(angle_bucket(0.0, 4), 0);
        assert_eq!(angle_bucket(PI, 4), 3);
        assert_eq!(angle_bucket(PI / 2.0, 4), 2);
        // every angle lands inside the configured resolution
        for resolution in [2usize, 3, 8, 181] {
            for step in 0..=50 {
                let phi = PI * step as f64 / 50.0;
                assert!(angle_bucket(phi, resolution) < resolution);
            }
        }
    }

    #[test]
    fn right_angle_third_particle_gets_bucket_two() {
        let (mut world, config) = three_particle_world();
        let p1 = world.insert([0.0, 0.0, 0.0], 0);
        let p2 = world.insert([1.0, 0.0, 0.0], 0);
        let third = world.insert([0.5, 0.5, 0.0], 0);

        let events = [CollisionEvent::new(p1, p2, [0.5, 0.0, 0.0])];
        let sweep = SweepList::new(world.stored_ids());
        let created =
            bind_three_particles(&SingleRank, &mut world, &sweep, &config, &events);

        // the perpendicular-bisector particle sees the pair at 90°
        let expected_kind = config.bond_three_particles + 2;
        assert!(world
            .bonds(third)
            .iter()
            .any(|e| e.kind == expected_kind && e.has_partners(p1, p2)));

        // the 45° placements centered on the pair members fire as well
        let flat_kind = config.bond_three_particles + 1;
        assert!(world
            .bonds(p1)
            .iter()
            .any(|e| e.kind == flat_kind && e.has_partners(third, p2)));
        assert!(world
            .bonds(p2)
            .iter()
            .any(|e| e.kind == flat_kind && e.has_partners(third, p1)));
        assert_eq!(created, 3);
    }

    #[test]
    fn cell_indexed_search_matches_full_sweep() {
        let (mut sweep_world, config) = three_particle_world();
        let p1 = sweep_world.insert([0.0, 0.0, 0.0], 0);
        let p2 = sweep_world.insert([0.8, 0.0, 0.0], 0);
        let third = sweep_world.insert([0.4, 0.6, 0.0], 0);
        let far = sweep_world.insert([5.0, 5.0, 5.0], 0);
        let mut grid_world = sweep_world.clone();

        let events = [CollisionEvent::new(p1, p2, [0.4, 0.0, 0.0])];

        let sweep = SweepList::new(sweep_world.stored_ids());
        let from_sweep =
            bind_three_particles(&SingleRank, &mut sweep_world, &sweep, &config, &events);

        let grid = CellGrid::from_particles(
            grid_world
                .stored_ids()
                .into_iter()
                .map(|id| (id, grid_world.position(id).unwrap())),
            config.distance,
        );
        let from_grid =
            bind_three_particles(&SingleRank, &mut grid_world, &grid, &config, &events);

        assert_eq!(from_sweep, from_grid);
        assert_eq!(sweep_world.bonds(third), grid_world.bonds(third));
        assert_eq!(sweep_world.bonds(p1), grid_world.bonds(p1));
        assert!(sweep_world.bonds(far).is_empty());
        assert!(grid_world.bonds(far).is_empty());
    }

    #[test]
    fn existing_equivalent_bond_blocks_reinsertion() {
        let (mut world, config) = three_particle_world();
        let p1 = world.insert([0.0, 0.0, 0.0], 0);
        let p2 = world.insert([1.0, 0.0, 0.0], 0);
        let third = world.insert([0.5, 0.5, 0.0], 0);
        // equivalent bond with partners in the opposite order
        world.add_bond(
            third,
            BondEntry::angular(config.bond_three_particles + 2, p2, p1),
        );

        let events = [CollisionEvent::new(p1, p2, [0.5, 0.0, 0.0])];
        let sweep = SweepList::new(world.stored_ids());
        bind_three_particles(&SingleRank, &mut world, &sweep, &config, &events);

        let in_range: Vec<_> = world
            .bonds(third)
            .iter()
            .filter(|e| e.has_partners(p1, p2))
            .collect();
        assert_eq!(in_range.len(), 1);
    }

    #[test]
    fn distant_third_particle_is_rejected() {
        let (mut world, config) = three_particle_world();
        let p1 = world.insert([0.0, 0.0, 0.0], 0);
        let p2 = world.insert([0.5, 0.0, 0.0], 0);
        let third = world.insert([0.25, 2.0, 0.0], 0);

        let events = [CollisionEvent::new(p1, p2, [0.25, 0.0, 0.0])];
        let sweep = SweepList::new(world.stored_ids());
        bind_three_particles(&SingleRank, &mut world, &sweep, &config, &events);

        assert!(world.bonds(third).is_empty());
    }

    #[test]
    fn zero_events_skip_the_phase_entirely() {
        let (mut world, config) = three_particle_world();
        world.insert([0.0, 0.0, 0.0], 0);
        let sweep = SweepList::new(world.stored_ids());
        let created = bind_three_particles(&SingleRank, &mut world, &sweep, &config, &[]);
        assert_eq!(created, 0);
    }

    #[test]
    fn ranks_only_mutate_their_own_particles() {
        // Rank 0 owns the colliding pair (0, 1); rank 1 owns the third
        // particle (2). Each rank mirrors the others' particles as ghosts.
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 0.5, 0.0]];

        let comms = LocalCluster::new(2);
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| {
                thread::spawn(move || {
                    let (mut world, config) = {
                        let (mut world, config) = three_particle_world();
                        for (id, pos) in positions.iter().enumerate() {
                            let owned_here = (id < 2) == (comm.rank() == 0);
                            if owned_here {
                                assert_eq!(world.insert(*pos, 0), id);
                            } else {
                                world.mirror_ghost(id, *pos, 0);
                            }
                        }
                        (world, config)
                    };

                    // only rank 0 detected the collision locally
                    let local = if comm.rank() == 0 {
                        vec![CollisionEvent::new(0, 1, [0.5, 0.0, 0.0])]
                    } else {
                        Vec::new()
                    };

                    let sweep = SweepList::new(world.stored_ids());
                    bind_three_particles(&comm, &mut world, &sweep, &config, &local);
                    (comm.rank(), world)
                })
            })
            .collect();

        for handle in handles {
            let (rank, world) = handle.join().unwrap();
            if rank == 0 {
                // the only third-particle candidate here is the ghost of 2,
                // and ghosts are never used as sweep centers
                assert!(world.bonds(0).is_empty());
                assert!(world.bonds(1).is_empty());
                assert!(world.bonds(2).is_empty());
            } else {
                // owns the third particle: 90° bond on 2, ghosts untouched
                assert!(world.bonds(0).is_empty());
                assert!(world.bonds(1).is_empty());
                assert_eq!(world.bonds(2).len(), 1);
                assert!(world.bonds(2)[0].has_partners(0, 1));
                // base id 1 + bucket 2 for the 90° geometry
                assert_eq!(world.bonds(2)[0].kind, 3);
            }
        }
    }
}
