mod bind;
mod config;
mod detect;
mod error;
mod geometry;
mod queue;
mod triple;

pub use bind::BindOutcome;
pub use config::{AUX_SITE_BOND, CollisionConfig, CollisionMode};
pub use error::ConfigError;
pub use queue::{CollisionEvent, CollisionNotice};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::comm::Communicator;
use crate::model::particle::ParticleId;
use crate::model::store::ParticleStore;
use crate::space::Partition;

/// What one binder pass did, returned to the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Exception-mode notices, one per local event.
    pub notices: Vec<CollisionNotice>,
    /// Pair and angular bonds inserted on this rank.
    pub bonds_created: usize,
    /// Virtual sites created on this rank.
    pub sites_created: usize,
    /// Particles switched to the post-glue type.
    pub particles_retyped: usize,
    /// Whether a spatial resort was requested from the store.
    pub resort_requested: bool,
}

/// The collision-detection subsystem of one rank.
///
/// One instance is constructed per simulation and holds the validated
/// configuration, the rank-local event queue, and the communicator. The
/// driver calls [`detect`](Self::detect) from its pairwise interaction
/// loop and [`handle_collisions`](Self::handle_collisions) exactly once
/// per step on every rank.
#[derive(Debug)]
pub struct CollisionPipeline<C: Communicator> {
    comm: C,
    config: CollisionConfig,
    queue: Vec<CollisionEvent>,
    rng: StdRng,
    forces_stale: bool,
}

impl<C: Communicator> CollisionPipeline<C> {
    pub fn new(comm: C) -> Self {
        Self::with_seed(comm, rand::random())
    }

    /// Pipeline with a deterministic seed for the triangle-mode corner
    /// placement.
    pub fn with_seed(comm: C, seed: u64) -> Self {
        Self {
            comm,
            config: CollisionConfig::default(),
            queue: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            forces_stale: false,
        }
    }

    /// The active, already-expanded configuration.
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Events detected so far in the current step.
    pub fn pending_events(&self) -> &[CollisionEvent] {
        &self.queue
    }

    /// Reads and clears the force-recalculation signal raised by a
    /// configuration change.
    pub fn take_force_recalc(&mut self) -> bool {
        std::mem::take(&mut self.forces_stale)
    }

    /// Validates and activates a collision configuration.
    ///
    /// Collective: all ranks call this together, and rank 0's parameters
    /// are replicated everywhere. Implied flags are expanded before
    /// validation; referenced particle types are registered on success.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]; the previously active configuration stays in
    /// effect.
    pub fn set_parameters<S: ParticleStore>(
        &mut self,
        store: &mut S,
        params: CollisionConfig,
    ) -> Result<(), ConfigError> {
        let mut params = params;
        params.mode = params.mode.expanded();
        config::validate(&params, store, self.comm.size())?;

        if params.mode.needs_virtual_sites() {
            store.register_type(params.vs_particle_type);
        }
        if params.mode.glue_to_surface {
            store.register_type(params.type_to_be_glued);
            store.register_type(params.type_to_attach_vs);
            store.register_type(params.type_after_glueing);
        }

        self.config = self.comm.broadcast_config(&params);
        self.forces_stale = true;
        Ok(())
    }

    /// Examines one candidate pair from the force loop.
    ///
    /// `distance` and `interaction` are the precomputed pair distance and
    /// interaction magnitude from the pairwise evaluator. Accepted pairs
    /// are queued; everything else is silently skipped.
    pub fn detect<S: ParticleStore>(
        &mut self,
        store: &S,
        id1: ParticleId,
        id2: ParticleId,
        distance: f64,
        interaction: f64,
    ) {
        detect::detect_collision(
            &self.config,
            store,
            &mut self.queue,
            id1,
            id2,
            distance,
            interaction,
        );
    }

    /// Processes the queued collisions at the end of a force step.
    ///
    /// Collective whenever three-particle binding is active: every rank
    /// must call this exactly once per step, with empty queues included,
    /// or the count reduction deadlocks. Applies effects in the fixed
    /// policy order, clears the queue, and requests a spatial resort if a
    /// particle-creating or re-typing effect fired.
    pub fn handle_collisions<S: ParticleStore, P: Partition>(
        &mut self,
        store: &mut S,
        partition: &P,
    ) -> StepReport {
        let mode = self.config.mode;
        let mut report = StepReport::default();
        let mut outcome = BindOutcome::default();

        if mode.exception {
            for event in &self.queue {
                let notice = CollisionNotice::for_pair(event.id1, event.id2);
                log::warn!("{notice}");
                report.notices.push(notice);
            }
        }

        if mode.bond {
            for event in &self.queue {
                bind::bind_centers(store, &self.config, event, &mut outcome);
            }
        }

        if mode.needs_virtual_sites() && store.supports_virtual_sites() {
            for event in &self.queue {
                if mode.triangle {
                    bind::bind_triangle(store, &self.config, &mut self.rng, event, &mut outcome);
                } else if mode.glue_to_surface {
                    bind::glue_to_surface(store, &self.config, event, &mut outcome);
                } else {
                    bind::bind_at_point_of_collision(store, &self.config, event, &mut outcome);
                }
            }
        }

        if mode.three_particles {
            outcome.bonds_created +=
                triple::bind_three_particles(&self.comm, store, partition, &self.config, &self.queue);
        }

        if outcome.needs_resort() {
            store.request_resort();
            report.resort_requested = true;
        }

        report.bonds_created = outcome.bonds_created;
        report.sites_created = outcome.sites_created;
        report.particles_retyped = outcome.particles_retyped;

        self.queue.clear();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::SingleRank;
    use crate::model::store::ParticleStore;
    use crate::model::world::World;
    use crate::space::SweepList;
    use approx::assert_relative_eq;

    fn pipeline() -> CollisionPipeline<SingleRank> {
        CollisionPipeline::with_seed(SingleRank, 1)
    }

    #[test]
    fn binder_on_empty_queue_is_a_no_op() {
        let mut world = World::new();
        world.register_bond_type(1);
        let mut pipeline = pipeline();
        pipeline
            .set_parameters(
                &mut world,
                CollisionConfig {
                    mode: CollisionMode {
                        bond: true,
                        ..Default::default()
                    },
                    distance: 1.0,
                    ..CollisionConfig::default()
                },
            )
            .unwrap();

        let before = world.clone();
        let report = pipeline.handle_collisions(&mut world, &SweepList::default());

        assert_eq!(report, StepReport::default());
        assert_eq!(world.particle_count(), before.particle_count());
        assert!(!world.take_resort_request());
    }

    #[test]
    fn configuration_reads_back_unchanged_with_implied_bond() {
        let mut world = World::new();
        world.register_bond_type(1); // centers
        world.register_bond_type(1); // vs
        let params = CollisionConfig {
            mode: CollisionMode {
                vs_pair: true,
                ..Default::default()
            },
            distance: 2.5,
            bond_centers: 0,
            bond_vs: 1,
            vs_particle_type: 7,
            ..CollisionConfig::default()
        };

        let mut pipeline = pipeline();
        pipeline.set_parameters(&mut world, params.clone()).unwrap();

        let active = pipeline.config();
        assert!(active.mode.bond, "vs_pair implies the center bond");
        assert!(active.mode.vs_pair);
        assert_eq!(active.distance, 2.5);
        assert_eq!(active.bond_vs, 1);
        assert!(pipeline.take_force_recalc());
        assert!(world.is_type_registered(7));
    }

    #[test]
    fn rejected_parameters_leave_prior_configuration_untouched() {
        let mut world = World::new();
        world.register_bond_type(1);
        let mut pipeline = pipeline();
        let good = CollisionConfig {
            mode: CollisionMode {
                bond: true,
                ..Default::default()
            },
            distance: 1.0,
            ..CollisionConfig::default()
        };
        pipeline.set_parameters(&mut world, good.clone()).unwrap();
        assert!(pipeline.take_force_recalc());

        let bad = CollisionConfig {
            bond_centers: 99,
            ..good.clone()
        };
        let err = pipeline.set_parameters(&mut world, bad).unwrap_err();
        assert_eq!(err, ConfigError::UnknownBondType { kind: 99 });
        assert_eq!(pipeline.config().bond_centers, good.bond_centers);
        assert!(!pipeline.take_force_recalc());
    }

    #[test]
    fn bond_scenario_creates_one_bond_and_no_resort() {
        let mut world = World::new();
        world.register_bond_type(1);
        let a = world.insert([0.0, 0.0, 0.0], 0);
        let b = world.insert([0.5, 0.0, 0.0], 0);

        let mut pipeline = pipeline();
        pipeline
            .set_parameters(
                &mut world,
                CollisionConfig {
                    mode: CollisionMode {
                        bond: true,
                        ..Default::default()
                    },
                    distance: 1.0,
                    ..CollisionConfig::default()
                },
            )
            .unwrap();

        pipeline.detect(&world, a, b, 0.5, 1.0);
        assert_eq!(pipeline.pending_events().len(), 1);

        let report = pipeline.handle_collisions(&mut world, &SweepList::default());
        assert_eq!(report.bonds_created, 1);
        assert!(!report.resort_requested);
        assert!(world.has_pair_bond(a, 0, b));
        assert!(pipeline.pending_events().is_empty());
        assert!(!world.take_resort_request());

        // the new bond suppresses re-detection of the same pair
        pipeline.detect(&world, a, b, 0.5, 1.0);
        assert!(pipeline.pending_events().is_empty());
    }

    #[test]
    fn exception_notices_are_additive_to_bonding() {
        let mut world = World::new();
        world.register_bond_type(1);
        let a = world.insert([0.0, 0.0, 0.0], 0);
        let b = world.insert([0.5, 0.0, 0.0], 0);

        let mut pipeline = pipeline();
        pipeline
            .set_parameters(
                &mut world,
                CollisionConfig {
                    mode: CollisionMode {
                        bond: true,
                        exception: true,
                        ..Default::default()
                    },
                    distance: 1.0,
                    ..CollisionConfig::default()
                },
            )
            .unwrap();

        pipeline.detect(&world, b, a, 0.5, 1.0);
        let report = pipeline.handle_collisions(&mut world, &SweepList::default());

        assert_eq!(report.notices, vec![CollisionNotice::for_pair(a, b)]);
        assert_eq!(report.bonds_created, 1);
    }

    #[test]
    fn glue_scenario_places_site_at_glue_distance_and_retypes() {
        let mut world = World::new();
        world.register_bond_type(1); // centers
        world.register_bond_type(1); // vs
        let attach = world.insert([0.0, 0.0, 0.0], 3);
        let glued = world.insert([1.0, 0.0, 0.0], 2);

        let mut pipeline = pipeline();
        pipeline
            .set_parameters(
                &mut world,
                CollisionConfig {
                    mode: CollisionMode {
                        glue_to_surface: true,
                        ..Default::default()
                    },
                    distance: 1.5,
                    bond_centers: 0,
                    bond_vs: 1,
                    vs_particle_type: 9,
                    glue_distance: 0.3,
                    type_to_be_glued: 2,
                    type_to_attach_vs: 3,
                    type_after_glueing: 4,
                    ..CollisionConfig::default()
                },
            )
            .unwrap();

        pipeline.detect(&world, glued, attach, 1.0, 1.0);
        let report = pipeline.handle_collisions(&mut world, &SweepList::default());

        assert_eq!(report.sites_created, 1);
        assert_eq!(report.particles_retyped, 1);
        assert!(report.resort_requested);
        assert!(world.take_resort_request());
        assert_eq!(world.type_of(glued), Some(4));

        let site = glued + 1;
        let record = world.particle(site).unwrap();
        assert_relative_eq!(record.position[0], 0.3, epsilon = 1e-12);
        assert_eq!(record.parents, vec![attach]);
        assert_eq!(record.type_id, 9);

        // retyping removed the glued particle from future eligibility
        pipeline.detect(&world, glued, attach, 1.0, 1.0);
        assert!(pipeline.pending_events().is_empty());
    }

    #[test]
    fn three_particle_scenario_buckets_the_right_angle() {
        let mut world = World::new();
        world.register_bond_type(1); // centers
        let base = world.register_bond_type(2); // 1
        for _ in 1..4 {
            world.register_bond_type(2); // 2..=4
        }
        let p1 = world.insert([0.0, 0.0, 0.0], 0);
        let p2 = world.insert([1.0, 0.0, 0.0], 0);
        let third = world.insert([0.5, 0.5, 0.0], 0);

        let mut pipeline = pipeline();
        pipeline
            .set_parameters(
                &mut world,
                CollisionConfig {
                    mode: CollisionMode {
                        three_particles: true,
                        ..Default::default()
                    },
                    distance: 1.0,
                    bond_centers: 0,
                    bond_three_particles: base,
                    angle_resolution: 4,
                    ..CollisionConfig::default()
                },
            )
            .unwrap();

        pipeline.detect(&world, p1, p2, 1.0, 1.0);
        let sweep = SweepList::new(world.stored_ids());
        let report = pipeline.handle_collisions(&mut world, &sweep);

        // center bond plus the three angular placements
        assert_eq!(report.bonds_created, 4);
        assert!(!report.resort_requested, "no particle was created or retyped");
        assert!(world
            .bonds(third)
            .iter()
            .any(|e| e.kind == base + 2 && e.has_partners(p1, p2)));
    }

    #[test]
    fn triangle_scenario_is_deterministic_under_a_fixed_seed() {
        let run = |seed: u64| {
            let mut world = World::new();
            world.register_bond_type(1); // centers
            world.register_bond_type(1); // vs
            world.register_bond_type(2); // filler
            world.register_bond_type(1); // aux = 3
            let a = world.insert([0.0, 0.0, 0.0], 0);
            let b = world.insert([1.0, 0.0, 0.0], 0);

            let mut pipeline = CollisionPipeline::with_seed(SingleRank, seed);
            pipeline
                .set_parameters(
                    &mut world,
                    CollisionConfig {
                        mode: CollisionMode {
                            triangle: true,
                            ..Default::default()
                        },
                        distance: 1.5,
                        bond_centers: 0,
                        bond_vs: 1,
                        vs_particle_type: 9,
                        triangle_size: 1.0,
                        ..CollisionConfig::default()
                    },
                )
                .unwrap();

            pipeline.detect(&world, a, b, 1.0, 1.0);
            let report = pipeline.handle_collisions(&mut world, &SweepList::default());
            assert_eq!(report.sites_created, 6);
            assert!(report.resort_requested);

            (b + 1..=b + 6)
                .map(|site| world.particle(site).unwrap().position)
                .collect::<Vec<_>>()
        };

        assert_eq!(run(11), run(11));
        assert_ne!(run(11), run(12));
    }
}
