//! Real-time collision detection and dynamic bond topology for parallel
//! particle simulations.
//!
//! During each force-evaluation step the pipeline inspects candidate
//! particle pairs from the simulator's pairwise interaction loop, decides
//! which count as collisions under a configurable policy, and — after the
//! step — deterministically mutates the particle topology: inserting
//! bonded interactions, spawning kinematically derived virtual sites,
//! re-typing particles, and inserting angle-dependent three-particle
//! bonds.
//!
//! # Features
//!
//! - **Policy flags** — Orthogonal collision modes (center bonds, site
//!   pairs, glue-to-surface, triangle corners, three-particle angular
//!   bonds, runtime notices) with explicit implied-flag expansion
//! - **Deferred binding** — Detection runs inline with the force loop;
//!   all topology mutation waits until the end of the step
//! - **Distributed state** — Particles and their ghost replicas are
//!   spatially partitioned across ranks; bonds are only ever rooted on
//!   the owning rank, and duplicate-free creation needs no extra
//!   synchronization round
//! - **Two neighbor searches** — Cell-indexed 27-neighborhood scans when
//!   the active partition is cell-based, a full local sweep otherwise
//!
//! # Quick Start
//!
//! The subsystem is one [`CollisionPipeline`] per simulation. The driver
//! feeds it candidate pairs and runs the binder once per step:
//!
//! ```
//! use coldet::{CollisionConfig, CollisionMode, CollisionPipeline};
//! use coldet::comm::SingleRank;
//! use coldet::model::store::ParticleStore;
//! use coldet::model::world::World;
//! use coldet::space::SweepList;
//!
//! let mut world = World::new();
//! let bond_centers = world.register_bond_type(1);
//! let a = world.insert([0.0, 0.0, 0.0], 0);
//! let b = world.insert([0.5, 0.0, 0.0], 0);
//!
//! let mut pipeline = CollisionPipeline::new(SingleRank);
//! pipeline.set_parameters(
//!     &mut world,
//!     CollisionConfig {
//!         mode: CollisionMode { bond: true, ..Default::default() },
//!         distance: 1.0,
//!         bond_centers,
//!         ..CollisionConfig::default()
//!     },
//! )?;
//!
//! // Inside the force loop: one call per candidate pair.
//! pipeline.detect(&world, a, b, 0.5, 1.0);
//!
//! // Once per step, on every rank.
//! let report = pipeline.handle_collisions(&mut world, &SweepList::default());
//! assert_eq!(report.bonds_created, 1);
//! assert!(world.has_pair_bond(a, bond_centers, b));
//! # Ok::<(), coldet::ConfigError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`model`] — Particles, bond lists, the [`ParticleStore`] interface,
//!   and the in-memory reference store
//! - [`space`] — Spatial-partition collaborators and the cell grid
//! - [`comm`] — Collective-communication collaborators
//!
//! The collision core itself is private; its public surface is the three
//! entry points on [`CollisionPipeline`] plus the configuration and
//! report types re-exported below.
//!
//! [`ParticleStore`]: model::store::ParticleStore

mod collide;

pub mod comm;
pub mod model;
pub mod space;

pub use collide::{
    AUX_SITE_BOND, BindOutcome, CollisionConfig, CollisionEvent, CollisionMode, CollisionNotice,
    CollisionPipeline, ConfigError, StepReport,
};
