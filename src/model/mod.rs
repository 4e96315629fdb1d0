//! Core data structures for particles, bonds, and rank-local storage.
//!
//! This module provides the foundational types that flow through `coldet`:
//!
//! - [`particle`] – Particle records with ghost and virtual-site flags.
//! - [`bond`] – Bond-list entries and the bonded-interaction arity table.
//! - [`store`] – The [`ParticleStore`] interface the pipeline mutates
//!   topology through.
//! - [`world`] – An in-memory reference store modeling one compute rank.
//!
//! The data model deliberately separates global particle identity from
//! local storage: ids are simulation-wide, while each rank stores only the
//! particles it owns plus read-only ghost replicas of nearby remote ones.
//!
//! [`ParticleStore`]: store::ParticleStore

pub mod bond;
pub mod particle;
pub mod store;
pub mod world;
