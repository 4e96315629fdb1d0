//! In-memory reference implementation of [`ParticleStore`].
//!
//! `World` models the particle storage of one compute rank: owned records,
//! ghost replicas mirrored from other ranks, the bonded-interaction table,
//! and the particle-type registry. It backs the crate's tests and serves
//! as a template for adapting a real simulator's storage to the
//! [`ParticleStore`] interface.

use std::collections::{BTreeMap, BTreeSet};

use super::bond::{BondEntry, BondTable};
use super::particle::{BondTypeId, Particle, ParticleId, ParticleTypeId};
use super::store::ParticleStore;

const NO_BONDS: &[BondEntry] = &[];

/// One rank's worth of particle storage.
#[derive(Debug, Clone, Default)]
pub struct World {
    particles: BTreeMap<ParticleId, Particle>,
    bond_table: BondTable,
    registered_types: BTreeSet<ParticleTypeId>,
    next_id: ParticleId,
    resort_requested: bool,
    virtual_sites_supported: bool,
}

impl World {
    pub fn new() -> Self {
        Self {
            virtual_sites_supported: true,
            ..Self::default()
        }
    }

    /// A world whose store reports no virtual-site capability, matching a
    /// simulator built without kinematic site support.
    pub fn without_virtual_sites() -> Self {
        Self::default()
    }

    /// Inserts an owned particle and returns its id.
    pub fn insert(&mut self, position: [f64; 3], type_id: ParticleTypeId) -> ParticleId {
        let id = self.next_id;
        self.particles.insert(id, Particle::new(id, position, type_id));
        self.next_id += 1;
        id
    }

    /// Mirrors a remotely owned particle as a read-only ghost replica.
    ///
    /// The id is the remote particle's global id; it is not drawn from this
    /// world's id sequence, but the sequence is advanced past it so that
    /// locally created particles never collide with mirrored ids.
    pub fn mirror_ghost(&mut self, id: ParticleId, position: [f64; 3], type_id: ParticleTypeId) {
        let mut particle = Particle::new(id, position, type_id);
        particle.ghost = true;
        self.particles.insert(id, particle);
        self.next_id = self.next_id.max(id + 1);
    }

    /// Registers a bonded-interaction type of the given arity.
    pub fn register_bond_type(&mut self, arity: u32) -> BondTypeId {
        self.bond_table.register(arity)
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(&id)
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Ids of all locally stored records, ghosts included.
    pub fn stored_ids(&self) -> Vec<ParticleId> {
        self.particles.keys().copied().collect()
    }

    pub fn is_type_registered(&self, type_id: ParticleTypeId) -> bool {
        self.registered_types.contains(&type_id)
    }

    /// Reads and clears the resort request.
    pub fn take_resort_request(&mut self) -> bool {
        std::mem::take(&mut self.resort_requested)
    }
}

impl ParticleStore for World {
    fn position(&self, id: ParticleId) -> Option<[f64; 3]> {
        self.particles.get(&id).map(|p| p.position)
    }

    fn type_of(&self, id: ParticleId) -> Option<ParticleTypeId> {
        self.particles.get(&id).map(|p| p.type_id)
    }

    fn is_ghost(&self, id: ParticleId) -> bool {
        self.particles.get(&id).is_some_and(|p| p.ghost)
    }

    fn is_virtual(&self, id: ParticleId) -> bool {
        self.particles.get(&id).is_some_and(|p| p.is_virtual)
    }

    fn bonds(&self, id: ParticleId) -> &[BondEntry] {
        self.particles.get(&id).map_or(NO_BONDS, |p| &p.bonds)
    }

    fn add_bond(&mut self, owner: ParticleId, entry: BondEntry) {
        if let Some(particle) = self.particles.get_mut(&owner) {
            particle.bonds.push(entry);
        }
    }

    fn set_type(&mut self, id: ParticleId, type_id: ParticleTypeId) {
        if let Some(particle) = self.particles.get_mut(&id) {
            particle.type_id = type_id;
        }
    }

    fn register_type(&mut self, type_id: ParticleTypeId) {
        self.registered_types.insert(type_id);
    }

    fn bond_arity(&self, kind: BondTypeId) -> Option<u32> {
        self.bond_table.arity(kind)
    }

    fn supports_virtual_sites(&self) -> bool {
        self.virtual_sites_supported
    }

    fn place_virtual_site(
        &mut self,
        position: [f64; 3],
        parent: ParticleId,
        type_id: ParticleTypeId,
    ) -> ParticleId {
        let id = self.next_id;
        let mut particle = Particle::new(id, position, type_id);
        particle.is_virtual = true;
        particle.parents.push(parent);
        self.particles.insert(id, particle);
        self.next_id += 1;
        id
    }

    fn request_resort(&mut self) {
        self.resort_requested = true;
    }
}
