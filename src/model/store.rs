//! The particle-store interface consumed by the collision pipeline.
//!
//! The pipeline never owns particle data. It reads and mutates the
//! simulator's storage through this trait: identity lookup, ghost and
//! virtual flags, bond-list access, re-typing, virtual-site placement,
//! and the resort signal. [`World`](super::world::World) is the in-memory
//! reference implementation.

use super::bond::BondEntry;
use super::particle::{BondTypeId, ParticleId, ParticleTypeId};

/// Storage and topology-mutation interface of the surrounding simulator.
///
/// Lookups take global particle ids and resolve to the locally stored
/// record, which may be an owned particle or a ghost replica. Lookups of
/// ids with no local record return `None`; the pipeline treats those as
/// defensive skips, never as errors.
pub trait ParticleStore {
    /// Position of the locally stored record for `id`.
    fn position(&self, id: ParticleId) -> Option<[f64; 3]>;

    /// Particle type of the locally stored record for `id`.
    fn type_of(&self, id: ParticleId) -> Option<ParticleTypeId>;

    /// True if `id` resolves locally to a ghost replica.
    fn is_ghost(&self, id: ParticleId) -> bool;

    /// True if `id` resolves locally to a virtual site.
    fn is_virtual(&self, id: ParticleId) -> bool;

    /// Bond list rooted on `id`; empty for unknown ids.
    fn bonds(&self, id: ParticleId) -> &[BondEntry];

    /// Appends a bond to the list rooted on `owner`.
    ///
    /// Must only be called for particles the executing rank owns.
    fn add_bond(&mut self, owner: ParticleId, entry: BondEntry);

    /// Changes the particle type of an owned record.
    fn set_type(&mut self, id: ParticleId, type_id: ParticleTypeId);

    /// Makes a particle type known to the simulator's type tables.
    fn register_type(&mut self, type_id: ParticleTypeId);

    /// Arity of a bonded-interaction type, or `None` if unregistered.
    fn bond_arity(&self, kind: BondTypeId) -> Option<u32>;

    /// Whether this store can create kinematically related virtual sites.
    fn supports_virtual_sites(&self) -> bool;

    /// Appends a new particle at `position`, relates it kinematically to
    /// `parent`, marks it virtual, and assigns `type_id`. Returns the new id.
    fn place_virtual_site(
        &mut self,
        position: [f64; 3],
        parent: ParticleId,
        type_id: ParticleTypeId,
    ) -> ParticleId;

    /// Signals the driver that a spatial resort is required before the
    /// next force step.
    fn request_resort(&mut self);

    /// True if a pair bond of `kind` from `owner` to `partner` exists.
    fn has_pair_bond(&self, owner: ParticleId, kind: BondTypeId, partner: ParticleId) -> bool {
        self.bonds(owner).iter().any(|b| b.is_pair_to(kind, partner))
    }
}
