use super::bond::BondEntry;

/// Simulation-wide particle identity.
///
/// Identities are global: a ghost replica on a remote rank carries the same
/// id as the owned (canonical) record.
pub type ParticleId = usize;

/// Numeric particle-type id, as used by the interaction tables of the
/// surrounding simulator.
pub type ParticleTypeId = u32;

/// Index into the bonded-interaction table.
pub type BondTypeId = usize;

/// A locally stored particle record.
///
/// A record is either owned by the executing rank or a read-only ghost
/// replica of a particle owned elsewhere. Topology mutation (bond insertion,
/// re-typing) is only ever applied to owned records.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: ParticleId,
    pub position: [f64; 3],
    pub type_id: ParticleTypeId,
    /// Read-only replica of a remotely owned particle.
    pub ghost: bool,
    /// Position derived kinematically from the parents instead of integrated.
    pub is_virtual: bool,
    /// Kinematic parents; empty for ordinary particles.
    pub parents: Vec<ParticleId>,
    /// Bonds rooted on this particle.
    pub bonds: Vec<BondEntry>,
}

impl Particle {
    pub fn new(id: ParticleId, position: [f64; 3], type_id: ParticleTypeId) -> Self {
        Self {
            id,
            position,
            type_id,
            ghost: false,
            is_virtual: false,
            parents: Vec::new(),
            bonds: Vec::new(),
        }
    }
}
