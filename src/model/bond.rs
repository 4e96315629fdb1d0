//! Bond-list entries and the bonded-interaction arity table.
//!
//! A bond is stored on exactly one particle (its root) and lists the
//! remaining partners. The number of partners a bond type takes — its
//! arity — is fixed by the [`BondTable`]: pair bonds have arity 1,
//! angular bonds arity 2.

use super::particle::{BondTypeId, ParticleId};

/// One entry in a particle's bond list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondEntry {
    /// Bonded-interaction type.
    pub kind: BondTypeId,
    /// Partner particle ids, excluding the root particle.
    pub partners: Vec<ParticleId>,
}

impl BondEntry {
    /// A pair bond (arity 1) to a single partner.
    pub fn pair(kind: BondTypeId, partner: ParticleId) -> Self {
        Self {
            kind,
            partners: vec![partner],
        }
    }

    /// An angular bond (arity 2) with two partners.
    pub fn angular(kind: BondTypeId, partner1: ParticleId, partner2: ParticleId) -> Self {
        Self {
            kind,
            partners: vec![partner1, partner2],
        }
    }

    /// True if this entry is a pair bond of `kind` to `partner`.
    pub fn is_pair_to(&self, kind: BondTypeId, partner: ParticleId) -> bool {
        self.kind == kind && self.partners.len() == 1 && self.partners[0] == partner
    }

    /// True if this entry has exactly the two given partners, in either order.
    pub fn has_partners(&self, partner1: ParticleId, partner2: ParticleId) -> bool {
        self.partners.len() == 2
            && ((self.partners[0] == partner1 && self.partners[1] == partner2)
                || (self.partners[0] == partner2 && self.partners[1] == partner1))
    }
}

/// Registry of bonded-interaction types, indexed by [`BondTypeId`].
///
/// Only the arity is tracked here; force-field parameters for each type
/// live with the surrounding evaluator.
#[derive(Debug, Clone, Default)]
pub struct BondTable {
    arities: Vec<u32>,
}

impl BondTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new bond type and returns its id.
    pub fn register(&mut self, arity: u32) -> BondTypeId {
        self.arities.push(arity);
        self.arities.len() - 1
    }

    /// Arity of a bond type, or `None` if the id is not registered.
    pub fn arity(&self, kind: BondTypeId) -> Option<u32> {
        self.arities.get(kind).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.arities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arities.is_empty()
    }
}
