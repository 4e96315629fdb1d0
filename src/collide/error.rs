//! Configuration errors for the collision pipeline.
//!
//! Setting collision parameters is the only fallible operation the
//! pipeline exposes. Each failure mode carries a stable numeric code so
//! that script-level bindings in the surrounding driver can report it
//! unchanged. Runtime detection failures are deliberate silent skips and
//! never surface here.

use thiserror::Error;

use crate::model::particle::BondTypeId;

/// Why a collision configuration was rejected.
///
/// A rejected configuration leaves the previously active parameters
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A virtual-site binding mode was requested, but the particle store
    /// cannot create kinematically related sites.
    #[error("collision mode requires virtual-site support, which the particle store does not provide")]
    UnsupportedCapability,

    /// A virtual-site binding mode was requested on a multi-rank run.
    #[error("collision mode requires single-rank execution, but {ranks} ranks are active")]
    WrongRankCount {
        /// Number of active ranks.
        ranks: usize,
    },

    /// A referenced bond type is not registered in the bonded-interaction
    /// table.
    #[error("bond type {kind} does not exist")]
    UnknownBondType {
        /// The unregistered bond type id.
        kind: BondTypeId,
    },

    /// A referenced bond type exists but takes the wrong number of
    /// partners.
    #[error("bond type {kind} has arity {arity}, expected {expected}")]
    WrongBondArity {
        /// The offending bond type id.
        kind: BondTypeId,
        /// Its registered arity.
        arity: u32,
        /// The arity the requested mode needs.
        expected: &'static str,
    },

    /// The three-particle bond range or angular resolution is unusable.
    #[error(
        "three-particle bond range starting at {base} with angular resolution {resolution} is invalid"
    )]
    InvalidAngularRange {
        /// First bond type id of the angular range.
        base: BondTypeId,
        /// Number of angle buckets requested.
        resolution: usize,
    },
}

impl ConfigError {
    /// Stable numeric status code for script-level reporting.
    pub fn code(&self) -> u8 {
        match self {
            ConfigError::UnsupportedCapability => 1,
            ConfigError::WrongRankCount { .. } => 2,
            ConfigError::UnknownBondType { .. } => 3,
            ConfigError::WrongBondArity { .. } => 4,
            ConfigError::InvalidAngularRange { .. } => 5,
        }
    }
}
