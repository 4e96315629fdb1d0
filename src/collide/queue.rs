//! Collision events and runtime notices.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::particle::ParticleId;

/// One detected collision, queued during the force step and consumed by
/// the end-of-step binder.
///
/// Ids always denote canonical (non-ghost) particles, even when detection
/// was triggered through a ghost replica. In glue-to-surface mode `id1` is
/// the attach-to particle. The layout is a compact serializable record so
/// the collective gather can ship events between ranks unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub id1: ParticleId,
    pub id2: ParticleId,
    pub point_of_collision: [f64; 3],
}

impl CollisionEvent {
    pub fn new(id1: ParticleId, id2: ParticleId, point_of_collision: [f64; 3]) -> Self {
        Self {
            id1,
            id2,
            point_of_collision,
        }
    }
}

/// Non-fatal, user-visible notice emitted in exception mode.
///
/// Identifies the pair by ascending id regardless of detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionNotice {
    pub id1: ParticleId,
    pub id2: ParticleId,
}

impl CollisionNotice {
    pub fn for_pair(a: ParticleId, b: ParticleId) -> Self {
        Self {
            id1: a.min(b),
            id2: a.max(b),
        }
    }
}

impl fmt::Display for CollisionNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "collision between particles {} and {}",
            self.id1, self.id2
        )
    }
}
