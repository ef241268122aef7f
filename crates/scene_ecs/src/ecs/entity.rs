//! Entity implementation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity identifier
///
/// A plain lookup key into component pools. Two raw values are reserved:
/// [`Entity::INVALID`] ("no entity") and [`Entity::ALL`], which asks a
/// system to drop the state of every entity at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    id: u32,
}

impl Entity {
    /// Sentinel meaning "no entity" (e.g. the parent of a root node)
    pub const INVALID: Self = Self { id: u32::MAX };

    /// Sentinel addressing every entity; only meaningful for destroy requests
    pub const ALL: Self = Self { id: u32::MAX - 1 };

    /// Wrap a raw id
    pub const fn from_raw(id: u32) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub const fn id(self) -> u32 {
        self.id
    }

    /// True for every id that is not one of the two sentinels
    pub const fn is_valid(self) -> bool {
        self.id < Self::ALL.id
    }

    /// True for the [`Entity::ALL`] sentinel
    pub const fn is_all(self) -> bool {
        self.id == Self::ALL.id
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<u32> for Entity {
    fn from(id: u32) -> Self {
        Self::from_raw(id)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::INVALID => write!(f, "Entity(invalid)"),
            Self::ALL => write!(f, "Entity(all)"),
            Self { id } => write!(f, "Entity({id})"),
        }
    }
}

/// Monotonic entity id source for one loaded scene
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next_id: u32,
}

impl EntityAllocator {
    /// Create an allocator starting at id 0
    pub const fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Hand out the next id
    ///
    /// Returns [`Entity::INVALID`] once the id space below the sentinels is
    /// used up; every operation that needs a live entity rejects it.
    pub fn allocate(&mut self) -> Entity {
        let entity = Entity::from_raw(self.next_id);
        if !entity.is_valid() {
            log::error!("Entity id space exhausted");
            return Entity::INVALID;
        }
        self.next_id += 1;
        entity
    }

    /// Number of ids handed out since creation or the last reset
    pub const fn allocated(&self) -> u32 {
        self.next_id
    }

    /// Start again from id 0 (scene teardown)
    pub fn reset(&mut self) {
        self.next_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_not_valid() {
        assert!(!Entity::INVALID.is_valid());
        assert!(!Entity::ALL.is_valid());
        assert!(Entity::ALL.is_all());
        assert!(Entity::from_raw(0).is_valid());
        assert_eq!(Entity::default(), Entity::INVALID);
    }

    #[test]
    fn test_allocator_is_monotonic() {
        let mut allocator = EntityAllocator::new();
        let a = allocator.allocate();
        let b = allocator.allocate();

        assert!(a < b);
        assert_eq!(allocator.allocated(), 2);

        allocator.reset();
        assert_eq!(allocator.allocate(), a);
    }

    #[test]
    fn test_allocator_exhaustion_yields_invalid() {
        let mut allocator = EntityAllocator { next_id: Entity::ALL.id() };
        assert_eq!(allocator.allocate(), Entity::INVALID);
        assert_eq!(allocator.allocate(), Entity::INVALID);
    }
}
