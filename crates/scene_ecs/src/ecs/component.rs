//! Component trait

use super::Entity;

/// A data record attached to exactly one entity
///
/// Every component carries a back-reference to the entity it describes so
/// that dense pools can repoint their index after compaction.
pub trait Component: 'static + Send + Sync {
    /// Default record tagged with `entity`
    fn for_entity(entity: Entity) -> Self
    where
        Self: Sized;

    /// The entity this record describes
    fn entity(&self) -> Entity;

    /// Re-tag the record (used when a payload built elsewhere is stored)
    fn set_entity(&mut self, entity: Entity);
}
