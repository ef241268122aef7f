//! System trait
//!
//! A system owns the storage for one or more component kinds. The
//! orchestrator hands it type-erased creation payloads and broadcasts
//! destruction requests; readers query the concrete system directly.

use super::error::EcsResult;
use super::registry::TypeTag;
use super::Entity;
use std::any::Any;

/// Index of a system inside its [`Orchestrator`](super::Orchestrator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(pub(crate) usize);

impl SystemId {
    /// Position in registration order
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Owner and handler of component kinds
pub trait System: Any {
    /// Human readable name for logs
    fn name(&self) -> &'static str;

    /// Validate and store `payload` as the `tag` component of `entity`
    ///
    /// Implementations reject payloads of an unexpected type or tag with
    /// [`EcsError::InvalidArgument`](super::EcsError::InvalidArgument) and
    /// leave their state unchanged.
    fn create(&mut self, entity: Entity, tag: TypeTag, payload: &dyn Any) -> EcsResult<()>;

    /// Release all state held for `entity`
    ///
    /// [`Entity::ALL`] clears everything. Unknown entities are ignored.
    fn destroy(&mut self, entity: Entity);

    /// Upcast for typed lookup
    fn as_any(&self) -> &dyn Any;

    /// Upcast for typed mutable lookup
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
