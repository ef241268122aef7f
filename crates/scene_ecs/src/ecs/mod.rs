//! Entity-Component-System implementation
//!
//! Systems own component storage; the [`Orchestrator`] routes creation
//! requests by component tag and broadcasts destruction. A [`World`] ties
//! the pieces together for one loaded scene.

pub mod component;
pub mod components;
pub mod entity;
pub mod error;
pub mod orchestrator;
pub mod pool;
pub mod reflect;
pub mod registry;
pub mod system;
pub mod systems;
pub mod world;

#[cfg(test)]
mod tests;

pub use component::Component;
pub use entity::{Entity, EntityAllocator};
pub use error::{EcsError, EcsResult};
pub use orchestrator::Orchestrator;
pub use pool::ComponentPool;
pub use reflect::{field_names, FieldRef, VisitFields};
pub use registry::{TypeRegistry, TypeTag};
pub use system::{System, SystemId};
pub use world::World;
