//! System orchestrator
//!
//! Owns every system of a world and routes component creation to the one
//! system registered for the component's tag. Destruction is broadcast.

use super::error::{EcsError, EcsResult};
use super::registry::TypeTag;
use super::system::{System, SystemId};
use super::Entity;
use std::any::Any;
use std::collections::HashMap;

/// Router from component tags to their owning systems
#[derive(Default)]
pub struct Orchestrator {
    systems: Vec<Box<dyn System>>,
    handlers: HashMap<TypeTag, SystemId>,
}

impl Orchestrator {
    /// Create an orchestrator with no systems
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a system
    pub fn add_system(&mut self, system: Box<dyn System>) -> SystemId {
        let id = SystemId(self.systems.len());
        log::debug!("Added system '{}' as #{}", system.name(), id.index());
        self.systems.push(system);
        id
    }

    /// Make `system` the handler for components tagged `tag`
    ///
    /// Each tag has exactly one handler; claiming a taken tag fails.
    pub fn register_system_for_type(&mut self, system: SystemId, tag: TypeTag) -> EcsResult<()> {
        let name = self
            .systems
            .get(system.index())
            .map(|s| s.name())
            .ok_or_else(|| EcsError::invalid(format!("unknown system #{}", system.index())))?;

        if let Some(owner) = self.handlers.get(&tag) {
            log::warn!(
                "Tag {tag} already handled by '{}', refusing '{name}'",
                self.systems[owner.index()].name()
            );
            return Err(EcsError::DuplicateRegistration {
                tag,
                name: name.to_string(),
            });
        }

        self.handlers.insert(tag, system);
        log::debug!("System '{name}' handles {tag}");
        Ok(())
    }

    /// Forward a creation request to the handler of `tag`
    pub fn create_component(&mut self, entity: Entity, tag: TypeTag, payload: &dyn Any) -> EcsResult<()> {
        if !entity.is_valid() {
            log::warn!("Refusing to create {tag} for {entity}");
            return Err(EcsError::invalid(format!("cannot create a component for {entity}")));
        }

        let handler = self.handlers.get(&tag).copied().ok_or(EcsError::NotHandled(tag))?;
        self.systems[handler.index()].create(entity, tag, payload)
    }

    /// Ask every system to drop its state for `entity`
    pub fn destroy_entity(&mut self, entity: Entity) {
        for system in &mut self.systems {
            system.destroy(entity);
        }
    }

    /// Ask every system to drop all of its state
    pub fn destroy_all(&mut self) {
        self.destroy_entity(Entity::ALL);
    }

    /// System registered for `tag`
    pub fn handler_for(&self, tag: TypeTag) -> Option<SystemId> {
        self.handlers.get(&tag).copied()
    }

    /// First system of concrete type `S`
    pub fn system<S: System>(&self) -> Option<&S> {
        self.systems.iter().find_map(|s| s.as_any().downcast_ref::<S>())
    }

    /// First system of concrete type `S`, mutably
    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems.iter_mut().find_map(|s| s.as_any_mut().downcast_mut::<S>())
    }

    /// System by id
    pub fn system_by_id(&self, id: SystemId) -> Option<&dyn System> {
        self.systems.get(id.index()).map(|s| &**s)
    }

    /// Number of owned systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }
}
