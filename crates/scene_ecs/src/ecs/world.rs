//! ECS World implementation
//!
//! The world is the context for one loaded scene: it owns the entity
//! counter, the component type registry and the orchestrator with all of
//! its systems. Nothing in the crate is process-global.

use super::components::{LocalTransform, SceneGraphComponent, WorldTransformComponent};
use super::error::{EcsError, EcsResult};
use super::orchestrator::Orchestrator;
use super::registry::{TypeRegistry, TypeTag};
use super::system::{System, SystemId};
use super::systems::{PooledSystem, TransformSystem};
use super::{Component, Entity, EntityAllocator};
use crate::config::WorldConfig;
use std::any::Any;

/// ECS World containing all entities, systems and registered component types
#[derive(Default)]
pub struct World {
    config: WorldConfig,
    entities: EntityAllocator,
    registry: TypeRegistry,
    orchestrator: Orchestrator,
}

impl World {
    /// Create a new world with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new world from configuration
    pub fn with_config(config: WorldConfig) -> Self {
        log::info!("Creating world '{}'", config.name);
        Self {
            config,
            ..Default::default()
        }
    }

    /// Create a world with a [`TransformSystem`] handling both transform
    /// component kinds
    pub fn with_transform_system(config: WorldConfig) -> EcsResult<Self> {
        let capacity = config.pool_capacity;
        let mut world = Self::with_config(config);
        let transforms = world.add_system(Box::new(TransformSystem::with_capacity(capacity)));
        let scene_graph =
            world.register_system_for::<SceneGraphComponent>(transforms, SceneGraphComponent::TYPE_NAME)?;
        world.register_system_for::<WorldTransformComponent>(transforms, WorldTransformComponent::TYPE_NAME)?;

        // Typed attach accepts the creation payload as well as the record
        world.registry.register_alias::<LocalTransform>(scene_graph)?;
        Ok(world)
    }

    /// World settings
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Create a new entity
    pub fn create_entity(&mut self) -> Entity {
        self.entities.allocate()
    }

    /// Register a component type under `name`
    pub fn register_component<T: 'static>(&mut self, name: &'static str) -> EcsResult<TypeTag> {
        self.registry.register::<T>(name)
    }

    /// Take ownership of a system
    pub fn add_system(&mut self, system: Box<dyn System>) -> SystemId {
        self.orchestrator.add_system(system)
    }

    /// Fails if `name` already has a handler. Nothing is registered then.
    fn ensure_unhandled(&self, name: &'static str) -> EcsResult<()> {
        let tag = TypeTag::from_name(name);
        if self.orchestrator.handler_for(tag).is_some() {
            log::warn!("'{name}' already has a system");
            return Err(EcsError::DuplicateRegistration {
                tag,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Register `T` under `name` and make `system` its handler
    ///
    /// On failure the registry is left as it was.
    pub fn register_system_for<T: 'static>(&mut self, system: SystemId, name: &'static str) -> EcsResult<TypeTag> {
        if self.orchestrator.system_by_id(system).is_none() {
            log::warn!("Cannot bind '{name}' to unknown system {}", system.index());
            return Err(EcsError::invalid(format!("unknown system id {}", system.index())));
        }
        self.ensure_unhandled(name)?;

        let tag = self.register_component::<T>(name)?;
        self.orchestrator.register_system_for_type(system, tag)?;
        Ok(tag)
    }

    /// Add a [`PooledSystem`] for `T` and register it as the handler of `T`
    pub fn register_pooled<T: Component + Clone>(&mut self, name: &'static str) -> EcsResult<TypeTag> {
        self.ensure_unhandled(name)?;
        let tag = self.register_component::<T>(name)?;

        let system = PooledSystem::<T>::with_capacity(name, tag, self.config.pool_capacity);
        let id = self.add_system(Box::new(system));
        self.orchestrator.register_system_for_type(id, tag)?;
        Ok(tag)
    }

    /// Attach a component of type `T` to `entity`
    pub fn attach<T: 'static>(&mut self, entity: Entity, payload: T) -> EcsResult<()> {
        let tag = self.registry.tag_of::<T>().ok_or_else(|| {
            log::warn!("Attach of unregistered type {}", std::any::type_name::<T>());
            EcsError::NotHandled(TypeTag::from_name(std::any::type_name::<T>()))
        })?;
        self.orchestrator.create_component(entity, tag, &payload)
    }

    /// Attach a component by tag with a type-erased payload
    pub fn create_component(&mut self, entity: Entity, tag: TypeTag, payload: &dyn Any) -> EcsResult<()> {
        self.orchestrator.create_component(entity, tag, payload)
    }

    /// Remove every component of `entity` from every system
    ///
    /// Destroying a transform removes its whole subtree, so the descendants
    /// lose their other components too. They go first, leaves up.
    pub fn destroy_entity(&mut self, entity: Entity) {
        let doomed = self
            .transforms()
            .map(|transforms| transforms.subtree(entity))
            .filter(|subtree| !subtree.is_empty())
            .unwrap_or_else(|| vec![entity]);

        if doomed.len() > 1 {
            log::debug!("Destroying {entity} with {} descendants", doomed.len() - 1);
        }
        for &doomed_entity in doomed.iter().rev() {
            self.orchestrator.destroy_entity(doomed_entity);
        }
    }

    /// Drop all component state and restart entity numbering
    pub fn teardown(&mut self) {
        log::info!(
            "Tearing down world '{}' ({} entities allocated)",
            self.config.name,
            self.entities.allocated()
        );
        self.orchestrator.destroy_all();
        self.entities.reset();
    }

    /// First system of concrete type `S`
    pub fn system<S: System>(&self) -> Option<&S> {
        self.orchestrator.system::<S>()
    }

    /// First system of concrete type `S`, mutably
    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.orchestrator.system_mut::<S>()
    }

    /// The transform system, if the world has one
    pub fn transforms(&self) -> Option<&TransformSystem> {
        self.system::<TransformSystem>()
    }

    /// The transform system, mutably
    pub fn transforms_mut(&mut self) -> Option<&mut TransformSystem> {
        self.system_mut::<TransformSystem>()
    }

    /// Registered component types
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// System router
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}
