//! Generic single-kind system
//!
//! Stores one plain data component per entity in a [`ComponentPool`].
//! Used for component kinds that need no logic beyond storage (render and
//! physics parameters edited in the inspector).

use crate::ecs::error::{EcsError, EcsResult};
use crate::ecs::pool::ComponentPool;
use crate::ecs::registry::TypeTag;
use crate::ecs::{Component, Entity, System};
use std::any::Any;

/// System owning every `T` component of a world
#[derive(Debug)]
pub struct PooledSystem<T: Component> {
    name: &'static str,
    tag: TypeTag,
    pool: ComponentPool<T>,
}

impl<T: Component + Clone> PooledSystem<T> {
    /// Create a system accepting payloads tagged `tag`
    pub fn new(name: &'static str, tag: TypeTag) -> Self {
        Self::with_capacity(name, tag, 0)
    }

    /// Create a system with room for `capacity` records
    pub fn with_capacity(name: &'static str, tag: TypeTag, capacity: usize) -> Self {
        Self {
            name,
            tag,
            pool: ComponentPool::with_capacity(capacity),
        }
    }

    /// Tag this system handles
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Record for `entity`
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.pool.get(entity)
    }

    /// Record for `entity`, mutably
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.pool.get_mut(entity)
    }

    /// Underlying storage
    pub fn pool(&self) -> &ComponentPool<T> {
        &self.pool
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// True if no entity has a record
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

impl<T: Component + Clone> System for PooledSystem<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn create(&mut self, entity: Entity, tag: TypeTag, payload: &dyn Any) -> EcsResult<()> {
        if tag != self.tag {
            log::warn!("{}: unexpected component type {tag} for {entity}", self.name);
            return Err(EcsError::invalid(format!("{} does not handle {tag}", self.name)));
        }
        let Some(data) = payload.downcast_ref::<T>() else {
            log::warn!("{}: payload for {entity} has the wrong type", self.name);
            return Err(EcsError::invalid(format!("payload for {entity} is not a {}", self.name)));
        };

        let mut record = data.clone();
        record.set_entity(entity);
        *self.pool.emplace(entity) = record;
        Ok(())
    }

    fn destroy(&mut self, entity: Entity) {
        if entity.is_all() {
            self.pool.clear();
        } else {
            self.pool.destroy(entity);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Mass {
        entity: Entity,
        kilograms: f32,
    }

    impl Component for Mass {
        fn for_entity(entity: Entity) -> Self {
            Self { entity, kilograms: 1.0 }
        }

        fn entity(&self) -> Entity {
            self.entity
        }

        fn set_entity(&mut self, entity: Entity) {
            self.entity = entity;
        }
    }

    const MASS: TypeTag = TypeTag::from_name("Mass");

    fn mass(kilograms: f32) -> Mass {
        Mass {
            entity: Entity::INVALID,
            kilograms,
        }
    }

    #[test]
    fn test_create_tags_record_with_entity() {
        let mut system = PooledSystem::<Mass>::new("mass", MASS);
        let e = Entity::from_raw(3);

        system.create(e, MASS, &mass(5.0)).unwrap();

        let stored = system.get(e).unwrap();
        assert_eq!(stored.entity, e);
        assert_eq!(stored.kilograms, 5.0);
    }

    #[test]
    fn test_create_overwrites_existing_data() {
        let mut system = PooledSystem::<Mass>::new("mass", MASS);
        let e = Entity::from_raw(0);

        system.create(e, MASS, &mass(1.0)).unwrap();
        system.create(e, MASS, &mass(2.0)).unwrap();

        assert_eq!(system.len(), 1);
        assert_eq!(system.get(e).map(|m| m.kilograms), Some(2.0));
    }

    #[test]
    fn test_rejects_foreign_payloads() {
        let mut system = PooledSystem::<Mass>::new("mass", MASS);
        let e = Entity::from_raw(0);

        let wrong_type = system.create(e, MASS, &1.0_f32);
        assert!(matches!(wrong_type, Err(EcsError::InvalidArgument(_))));

        let wrong_tag = system.create(e, TypeTag::from_name("Other"), &mass(1.0));
        assert!(matches!(wrong_tag, Err(EcsError::InvalidArgument(_))));

        assert!(system.is_empty());
    }

    #[test]
    fn test_destroy() {
        let mut system = PooledSystem::<Mass>::new("mass", MASS);
        for id in 0..3 {
            system.create(Entity::from_raw(id), MASS, &mass(1.0)).unwrap();
        }

        system.destroy(Entity::from_raw(1));
        assert_eq!(system.len(), 2);
        assert!(system.get(Entity::from_raw(1)).is_none());

        system.destroy(Entity::ALL);
        assert!(system.pool().is_empty());
    }
}
