//! Transform components
//!
//! Pure data. The hierarchy and the derived world poses are maintained by
//! [`TransformSystem`](crate::ecs::systems::TransformSystem); these records
//! are read-only to everything else.

use crate::ecs::reflect::{FieldRef, VisitFields};
use crate::ecs::{Component, Entity};
use crate::foundation::math::{Pose, Vec3};
use serde::{Deserialize, Serialize};

/// Local placement of an entity and its place in the scene graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGraphComponent {
    /// Owning entity
    pub entity: Entity,

    /// Pose relative to the parent (or to the world for roots)
    pub local_pose: Pose,

    /// Per-axis scale; not propagated to children
    pub local_scale: Vec3,

    /// Parent entity, [`Entity::INVALID`] for roots
    pub parent: Entity,

    /// Ordered children, without duplicates
    pub children: Vec<Entity>,
}

impl SceneGraphComponent {
    /// Name the component kind is registered under
    pub const TYPE_NAME: &'static str = "SceneGraphComponent";

    /// Root node with the given local placement
    pub fn new(entity: Entity, local_pose: Pose, local_scale: Vec3) -> Self {
        Self {
            entity,
            local_pose,
            local_scale,
            parent: Entity::INVALID,
            children: Vec::new(),
        }
    }

    /// True if the node has no parent
    pub fn is_root(&self) -> bool {
        !self.parent.is_valid()
    }
}

impl Component for SceneGraphComponent {
    fn for_entity(entity: Entity) -> Self {
        Self::new(entity, Pose::identity(), Vec3::new(1.0, 1.0, 1.0))
    }

    fn entity(&self) -> Entity {
        self.entity
    }

    fn set_entity(&mut self, entity: Entity) {
        self.entity = entity;
    }
}

impl VisitFields for SceneGraphComponent {
    fn visit_fields(&self, visitor: &mut dyn FnMut(&'static str, FieldRef<'_>)) {
        visitor("local_pose", FieldRef::Pose(&self.local_pose));
        visitor("local_scale", FieldRef::Vec3(&self.local_scale));
        visitor("parent", FieldRef::Entity(&self.parent));
        visitor("children", FieldRef::Entities(&self.children));
    }
}

/// Cached world-space pose, derived from the scene graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldTransformComponent {
    /// Owning entity
    pub entity: Entity,

    /// Composition of every ancestor's local pose and this node's own
    pub world_pose: Pose,
}

impl WorldTransformComponent {
    /// Name the component kind is registered under
    pub const TYPE_NAME: &'static str = "WorldTransformComponent";

    /// World position shorthand
    pub fn position(&self) -> Vec3 {
        self.world_pose.position
    }
}

impl Component for WorldTransformComponent {
    fn for_entity(entity: Entity) -> Self {
        Self {
            entity,
            world_pose: Pose::identity(),
        }
    }

    fn entity(&self) -> Entity {
        self.entity
    }

    fn set_entity(&mut self, entity: Entity) {
        self.entity = entity;
    }
}

impl VisitFields for WorldTransformComponent {
    fn visit_fields(&self, visitor: &mut dyn FnMut(&'static str, FieldRef<'_>)) {
        visitor("world_pose", FieldRef::Pose(&self.world_pose));
    }
}

/// Creation payload for a [`SceneGraphComponent`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalTransform {
    /// Pose relative to the future parent
    pub pose: Pose,

    /// Per-axis scale
    pub scale: Vec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            pose: Pose::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl LocalTransform {
    /// Unscaled payload at `pose`
    pub fn from_pose(pose: Pose) -> Self {
        Self {
            pose,
            ..Default::default()
        }
    }

    /// Builder pattern: Set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder pattern: Set uniform scale
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }
}
