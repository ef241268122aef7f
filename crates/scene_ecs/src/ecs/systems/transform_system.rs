//! Hierarchical transform system
//!
//! Owns the [`SceneGraphComponent`] and [`WorldTransformComponent`] pools
//! and keeps them consistent: every structural or local edit eagerly
//! recomputes the world poses of the affected subtree, root-down, so
//! readers always see
//!
//! ```text
//! world(root) = local(root)
//! world(e)    = world(parent(e)) * local(e)
//! ```
//!
//! Traversals use explicit stacks and cycles are rejected when linking, so
//! arbitrarily deep hierarchies are safe.

use crate::ecs::components::{LocalTransform, SceneGraphComponent, WorldTransformComponent};
use crate::ecs::error::{EcsError, EcsResult};
use crate::ecs::pool::ComponentPool;
use crate::ecs::registry::TypeTag;
use crate::ecs::{Entity, System};
use crate::foundation::math::{Mat4, Pose, Vec3};
use std::any::Any;

/// Tag of [`SceneGraphComponent`]
pub const SCENE_GRAPH_TAG: TypeTag = TypeTag::from_name(SceneGraphComponent::TYPE_NAME);

/// Tag of [`WorldTransformComponent`]
pub const WORLD_TRANSFORM_TAG: TypeTag = TypeTag::from_name(WorldTransformComponent::TYPE_NAME);

fn reject(message: String) -> EcsError {
    log::warn!("TransformSystem: {message}");
    EcsError::InvalidArgument(message)
}

/// Owner of the scene graph and the cached world poses
#[derive(Debug, Default)]
pub struct TransformSystem {
    graph: ComponentPool<SceneGraphComponent>,
    world: ComponentPool<WorldTransformComponent>,
}

impl TransformSystem {
    /// Create an empty transform system
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty transform system with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            graph: ComponentPool::with_capacity(capacity),
            world: ComponentPool::with_capacity(capacity),
        }
    }

    fn require(&self, entity: Entity, role: &str) -> EcsResult<()> {
        if !entity.is_valid() {
            return Err(reject(format!("{role} {entity} is not a live entity")));
        }
        if !self.graph.contains(entity) {
            return Err(reject(format!("{role} {entity} has no transform")));
        }
        Ok(())
    }

    /// Register `entity` as a root node
    ///
    /// The world pose starts out equal to the local pose. Fails for
    /// sentinels and for entities that already have a transform; the
    /// existing record is left untouched in that case.
    pub fn create_transform(&mut self, entity: Entity, local_pose: Pose, local_scale: Vec3) -> EcsResult<()> {
        if !entity.is_valid() {
            return Err(reject(format!("cannot create a transform for {entity}")));
        }
        if self.graph.contains(entity) {
            return Err(reject(format!("{entity} already has a transform")));
        }

        self.graph.insert(SceneGraphComponent::new(entity, local_pose, local_scale));
        self.world.insert(WorldTransformComponent {
            entity,
            world_pose: local_pose,
        });

        log::debug!("Created transform for {entity}");
        Ok(())
    }

    /// Remove `entity` and its whole subtree
    ///
    /// The entity is unlinked from its parent first. Fails without mutating
    /// anything for sentinels and entities without a transform.
    pub fn destroy_transform(&mut self, entity: Entity) -> EcsResult<()> {
        self.require(entity, "entity")?;

        self.unlink_from_parent(entity);

        let mut stack = vec![entity];
        let mut removed = 0_usize;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.graph.destroy(current) {
                stack.extend(node.children);
            }
            self.world.destroy(current);
            removed += 1;
        }

        log::debug!("Destroyed transform subtree of {entity} ({removed} nodes)");
        Ok(())
    }

    /// Make `child` a child of `parent`
    ///
    /// A child that already has another parent is detached from it first.
    /// Linking a node below itself or below one of its descendants is
    /// rejected.
    pub fn add_child(&mut self, parent: Entity, child: Entity) -> EcsResult<()> {
        self.require(parent, "parent")?;
        self.require(child, "child")?;

        if parent == child {
            return Err(reject(format!("{child} cannot be its own parent")));
        }
        if self.is_ancestor(child, parent) {
            return Err(reject(format!("linking {child} under {parent} would create a cycle")));
        }

        let previous = self.get_parent(child);
        if previous != parent {
            self.unlink_from_parent(child);

            if let Some(node) = self.graph.get_mut(parent) {
                node.children.push(child);
            }
            if let Some(node) = self.graph.get_mut(child) {
                node.parent = parent;
            }
            log::debug!("Linked {child} under {parent}");
        }

        self.recalculate_world_transform(parent);
        Ok(())
    }

    /// Detach `child` from its parent, making it a root
    ///
    /// No-op for nodes that already are roots.
    pub fn remove_parent(&mut self, child: Entity) -> EcsResult<()> {
        self.require(child, "child")?;

        if self.unlink_from_parent(child) {
            log::debug!("Detached {child}");
            self.recalculate_world_transform(child);
        }
        Ok(())
    }

    /// Replace the local pose of `entity` and update its subtree
    pub fn set_local_pose(&mut self, entity: Entity, pose: Pose) -> EcsResult<()> {
        self.require(entity, "entity")?;

        if let Some(node) = self.graph.get_mut(entity) {
            node.local_pose = pose;
        }
        self.recalculate_world_transform(entity);
        Ok(())
    }

    /// Replace the local scale of `entity`
    ///
    /// Scale only affects the node's own model matrix, so no world pose
    /// changes.
    pub fn set_local_scale(&mut self, entity: Entity, scale: Vec3) -> EcsResult<()> {
        self.require(entity, "entity")?;

        if let Some(node) = self.graph.get_mut(entity) {
            node.local_scale = scale;
        }
        Ok(())
    }

    /// Removes `child` from its parent's child list and clears its parent
    /// link. Returns false for roots.
    fn unlink_from_parent(&mut self, child: Entity) -> bool {
        let parent = self.get_parent(child);
        if !parent.is_valid() {
            return false;
        }

        if let Some(node) = self.graph.get_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.graph.get_mut(child) {
            node.parent = Entity::INVALID;
        }
        true
    }

    /// True if `ancestor` lies on the parent chain of `entity`
    fn is_ancestor(&self, ancestor: Entity, entity: Entity) -> bool {
        let mut current = self.get_parent(entity);
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = self.get_parent(current);
        }
        false
    }

    /// Recompute world poses of `entity` and all of its descendants
    fn recalculate_world_transform(&mut self, entity: Entity) {
        let parent = self.get_parent(entity);
        let parent_world = self
            .world
            .get(parent)
            .map_or_else(Pose::identity, |w| w.world_pose);

        let mut stack = vec![(entity, parent_world)];
        while let Some((current, parent_world)) = stack.pop() {
            let Some(node) = self.graph.get(current) else {
                continue;
            };

            let world_pose = parent_world * node.local_pose;
            for &child in node.children.iter().rev() {
                stack.push((child, world_pose));
            }

            self.world.emplace(current).world_pose = world_pose;
        }
    }

    /// Local placement and hierarchy links of `entity`
    pub fn get_local_transform(&self, entity: Entity) -> Option<&SceneGraphComponent> {
        self.graph.get(entity)
    }

    /// Cached world pose of `entity`
    pub fn get_world_transform(&self, entity: Entity) -> Option<&WorldTransformComponent> {
        self.world.get(entity)
    }

    /// Parent of `entity`, [`Entity::INVALID`] for roots and unknown entities
    pub fn get_parent(&self, entity: Entity) -> Entity {
        self.graph.get(entity).map_or(Entity::INVALID, |node| node.parent)
    }

    /// Children of `entity` in link order (empty for unknown entities)
    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.graph.get(entity).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// `entity` followed by all of its descendants, parents before children
    ///
    /// Empty for entities without a transform.
    pub fn subtree(&self, entity: Entity) -> Vec<Entity> {
        let mut nodes = Vec::new();
        if !self.graph.contains(entity) {
            return nodes;
        }

        let mut stack = vec![entity];
        while let Some(current) = stack.pop() {
            nodes.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        nodes
    }

    /// Every node without a parent
    pub fn roots(&self) -> Vec<Entity> {
        self.graph
            .iter()
            .filter(|node| node.is_root())
            .map(|node| node.entity)
            .collect()
    }

    /// Check whether `entity` has a transform
    pub fn has_transform(&self, entity: Entity) -> bool {
        self.graph.contains(entity)
    }

    /// Model matrix for rendering: world pose followed by local scale
    pub fn model_matrix(&self, entity: Entity) -> Option<Mat4> {
        let node = self.graph.get(entity)?;
        let world = self.world.get(entity)?;
        Some(world.world_pose.to_matrix() * Mat4::new_nonuniform_scaling(&node.local_scale))
    }

    /// Scene graph records in storage order
    pub fn scene_graph(&self) -> &ComponentPool<SceneGraphComponent> {
        &self.graph
    }

    /// World pose records in storage order
    pub fn world_transforms(&self) -> &ComponentPool<WorldTransformComponent> {
        &self.world
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// True if no entity has a transform
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

impl System for TransformSystem {
    fn name(&self) -> &'static str {
        "TransformSystem"
    }

    fn create(&mut self, entity: Entity, tag: TypeTag, payload: &dyn Any) -> EcsResult<()> {
        if tag == WORLD_TRANSFORM_TAG {
            return Err(reject(format!(
                "world transforms are derived and cannot be created for {entity}"
            )));
        }
        if tag != SCENE_GRAPH_TAG {
            return Err(reject(format!("unexpected component type {tag} for {entity}")));
        }

        if let Some(local) = payload.downcast_ref::<LocalTransform>() {
            self.create_transform(entity, local.pose, local.scale)
        } else if let Some(node) = payload.downcast_ref::<SceneGraphComponent>() {
            self.create_transform(entity, node.local_pose, node.local_scale)
        } else {
            Err(reject(format!("payload for {entity} is not a local transform")))
        }
    }

    fn destroy(&mut self, entity: Entity) {
        if entity.is_all() {
            log::debug!("Clearing {} transforms", self.graph.len());
            self.graph.clear();
            self.world.clear();
        } else if self.has_transform(entity) {
            // Cannot fail: the entity is live and registered
            let _ = self.destroy_transform(entity);
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
    use crate::foundation::math::utils::yaw;
    use crate::foundation::math::{Point3, Quat};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn e(id: u32) -> Entity {
        Entity::from_raw(id)
    }

    fn one() -> Vec3 {
        Vec3::new(1.0, 1.0, 1.0)
    }

    fn at(x: f32, y: f32, z: f32) -> Pose {
        Pose::from_position(Vec3::new(x, y, z))
    }

    fn world_position(system: &TransformSystem, entity: Entity) -> Vec3 {
        system.get_world_transform(entity).unwrap().world_pose.position
    }

    /// Nodes 0..n, each a root at x = id
    fn system_with_nodes(n: u32) -> TransformSystem {
        let mut system = TransformSystem::new();
        for id in 0..n {
            system.create_transform(e(id), at(id as f32, 0.0, 0.0), one()).unwrap();
        }
        system
    }

    #[test]
    fn test_root_world_equals_local() {
        let mut system = TransformSystem::new();
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), yaw(30.0));
        system.create_transform(e(0), pose, one()).unwrap();

        assert_relative_eq!(system.get_world_transform(e(0)).unwrap().world_pose, pose, epsilon = EPSILON);
        assert!(system.get_local_transform(e(0)).unwrap().is_root());
        assert_eq!(system.get_parent(e(0)), Entity::INVALID);
    }

    #[test]
    fn test_create_rejects_sentinels_and_duplicates() {
        let mut system = system_with_nodes(1);

        for sentinel in [Entity::INVALID, Entity::ALL] {
            let result = system.create_transform(sentinel, Pose::identity(), one());
            assert!(matches!(result, Err(EcsError::InvalidArgument(_))));
        }

        let result = system.create_transform(e(0), at(9.0, 9.0, 9.0), one());
        assert!(matches!(result, Err(EcsError::InvalidArgument(_))));
        assert_relative_eq!(world_position(&system, e(0)), Vec3::zeros(), epsilon = EPSILON);
        assert_eq!(system.len(), 1);
    }

    #[test]
    fn test_child_composes_with_rotated_parent() {
        let mut system = TransformSystem::new();
        system
            .create_transform(e(0), Pose::new(Vec3::new(1.0, 0.0, 0.0), yaw(90.0)), one())
            .unwrap();
        system.create_transform(e(1), at(0.0, 0.0, 1.0), one()).unwrap();

        system.add_child(e(0), e(1)).unwrap();

        assert_relative_eq!(world_position(&system, e(1)), Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
        assert_eq!(system.get_parent(e(1)), e(0));
        assert_eq!(system.children(e(0)), &[e(1)]);
    }

    #[test]
    fn test_three_level_chain_composes_all_ancestors() {
        let mut system = system_with_nodes(3);
        system.add_child(e(0), e(1)).unwrap();
        system.add_child(e(1), e(2)).unwrap();

        // x offsets 0 + 1 + 2
        assert_relative_eq!(world_position(&system, e(2)), Vec3::new(3.0, 0.0, 0.0), epsilon = EPSILON);

        system.set_local_pose(e(0), at(10.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(world_position(&system, e(1)), Vec3::new(11.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(world_position(&system, e(2)), Vec3::new(13.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_linking_subtree_updates_descendants() {
        let mut system = system_with_nodes(3);
        system.add_child(e(1), e(2)).unwrap();
        system.add_child(e(0), e(1)).unwrap();

        assert_relative_eq!(world_position(&system, e(2)), Vec3::new(3.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_add_child_rejects_invalid_links() {
        let mut system = system_with_nodes(3);
        system.add_child(e(0), e(1)).unwrap();
        system.add_child(e(1), e(2)).unwrap();

        let cases = [
            (e(0), e(0)),
            (e(2), e(0)),
            (e(1), e(0)),
            (Entity::INVALID, e(1)),
            (e(0), Entity::ALL),
            (e(0), e(7)),
        ];
        for (parent, child) in cases {
            let result = system.add_child(parent, child);
            assert!(matches!(result, Err(EcsError::InvalidArgument(_))), "{parent} -> {child}");
        }

        assert_eq!(system.get_parent(e(0)), Entity::INVALID);
        assert_eq!(system.children(e(0)), &[e(1)]);
        assert_eq!(system.children(e(1)), &[e(2)]);
    }

    #[test]
    fn test_reparent_detaches_from_previous_parent() {
        let mut system = system_with_nodes(3);
        system.add_child(e(0), e(2)).unwrap();
        system.add_child(e(1), e(2)).unwrap();

        assert!(system.children(e(0)).is_empty());
        assert_eq!(system.children(e(1)), &[e(2)]);
        assert_eq!(system.get_parent(e(2)), e(1));
        assert_relative_eq!(world_position(&system, e(2)), Vec3::new(3.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_readding_same_child_does_not_duplicate() {
        let mut system = system_with_nodes(2);
        system.add_child(e(0), e(1)).unwrap();
        system.add_child(e(0), e(1)).unwrap();

        assert_eq!(system.children(e(0)), &[e(1)]);
    }

    #[test]
    fn test_remove_parent_makes_root() {
        let mut system = system_with_nodes(2);
        system.add_child(e(0), e(1)).unwrap();
        system.set_local_pose(e(0), at(5.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(world_position(&system, e(1)), Vec3::new(6.0, 0.0, 0.0), epsilon = EPSILON);

        system.remove_parent(e(1)).unwrap();

        assert_eq!(system.get_parent(e(1)), Entity::INVALID);
        assert!(system.children(e(0)).is_empty());
        assert_relative_eq!(world_position(&system, e(1)), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);

        // Already a root
        system.remove_parent(e(1)).unwrap();
        assert!(matches!(system.remove_parent(e(9)), Err(EcsError::InvalidArgument(_))));
    }

    #[test]
    fn test_destroy_removes_subtree_and_unlinks() {
        let mut system = system_with_nodes(5);
        system.add_child(e(0), e(1)).unwrap();
        system.add_child(e(1), e(2)).unwrap();
        system.add_child(e(1), e(3)).unwrap();
        system.add_child(e(0), e(4)).unwrap();

        system.destroy_transform(e(1)).unwrap();

        for gone in [e(1), e(2), e(3)] {
            assert!(!system.has_transform(gone));
            assert!(system.get_world_transform(gone).is_none());
        }
        assert_eq!(system.children(e(0)), &[e(4)]);
        assert_eq!(system.len(), 2);
        assert_eq!(system.world_transforms().len(), 2);
    }

    #[test]
    fn test_destroy_root_of_chain() {
        let mut system = system_with_nodes(3);
        system.add_child(e(0), e(1)).unwrap();
        system.add_child(e(1), e(2)).unwrap();

        system.destroy_transform(e(0)).unwrap();

        assert!(!system.has_transform(e(1)));
        assert!(!system.has_transform(e(2)));
        assert!(system.is_empty());
    }

    #[test]
    fn test_destroy_rejects_unknown_without_mutation() {
        let mut system = system_with_nodes(2);
        system.add_child(e(0), e(1)).unwrap();

        for entity in [Entity::INVALID, Entity::ALL, e(5)] {
            assert!(matches!(system.destroy_transform(entity), Err(EcsError::InvalidArgument(_))));
        }
        assert_eq!(system.len(), 2);
        assert_eq!(system.children(e(0)), &[e(1)]);
    }

    #[test]
    fn test_queries_tolerate_unknown_entities() {
        let system = system_with_nodes(1);

        for entity in [Entity::INVALID, Entity::ALL, e(3)] {
            assert!(system.get_local_transform(entity).is_none());
            assert!(system.get_world_transform(entity).is_none());
            assert!(system.model_matrix(entity).is_none());
            assert!(system.children(entity).is_empty());
            assert_eq!(system.get_parent(entity), Entity::INVALID);
        }
    }

    #[test]
    fn test_model_matrix_applies_scale_after_pose() {
        let mut system = TransformSystem::new();
        let pose = Pose::new(Vec3::new(0.0, 1.0, 0.0), yaw(90.0));
        system.create_transform(e(0), pose, one()).unwrap();
        system.set_local_scale(e(0), Vec3::new(2.0, 2.0, 2.0)).unwrap();

        let model = system.model_matrix(e(0)).unwrap();
        let corner = model.transform_point(&Point3::new(0.0, 0.0, 1.0));

        // +Z scaled to 2 then yawed onto +X, lifted by 1
        assert_relative_eq!(corner, Point3::new(2.0, 1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_scale_is_not_inherited() {
        let mut system = system_with_nodes(2);
        system.set_local_scale(e(0), Vec3::new(3.0, 3.0, 3.0)).unwrap();
        system.add_child(e(0), e(1)).unwrap();

        assert_relative_eq!(world_position(&system, e(1)), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
        let model = system.model_matrix(e(1)).unwrap();
        assert_relative_eq!(model[(0, 0)], 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_parent_rotation_turns_child() {
        let mut system = TransformSystem::new();
        system.create_transform(e(0), Pose::from_orientation(yaw(90.0)), one()).unwrap();
        system.create_transform(e(1), Pose::from_orientation(yaw(90.0)), one()).unwrap();
        system.add_child(e(0), e(1)).unwrap();

        let expected: Quat = yaw(180.0);
        let world = system.get_world_transform(e(1)).unwrap().world_pose;
        let forward = world.transform_vector(&Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(forward, expected * Vec3::new(0.0, 0.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_roots() {
        let mut system = system_with_nodes(4);
        system.add_child(e(0), e(1)).unwrap();
        system.add_child(e(2), e(3)).unwrap();

        let mut roots = system.roots();
        roots.sort();
        assert_eq!(roots, vec![e(0), e(2)]);
    }

    #[test]
    fn test_subtree_lists_parents_before_children() {
        let mut system = system_with_nodes(5);
        system.add_child(e(0), e(1)).unwrap();
        system.add_child(e(1), e(2)).unwrap();
        system.add_child(e(0), e(3)).unwrap();

        assert_eq!(system.subtree(e(0)), vec![e(0), e(1), e(2), e(3)]);
        assert_eq!(system.subtree(e(1)), vec![e(1), e(2)]);
        assert_eq!(system.subtree(e(4)), vec![e(4)]);
        assert!(system.subtree(e(9)).is_empty());
        assert!(system.subtree(Entity::ALL).is_empty());
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let depth = 2_000;
        let mut system = TransformSystem::with_capacity(depth as usize);
        for id in 0..depth {
            system.create_transform(e(id), at(1.0, 0.0, 0.0), one()).unwrap();
        }
        for id in 1..depth {
            system.add_child(e(id - 1), e(id)).unwrap();
        }

        assert_relative_eq!(world_position(&system, e(depth - 1)).x, depth as f32, epsilon = 1e-2);

        system.destroy_transform(e(0)).unwrap();
        assert!(system.is_empty());
    }

    #[test]
    fn test_system_create_dispatch() {
        let mut system = TransformSystem::new();
        let payload = LocalTransform::from_pose(at(1.0, 2.0, 3.0)).with_uniform_scale(2.0);

        system.create(e(0), SCENE_GRAPH_TAG, &payload).unwrap();
        assert_eq!(system.get_local_transform(e(0)).unwrap().local_scale, Vec3::new(2.0, 2.0, 2.0));

        let node = SceneGraphComponent::new(e(99), at(4.0, 0.0, 0.0), one());
        system.create(e(1), SCENE_GRAPH_TAG, &node).unwrap();
        assert_eq!(system.get_local_transform(e(1)).unwrap().entity, e(1));

        let derived = system.create(e(2), WORLD_TRANSFORM_TAG, &payload);
        assert!(matches!(derived, Err(EcsError::InvalidArgument(_))));

        let wrong_payload = system.create(e(2), SCENE_GRAPH_TAG, &5_u32);
        assert!(matches!(wrong_payload, Err(EcsError::InvalidArgument(_))));
        assert!(!system.has_transform(e(2)));
    }

    #[test]
    fn test_system_destroy() {
        let mut system = system_with_nodes(3);
        system.add_child(e(0), e(1)).unwrap();

        System::destroy(&mut system, e(42));
        assert_eq!(system.len(), 3);

        System::destroy(&mut system, e(0));
        assert_eq!(system.len(), 1);

        System::destroy(&mut system, Entity::ALL);
        assert!(system.is_empty());
        assert!(system.world_transforms().is_empty());
    }
}
