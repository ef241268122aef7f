//! Scene document capture, persistence and restore

use crate::ecs::systems::TransformSystem;
use crate::ecs::{EcsError, Entity, World};
use crate::foundation::math::{Pose, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Scene document errors
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// A node names a parent that is not part of the document
    #[error("Node {node} references unknown parent {parent}")]
    UnknownParent {
        /// Node holding the reference
        node: Entity,
        /// Missing parent
        parent: Entity,
    },

    /// Two nodes share an entity id
    #[error("Entity {0} appears more than once")]
    DuplicateNode(Entity),

    /// Following parent links from this node leads back to it
    #[error("Node {0} is part of a parent cycle")]
    CyclicParent(Entity),

    /// The target world has no transform system
    #[error("World has no transform system")]
    MissingTransformSystem,

    /// ECS operation failed while restoring
    #[error("ECS error: {0}")]
    Ecs(#[from] EcsError),
}

/// One transform node as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Entity id at capture time; only meaningful inside the document
    pub entity: Entity,

    /// Pose relative to the parent
    pub local_pose: Pose,

    /// Per-axis scale
    pub local_scale: Vec3,

    /// Parent node, `None` for roots
    #[serde(default)]
    pub parent: Option<Entity>,
}

/// Snapshot of a transform hierarchy, parents listed before children
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Nodes in root-down order
    pub nodes: Vec<SceneNode>,
}

impl SceneDocument {
    /// Snapshot every node of `transforms`
    ///
    /// Roots are visited in entity order, each subtree depth first with
    /// children in link order.
    pub fn capture(transforms: &TransformSystem) -> Self {
        let mut roots = transforms.roots();
        roots.sort_unstable();

        let mut nodes = Vec::with_capacity(transforms.len());
        let mut stack: Vec<Entity> = roots.into_iter().rev().collect();
        while let Some(entity) = stack.pop() {
            let Some(local) = transforms.get_local_transform(entity) else {
                continue;
            };

            nodes.push(SceneNode {
                entity,
                local_pose: local.local_pose,
                local_scale: local.local_scale,
                parent: local.parent.is_valid().then_some(local.parent),
            });
            stack.extend(local.children.iter().rev());
        }

        log::debug!("Captured {} scene nodes", nodes.len());
        Self { nodes }
    }

    /// Check ids, parent references and parent chains without touching
    /// any world
    fn validate(&self) -> Result<(), SceneError> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(node.entity) {
                return Err(SceneError::DuplicateNode(node.entity));
            }
        }

        for node in &self.nodes {
            if let Some(parent) = node.parent {
                if !seen.contains(&parent) {
                    return Err(SceneError::UnknownParent {
                        node: node.entity,
                        parent,
                    });
                }
            }
        }

        self.check_acyclic()
    }

    /// Every parent chain must end at a root
    fn check_acyclic(&self) -> Result<(), SceneError> {
        let parents: HashMap<Entity, Option<Entity>> =
            self.nodes.iter().map(|node| (node.entity, node.parent)).collect();

        // Nodes already known to reach a root
        let mut grounded = HashSet::with_capacity(self.nodes.len());
        let mut chain = Vec::new();
        for node in &self.nodes {
            chain.clear();
            let mut current = Some(node.entity);
            while let Some(entity) = current {
                if grounded.contains(&entity) {
                    break;
                }
                if chain.contains(&entity) {
                    log::warn!("Scene document has a parent cycle through {entity}");
                    return Err(SceneError::CyclicParent(entity));
                }
                chain.push(entity);
                current = parents.get(&entity).copied().flatten();
            }
            grounded.extend(chain.iter().copied());
        }
        Ok(())
    }

    /// Replace the contents of `world` with this document
    ///
    /// The world is torn down first, so entity ids restart. Every node gets
    /// a fresh entity; the new entities are returned in document order.
    /// A document that fails validation (duplicate ids, unknown parents or
    /// parent cycles) leaves the world untouched.
    pub fn restore(&self, world: &mut World) -> Result<Vec<Entity>, SceneError> {
        self.validate()?;
        if world.transforms().is_none() {
            return Err(SceneError::MissingTransformSystem);
        }

        world.teardown();

        let entities: Vec<Entity> = self.nodes.iter().map(|_| world.create_entity()).collect();
        let remap: HashMap<Entity, Entity> = self
            .nodes
            .iter()
            .zip(&entities)
            .map(|(node, &entity)| (node.entity, entity))
            .collect();

        let transforms = world.transforms_mut().ok_or(SceneError::MissingTransformSystem)?;
        for (node, &entity) in self.nodes.iter().zip(&entities) {
            transforms.create_transform(entity, node.local_pose, node.local_scale)?;
        }
        for (node, &entity) in self.nodes.iter().zip(&entities) {
            if let Some(parent) = node.parent.and_then(|parent| remap.get(&parent)) {
                transforms.add_child(*parent, entity)?;
            }
        }

        log::info!("Restored {} scene nodes into '{}'", entities.len(), world.config().name);
        Ok(entities)
    }

    /// Serialize to pretty RON
    pub fn to_ron_string(&self) -> Result<String, SceneError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Serialize(e.to_string()))
    }

    /// Parse from RON
    pub fn from_ron_str(text: &str) -> Result<Self, SceneError> {
        ron::from_str(text).map_err(|e| SceneError::Parse(e.to_string()))
    }

    /// Write the document to `path` as RON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_ron_string()?)?;
        log::info!("Saved {} scene nodes to {}", self.nodes.len(), path.display());
        Ok(())
    }

    /// Read a RON document from `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let document = Self::from_ron_str(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded {} scene nodes from {}", document.nodes.len(), path.display());
        Ok(document)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the document has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
