//! # Scene ECS
//!
//! Entity-component-system runtime for a 3D scene editor, with a
//! hierarchical transform system keeping cached world poses in sync with a
//! parent/child tree of local poses.
//!
//! ## Features
//!
//! - **Dense Component Pools**: O(1) lookup and swap-remove per component kind
//! - **Tag Dispatch**: Component creation routed to the one owning system
//! - **Scene Graph**: Parent/child links with eager world pose propagation
//! - **Scene Documents**: Capture, save and restore hierarchies as RON
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_ecs::prelude::*;
//!
//! fn main() -> Result<(), EcsError> {
//!     let mut world = World::with_transform_system(WorldConfig::new("quick_start"))?;
//!     let parent = world.create_entity();
//!     let child = world.create_entity();
//!
//!     let transforms = world.transforms_mut().expect("transform system");
//!     transforms.create_transform(parent, Pose::from_position(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(1.0, 1.0, 1.0))?;
//!     transforms.create_transform(child, Pose::from_position(Vec3::new(0.0, 2.0, 0.0)), Vec3::new(1.0, 1.0, 1.0))?;
//!     transforms.add_child(parent, child)?;
//!
//!     let world_pose = transforms.get_world_transform(child).expect("registered").world_pose;
//!     assert_eq!(world_pose.position, Vec3::new(1.0, 2.0, 0.0));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod scene;

/// Common imports for editor and tool code
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, WorldConfig},
        ecs::{
            components::{LocalTransform, SceneGraphComponent, WorldTransformComponent},
            systems::{PooledSystem, TransformSystem},
            Component, EcsError, EcsResult, Entity, System, TypeTag, World,
        },
        foundation::math::{Mat4, Pose, Quat, Vec3},
        scene::{SceneDocument, SceneError},
    };
}
