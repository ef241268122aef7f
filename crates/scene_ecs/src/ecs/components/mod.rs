//! ECS Components module
//!
//! Components owned by the built-in systems

pub mod transform;

pub use transform::{LocalTransform, SceneGraphComponent, WorldTransformComponent};
