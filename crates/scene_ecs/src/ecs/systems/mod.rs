//! ECS Systems module

pub mod pooled;
pub mod transform_system;

pub use pooled::PooledSystem;
pub use transform_system::{TransformSystem, SCENE_GRAPH_TAG, WORLD_TRANSFORM_TAG};
