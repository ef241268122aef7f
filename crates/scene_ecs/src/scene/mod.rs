//! Scene documents
//!
//! Bridges the ECS world and files on disk. A [`SceneDocument`] is a
//! snapshot of the transform hierarchy that can be written as RON and
//! restored into a fresh [`World`](crate::ecs::World).
//!
//! ## Workflow
//!
//! ```text
//! TransformSystem --capture--> SceneDocument --save--> scene.ron
//! scene.ron --load--> SceneDocument --restore--> World
//! ```

mod document;

pub use document::{SceneDocument, SceneError, SceneNode};
