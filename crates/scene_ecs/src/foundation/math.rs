//! Math utilities and types
//!
//! Provides the vector, quaternion and pose types used by scene components.

use approx::{AbsDiffEq, RelativeEq};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Rigid transform: a position and an orientation, no scale.
///
/// Poses compose left to right as parent-then-child: `parent * child`
/// expresses `child` (given in the parent's frame) in the parent's outer
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation in the outer frame
    pub position: Vec3,

    /// Rotation relative to the outer frame
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Create a pose from position and orientation
    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    /// Identity pose (origin, no rotation)
    pub fn identity() -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
        }
    }

    /// Create a pose with only a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::identity(),
        }
    }

    /// Create a pose with only an orientation
    pub fn from_orientation(orientation: Quat) -> Self {
        Self {
            position: Vec3::zeros(),
            orientation,
        }
    }

    /// Express `child` (relative to this pose) in this pose's outer frame
    pub fn compose(&self, child: &Self) -> Self {
        Self {
            position: self.position + self.orientation * child.position,
            orientation: self.orientation * child.orientation,
        }
    }

    /// Get the inverse pose, such that `p.compose(&p.inverse())` is identity
    pub fn inverse(&self) -> Self {
        let orientation = self.orientation.inverse();
        Self {
            position: orientation * -self.position,
            orientation,
        }
    }

    /// Apply this pose to a point
    pub fn transform_point(&self, point: &Point3) -> Point3 {
        Point3::from(self.position + self.orientation * point.coords)
    }

    /// Rotate a direction by this pose (translation is ignored)
    pub fn transform_vector(&self, vector: &Vec3) -> Vec3 {
        self.orientation * *vector
    }

    /// Convert to a rigid transformation matrix (translation * rotation)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position) * self.orientation.to_homogeneous()
    }
}

impl Mul for Pose {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.compose(&rhs)
    }
}

impl AbsDiffEq for Pose {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.position.abs_diff_eq(&other.position, epsilon)
            && self.orientation.abs_diff_eq(&other.orientation, epsilon)
    }
}

impl RelativeEq for Pose {
    fn default_max_relative() -> f32 {
        f32::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.position.relative_eq(&other.position, epsilon, max_relative)
            && self.orientation.relative_eq(&other.orientation, epsilon, max_relative)
    }
}

/// Math utility functions
pub mod utils {
    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees.to_radians()
    }

    /// Rotation of `degrees` around the Y (up) axis
    pub fn yaw(degrees: f32) -> super::Quat {
        super::Quat::from_axis_angle(&super::Vec3::y_axis(), deg_to_rad(degrees))
    }
}
