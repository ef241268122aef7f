//! Field visitor
//!
//! Components describe their serialisable fields through [`VisitFields`].
//! Inspectors and serializers walk the fields by name without knowing the
//! concrete component type.

use super::Entity;
use crate::foundation::math::{Pose, Quat, Vec3};

/// Borrowed view of one component field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRef<'a> {
    /// Scalar
    Float(&'a f32),
    /// Vector
    Vec3(&'a Vec3),
    /// Rotation
    Quat(&'a Quat),
    /// Position and orientation
    Pose(&'a Pose),
    /// Single entity reference
    Entity(&'a Entity),
    /// Ordered entity references
    Entities(&'a [Entity]),
    /// Flag
    Bool(&'a bool),
}

/// Exposes a component's fields to a visitor, in declaration order
pub trait VisitFields {
    /// Call `visitor` once per field
    fn visit_fields(&self, visitor: &mut dyn FnMut(&'static str, FieldRef<'_>));
}

/// Names of every field `value` exposes
pub fn field_names<T: VisitFields + ?Sized>(value: &T) -> Vec<&'static str> {
    let mut names = Vec::new();
    value.visit_fields(&mut |name, _| names.push(name));
    names
}
