//! Axis-aligned bounding volumes
//!
//! Collision in the runner is a cheap box-vs-box test. Boxes come from a
//! [`BoundsProvider`], which stands in for the renderer's "box from object
//! transform" helper and must be a pure function of the transform.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box of the given full size centred on `center`
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Overlap test; touching faces count as intersecting
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Visual rotation about the y (yaw) and z (bank) axes, radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub y: f32,
    pub z: f32,
}

impl Rotation {
    pub const ZERO: Self = Self { y: 0.0, z: 0.0 };
}

/// Position plus the visual rotation of an entity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Rotation,
}

/// Computes an entity's world-space box from its transform
pub trait BoundsProvider {
    fn bounding_box(&self, transform: &Transform) -> Aabb;
}

/// Box of fixed size centred on the transform's translation
///
/// The visual yaw/bank stays small (under π/8) so it is ignored; the
/// template box already encloses the model at rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateBounds {
    pub size: Vec3,
}

impl TemplateBounds {
    pub fn new(size: Vec3) -> Self {
        Self { size }
    }
}

impl BoundsProvider for TemplateBounds {
    fn bounding_box(&self, transform: &Transform) -> Aabb {
        Aabb::from_center_size(transform.translation, self.size)
    }
}
