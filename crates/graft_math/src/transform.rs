//! Local transform with Euler rotation

use crate::vector::Vec3;

/// Position, rotation and scale relative to a parent.
///
/// Rotation is stored as Euler angles in degrees. Keeping the angles (rather
/// than a quaternion) lets callers replace one axis exactly while leaving the
/// other two untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Create a new transform
    #[inline]
    pub const fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Create from position only
    #[inline]
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::IDENTITY }
    }

    /// Set position (builder pattern)
    #[inline]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set all three Euler angles in degrees (builder pattern)
    #[inline]
    pub fn with_rotation(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees;
        self
    }

    /// Set the Z angle in degrees, keeping X and Y (builder pattern)
    #[inline]
    pub fn with_rotation_z(mut self, degrees: f32) -> Self {
        self.rotation.z = degrees;
        self
    }

    /// Set scale (builder pattern)
    #[inline]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Z angle in degrees
    #[inline]
    pub fn rotation_z(&self) -> f32 {
        self.rotation.z
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
