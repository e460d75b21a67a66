//! Transform snapshot
//!
//! Only the Z rotation is recorded. Applying a snapshot therefore replaces
//! the Z angle and leaves the live X and Y angles alone.

use graft_math::{Transform, Vec3};
use serde::{Deserialize, Serialize};

/// Local transform of one entity relative to its parent
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransformSnapshot {
    pub relative_position: Vec3,
    /// Z rotation in degrees
    pub relative_rotation: f32,
    pub local_scale: Vec3,
}

impl TransformSnapshot {
    /// Record a local transform
    pub fn capture(transform: &Transform) -> Self {
        Self {
            relative_position: transform.position,
            relative_rotation: transform.rotation_z(),
            local_scale: transform.scale,
        }
    }

    /// The live transform with this snapshot's position, Z rotation and
    /// scale written over it
    pub fn apply_to(&self, current: Transform) -> Transform {
        current
            .with_position(self.relative_position)
            .with_rotation_z(self.relative_rotation)
            .with_scale(self.local_scale)
    }
}

impl Default for TransformSnapshot {
    fn default() -> Self {
        Self::capture(&Transform::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_keeps_only_z_rotation() {
        let t = Transform::new(
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(10.0, 20.0, 45.0),
            Vec3::splat(2.0),
        );
        let snap = TransformSnapshot::capture(&t);
        assert_eq!(snap.relative_position, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(snap.relative_rotation, 45.0);
        assert_eq!(snap.local_scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_apply_preserves_live_x_y_rotation() {
        let snap = TransformSnapshot {
            relative_position: Vec3::new(3.0, 0.0, 0.0),
            relative_rotation: 90.0,
            local_scale: Vec3::ONE,
        };
        let live = Transform::IDENTITY.with_rotation(Vec3::new(5.0, 6.0, 7.0));
        let applied = snap.apply_to(live);

        assert_eq!(applied.position, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(applied.rotation, Vec3::new(5.0, 6.0, 90.0));
        assert_eq!(applied.scale, Vec3::ONE);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(TransformSnapshot::default()).unwrap();
        assert!(json.get("RelativePosition").is_some());
        assert_eq!(json.get("RelativeRotation").and_then(|v| v.as_f64()), Some(0.0));
        assert!(json.get("LocalScale").is_some());
    }
}
