//! # graft_math - Math Primitives
//!
//! The small amount of math the snapshot pipeline needs: a 3D vector and a
//! local transform whose rotation is kept as Euler angles in degrees, so a
//! single axis can be read and written without disturbing the others.

pub mod vector;
pub mod transform;

pub use vector::*;
pub use transform::*;

pub mod prelude {
    pub use crate::vector::Vec3;
    pub use crate::transform::Transform;
}
