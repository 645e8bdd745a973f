//! Some shared 3D linear algebra concepts

use crate::numeric::{Float, MIN_DIRECTION_NORM};

use nalgebra::{Point3, Unit, Vector3};

/// Position in the native coordinate frame of the geometry
pub type Point = Point3<Float>;

/// Free 3-vector (displacement, momentum direction before normalization...)
pub type Vector = Vector3<Float>;

/// Unit 3-vector, used for ray directions
pub type Direction = Unit<Vector>;

/// Convenience const for accessing the X coordinate of a 3-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 3-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 3-vector
pub const Z: usize = 2;

/// Normalize a vector into a ray direction, if it is not (close to) null
pub fn direction(v: &Vector) -> Option<Direction> {
    Unit::try_new(*v, MIN_DIRECTION_NORM)
}

/// Build a point from a plain coordinate array, as found in descriptions
pub fn point(xyz: [Float; 3]) -> Point {
    Point::new(xyz[X], xyz[Y], xyz[Z])
}
