//! Convex primitive shapes and their intersections with rays

use crate::{
    linalg::{Direction, Point, Vector, X, Y, Z},
    numeric::Float,
};

use prefix_num_ops::real::*;
use serde::Deserialize;

/// Axis-aligned box, described by its center and half-lengths
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Center of the box
    pub origin: Point,

    /// Half-lengths along each axis
    pub half_lengths: Vector,
}
//
impl BoundingBox {
    pub fn new(origin: Point, half_lengths: Vector) -> Self {
        Self {
            origin,
            half_lengths,
        }
    }

    /// Build a box from its lower and upper corners
    pub fn from_corners(min: &Point, max: &Point) -> Self {
        Self {
            origin: nalgebra::center(min, max),
            half_lengths: (max - min) / 2.,
        }
    }

    /// Lower corner
    pub fn min(&self) -> Point {
        self.origin - self.half_lengths
    }

    /// Upper corner
    pub fn max(&self) -> Point {
        self.origin + self.half_lengths
    }

    /// Truth that a point lies in the box or on its surface
    pub fn contains(&self, point: &Point) -> bool {
        (point - self.origin)
            .iter()
            .zip(self.half_lengths.iter())
            .all(|(offset, half)| offset.abs() <= *half)
    }

    /// Parameter interval over which a ray is within the box (slab method)
    pub fn ray_interval(&self, origin: &Point, direction: &Direction) -> Option<(Float, Float)> {
        let (min, max) = (self.min(), self.max());
        let mut near = -Float::INFINITY;
        let mut far = Float::INFINITY;
        for axis in X..=Z {
            let (o, d) = (origin[axis], direction[axis]);
            if d == 0. {
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (min[axis] - o) / d;
            let t2 = (max[axis] - o) / d;
            near = near.max(t1.min(t2));
            far = far.min(t1.max(t2));
            if near > far {
                return None;
            }
        }
        Some((near, far))
    }
}

/// Shape of a volume, in its own frame (centered on the origin)
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Rectangular box
    Box { half_lengths: [Float; 3] },

    /// Full sphere
    Sphere { radius: Float },

    /// Full cylinder whose axis is the Z axis
    Tube { radius: Float, half_length: Float },
}
//
impl Shape {
    /// Check that the dimensions make sense, explaining why if they don't
    pub fn validate(&self) -> Result<(), String> {
        let dims = match self {
            Shape::Box { half_lengths } => half_lengths.to_vec(),
            Shape::Sphere { radius } => vec![*radius],
            Shape::Tube {
                radius,
                half_length,
            } => vec![*radius, *half_length],
        };
        if dims.iter().all(|d| d.is_finite() && *d > 0.) {
            Ok(())
        } else {
            Err(format!("dimensions must be finite and positive, got {dims:?}"))
        }
    }

    /// Half-lengths of the bounding box
    fn half_extents(&self) -> Vector {
        match *self {
            Shape::Box { half_lengths } => Vector::from(half_lengths),
            Shape::Sphere { radius } => Vector::repeat(radius),
            Shape::Tube {
                radius,
                half_length,
            } => Vector::new(radius, radius, half_length),
        }
    }
}

/// Shape placed at some position of the world frame
#[derive(Clone, Debug, PartialEq)]
pub struct Solid {
    pub shape: Shape,
    pub center: Point,
}
//
impl Solid {
    pub fn new(shape: Shape, center: Point) -> Self {
        Self { shape, center }
    }

    /// Axis-aligned box enclosing the solid
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.center, self.shape.half_extents())
    }

    /// Truth that a point is inside the solid or on its surface
    pub fn contains(&self, point: &Point) -> bool {
        let rel = point - self.center;
        match self.shape {
            Shape::Box { .. } => self.bounding_box().contains(point),
            Shape::Sphere { radius } => rel.norm_squared() <= radius * radius,
            Shape::Tube {
                radius,
                half_length,
            } => {
                rel[Z].abs() <= half_length
                    && rel[X] * rel[X] + rel[Y] * rel[Y] <= radius * radius
            }
        }
    }

    /// Parameter interval over which the ray origin + t * direction is
    /// within the solid, if the ray's line crosses it at all
    pub fn ray_interval(&self, origin: &Point, direction: &Direction) -> Option<(Float, Float)> {
        let rel = origin - self.center;
        match self.shape {
            Shape::Box { .. } => self.bounding_box().ray_interval(origin, direction),
            Shape::Sphere { radius } => {
                let b = rel.dot(&**direction);
                let c = rel.norm_squared() - radius * radius;
                let disc = b * b - c;
                if disc < 0. {
                    return None;
                }
                let s = sqrt(disc);
                Some((-b - s, -b + s))
            }
            Shape::Tube {
                radius,
                half_length,
            } => {
                // Interval between the end caps
                let (oz, dz) = (rel[Z], direction[Z]);
                let (mut near, mut far) = if dz == 0. {
                    if oz.abs() > half_length {
                        return None;
                    }
                    (-Float::INFINITY, Float::INFINITY)
                } else {
                    let t1 = (-half_length - oz) / dz;
                    let t2 = (half_length - oz) / dz;
                    (t1.min(t2), t1.max(t2))
                };

                // Interval within the lateral surface
                let a = direction[X] * direction[X] + direction[Y] * direction[Y];
                let c = rel[X] * rel[X] + rel[Y] * rel[Y] - radius * radius;
                if a == 0. {
                    if c > 0. {
                        return None;
                    }
                } else {
                    let b = rel[X] * direction[X] + rel[Y] * direction[Y];
                    let disc = b * b - a * c;
                    if disc < 0. {
                        return None;
                    }
                    let s = sqrt(disc);
                    near = near.max((-b - s) / a);
                    far = far.min((-b + s) / a);
                }
                (near <= far).then_some((near, far))
            }
        }
    }
}

/// Distance to the point where a ray enters a region, given the region's
/// ray interval. Regions which are behind the ray origin are never entered.
pub fn entry_distance(interval: Option<(Float, Float)>) -> Option<Float> {
    interval
        .filter(|&(_, far)| far > 0.)
        .map(|(near, _)| near.max(0.))
}

/// Distance to the point where a ray leaves a region that it started in
pub fn exit_distance(interval: Option<(Float, Float)>) -> Float {
    interval.map_or(0., |(_, far)| far.max(0.))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::direction;

    const TOLERANCE: Float = 1e-9;

    fn dir(x: Float, y: Float, z: Float) -> Direction {
        direction(&Vector::new(x, y, z)).unwrap()
    }

    fn assert_interval(actual: Option<(Float, Float)>, expected: (Float, Float)) {
        let (near, far) = actual.expect("The ray should cross the shape");
        assert!((near - expected.0).abs() < TOLERANCE, "near = {near}");
        assert!((far - expected.1).abs() < TOLERANCE, "far = {far}");
    }

    #[test]
    fn box_intersections() {
        let cube = Solid::new(
            Shape::Box {
                half_lengths: [1., 2., 3.],
            },
            Point::new(10., 0., 0.),
        );
        assert!(cube.contains(&Point::new(11., 2., -3.)));
        assert!(!cube.contains(&Point::new(11.1, 0., 0.)));

        let origin = Point::origin();
        assert_interval(cube.ray_interval(&origin, &dir(1., 0., 0.)), (9., 11.));
        assert!(cube.ray_interval(&origin, &dir(0., 1., 0.)).is_none());
        assert!(cube.ray_interval(&origin, &dir(1., 1., 0.)).is_none());

        let bbox = cube.bounding_box();
        assert_eq!(bbox.min(), Point::new(9., -2., -3.));
        assert_eq!(bbox.max(), Point::new(11., 2., 3.));
    }

    #[test]
    fn sphere_intersections() {
        let ball = Solid::new(Shape::Sphere { radius: 2. }, Point::new(0., 0., 5.));
        assert!(ball.contains(&Point::new(0., 0., 3.)));
        assert!(!ball.contains(&Point::new(0., 0., 2.9)));
        assert_interval(ball.ray_interval(&Point::origin(), &dir(0., 0., 1.)), (3., 7.));
        assert!(ball.ray_interval(&Point::new(3., 0., 0.), &dir(0., 0., 1.)).is_none());
    }

    #[test]
    fn tube_intersections() {
        let tube = Solid::new(
            Shape::Tube {
                radius: 1.,
                half_length: 4.,
            },
            Point::origin(),
        );
        // Across the lateral surface
        assert_interval(tube.ray_interval(&Point::new(-5., 0., 0.), &dir(1., 0., 0.)), (4., 6.));
        // Along the axis, through the end caps
        assert_interval(tube.ray_interval(&Point::new(0., 0., -10.), &dir(0., 0., 1.)), (6., 14.));
        // Parallel to the axis, but outside of it
        assert!(tube.ray_interval(&Point::new(2., 0., -10.), &dir(0., 0., 1.)).is_none());
        // Across the lateral surface, but beyond the end caps
        assert!(tube.ray_interval(&Point::new(-5., 0., 5.), &dir(1., 0., 0.)).is_none());
    }

    #[test]
    fn entry_and_exit() {
        assert_eq!(entry_distance(Some((2., 3.))), Some(2.));
        assert_eq!(entry_distance(Some((-2., 3.))), Some(0.));
        assert_eq!(entry_distance(Some((-3., -2.))), None);
        assert_eq!(entry_distance(None), None);
        assert_eq!(exit_distance(Some((-2., 3.))), 3.);
        assert_eq!(exit_distance(None), 0.);
    }

    #[test]
    fn invalid_shapes() {
        assert!(Shape::Sphere { radius: 1. }.validate().is_ok());
        assert!(Shape::Sphere { radius: 0. }.validate().is_err());
        assert!(Shape::Box {
            half_lengths: [1., Float::NAN, 1.]
        }
        .validate()
        .is_err());
    }
}
