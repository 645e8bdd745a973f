//! Estimation of the maximal path length through each target nuclide
//!
//! Event generation drivers use these maxima to normalize their interaction
//! probabilities before rejection sampling. Computing the exact maximum is
//! out of reach for arbitrary geometries, so it is estimated by shooting
//! rays from random points of the surface of a bounding box, in random
//! inward directions, and keeping the largest path length seen. This is a
//! Monte Carlo estimate, which can only underestimate the true maximum.

use crate::{
    geo::{shape::BoundingBox, Geometry},
    linalg::{self, Point, Vector, X, Y, Z},
    nuclide::NuclideId,
    numeric::Float,
    random::UniformSource,
    stepper::{self, Ray},
};

/// Number of boundary steps after which a scanning ray is abandoned
pub const MAX_SCAN_STEPS: usize = 100;

/// Face of a bounding box
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoxFace {
    /// +Y face
    Top,
    /// -Y face
    Bottom,
    /// -X face
    Left,
    /// +X face
    Right,
    /// -Z face
    Back,
    /// +Z face
    Front,
}
//
impl BoxFace {
    /// All faces, in scanning order
    pub const ALL: [BoxFace; 6] = [
        BoxFace::Top,
        BoxFace::Bottom,
        BoxFace::Left,
        BoxFace::Right,
        BoxFace::Back,
        BoxFace::Front,
    ];

    /// Axis normal to the face, and sign of the inward direction along it
    fn inward_axis(self) -> (usize, Float) {
        match self {
            BoxFace::Top => (Y, -1.),
            BoxFace::Bottom => (Y, 1.),
            BoxFace::Left => (X, 1.),
            BoxFace::Right => (X, -1.),
            BoxFace::Back => (Z, 1.),
            BoxFace::Front => (Z, -1.),
        }
    }

    /// Draw a point uniformly on this face of a box
    pub fn random_point(
        self,
        bbox: &BoundingBox,
        rng: &mut (impl UniformSource + ?Sized),
    ) -> Point {
        let (normal, inward) = self.inward_axis();
        let mut point = bbox.origin;
        for axis in X..=Z {
            let half = bbox.half_lengths[axis];
            point[axis] += if axis == normal {
                -inward * half
            } else {
                -half + 2. * half * rng.random()
            };
        }
        point
    }

    /// Draw a direction pointing into the box through this face
    ///
    /// The normal component is drawn in [0, 1] (with inward sign) and the
    /// tangential ones in [-0.5, 0.5] before normalization, which favors
    /// directions close to the face normal.
    ///
    pub fn random_direction(self, rng: &mut (impl UniformSource + ?Sized)) -> Vector {
        let (normal, inward) = self.inward_axis();
        Vector::from_fn(|axis, _| {
            if axis == normal {
                inward * rng.random()
            } else {
                rng.random() - 0.5
            }
        })
    }
}

/// Sampling density of the maximal path length scan
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScanSettings {
    /// Number of random points on each face of the bounding box
    pub n_points: usize,

    /// Number of random rays shot from each point
    pub n_rays: usize,
}
//
impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            n_points: 200,
            n_rays: 200,
        }
    }
}

/// Path length through a nuclide along a ray, abandoning rays which take
/// more than MAX_SCAN_STEPS boundary steps
pub fn path_length_through(
    geometry: &(impl Geometry + ?Sized),
    ray: &Ray,
    nuclide: NuclideId,
    weight_with_density: bool,
) -> Float {
    let mut length = 0.;
    stepper::walk(geometry, ray, Some(MAX_SCAN_STEPS), |material, step| {
        if material.contains(nuclide) {
            length += step * material.weight(weight_with_density);
        }
    });
    length
}

/// Estimate the maximal path length through a nuclide, in native units, for
/// rays entering through the surface of a bounding box
pub fn max_path_length(
    geometry: &(impl Geometry + ?Sized),
    bbox: &BoundingBox,
    nuclide: NuclideId,
    settings: ScanSettings,
    weight_with_density: bool,
    rng: &mut (impl UniformSource + ?Sized),
) -> Float {
    let mut max_length: Float = 0.;
    for face in BoxFace::ALL {
        log::debug!("Box surface scanned: {face:?}");
        let face_max =
            face_max_path_length(geometry, bbox, face, nuclide, settings, weight_with_density, rng);
        max_length = max_length.max(face_max);
    }
    max_length
}

/// Maximal path length through a nuclide for rays entering through one face
/// of a bounding box
pub fn face_max_path_length(
    geometry: &(impl Geometry + ?Sized),
    bbox: &BoundingBox,
    face: BoxFace,
    nuclide: NuclideId,
    settings: ScanSettings,
    weight_with_density: bool,
    rng: &mut (impl UniformSource + ?Sized),
) -> Float {
    let mut max_length: Float = 0.;
    for _ in 0..settings.n_points {
        let origin = face.random_point(bbox, rng);
        for _ in 0..settings.n_rays {
            // Directions can only be null if the RNG returned exact zeros
            // for all components, in which case there is nothing to scan
            let Some(direction) = linalg::direction(&face.random_direction(rng)) else {
                continue;
            };
            let ray = Ray::new(origin, direction);
            let length = path_length_through(geometry, &ray, nuclide, weight_with_density);
            max_length = max_length.max(length);
        }
    }
    max_length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geo::{
            native::{tests::water_in_air, NativeGeometry},
            shape::{Shape, Solid},
            Volume,
        },
        material::Material,
        random::{testing::Replay, RandomGenerator},
    };

    fn unit_box() -> BoundingBox {
        BoundingBox::new(Point::new(1., 2., 3.), Vector::new(1., 1., 1.))
    }

    #[test]
    fn face_points() {
        let bbox = unit_box();
        let mut rng = Replay::new(&[0.5]);
        assert_eq!(BoxFace::Top.random_point(&bbox, &mut rng), Point::new(1., 3., 3.));
        assert_eq!(BoxFace::Bottom.random_point(&bbox, &mut rng), Point::new(1., 1., 3.));
        assert_eq!(BoxFace::Left.random_point(&bbox, &mut rng), Point::new(0., 2., 3.));
        assert_eq!(BoxFace::Right.random_point(&bbox, &mut rng), Point::new(2., 2., 3.));
        assert_eq!(BoxFace::Back.random_point(&bbox, &mut rng), Point::new(1., 2., 2.));
        assert_eq!(BoxFace::Front.random_point(&bbox, &mut rng), Point::new(1., 2., 4.));

        let mut rng = RandomGenerator::with_seed(1);
        for face in BoxFace::ALL {
            for _ in 0..100 {
                assert!(bbox.contains(&face.random_point(&bbox, &mut rng)));
            }
        }
    }

    #[test]
    fn face_directions_point_inwards() {
        let mut rng = RandomGenerator::with_seed(2);
        for face in BoxFace::ALL {
            let (normal, inward) = face.inward_axis();
            for _ in 0..100 {
                let dir = face.random_direction(&mut rng);
                assert!(dir[normal] * inward >= 0.);
                for axis in (X..=Z).filter(|&axis| axis != normal) {
                    assert!(dir[axis].abs() <= 0.5);
                }
            }
        }
    }

    /// Iron cube of side 2, which is its own bounding box
    fn iron_cube() -> NativeGeometry {
        NativeGeometry::new(
            Volume::new("Cube", Some(Material::pure("Iron", 7.874, 55.845, 26.).into())),
            Solid::new(
                Shape::Box {
                    half_lengths: [1., 1., 1.],
                },
                Point::origin(),
            ),
        )
        .unwrap()
    }

    #[test]
    fn cube_maximum() {
        let geometry = iron_cube();
        let bbox = geometry.bounding_box(geometry.world());
        let iron = NuclideId::new(55, 26);
        let settings = ScanSettings {
            n_points: 20,
            n_rays: 20,
        };
        let mut rng = RandomGenerator::with_seed(3);

        // Rays crossing the cube from face to opposite face are at least as
        // long as the side, and nothing is longer than the diagonal
        let max = max_path_length(&geometry, &bbox, iron, settings, false, &mut rng);
        assert!(max >= 2. - 1e-6, "max = {max}");
        assert!(max <= 2. * (3. as Float).sqrt() + 1e-6, "max = {max}");

        // Density weighting applies
        let mut rng = RandomGenerator::with_seed(3);
        let weighted = max_path_length(&geometry, &bbox, iron, settings, true, &mut rng);
        assert!((weighted - 7.874 * max).abs() < 1e-6 * weighted);

        // Absent nuclides have a zero maximum
        let oxygen = NuclideId::new(16, 8);
        let none = max_path_length(&geometry, &bbox, oxygen, settings, true, &mut rng);
        assert_eq!(none, 0.);
    }

    #[test]
    fn nested_maximum_is_bounded() {
        let geometry = water_in_air();
        let bbox = geometry.bounding_box(geometry.world());
        let settings = ScanSettings {
            n_points: 10,
            n_rays: 10,
        };
        let mut rng = RandomGenerator::with_seed(4);
        let hydrogen = NuclideId::new(1, 1);
        let max = max_path_length(&geometry, &bbox, hydrogen, settings, false, &mut rng);
        assert!(max <= 2. * (3. as Float).sqrt() + 1e-6, "max = {max}");
    }

    #[test]
    fn more_samples_never_lower_the_maximum() {
        // Scanning more points from the same random sequence extends the
        // set of rays of a face, which can only raise its maximum
        let geometry = iron_cube();
        let bbox = geometry.bounding_box(geometry.world());
        let iron = NuclideId::new(55, 26);
        let face_max = |n_points: usize| {
            let settings = ScanSettings {
                n_points,
                n_rays: 10,
            };
            let mut rng = RandomGenerator::with_seed(5);
            face_max_path_length(&geometry, &bbox, BoxFace::Top, iron, settings, true, &mut rng)
        };
        let mut previous = 0.;
        for n_points in [1, 5, 20, 50] {
            let current = face_max(n_points);
            assert!(current >= previous, "{current} < {previous} at {n_points} points");
            previous = current;
        }
        assert!(previous > 0.);

        // The whole scan is the maximum over the faces
        let settings = ScanSettings {
            n_points: 5,
            n_rays: 10,
        };
        let mut rng = RandomGenerator::with_seed(6);
        let total = max_path_length(&geometry, &bbox, iron, settings, true, &mut rng);
        let mut rng = RandomGenerator::with_seed(6);
        let faces = BoxFace::ALL.map(|face| {
            face_max_path_length(&geometry, &bbox, face, iron, settings, true, &mut rng)
        });
        assert_eq!(total, faces.into_iter().fold(0., Float::max));
    }
}
