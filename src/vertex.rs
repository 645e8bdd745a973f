//! Sampling of interaction vertices along a ray
//!
//! The vertex is drawn in the material of a given target nuclide, with a
//! probability proportional to the (density-weighted) length travelled in it.
//! The cumulative distribution along the ray is piecewise linear, with break
//! points that only the geometry knows. So we first walk the ray from
//! boundary to boundary, recording the segments which cross the nuclide's
//! material, then pick the segment where the randomly drawn fraction of the
//! total is reached and locate the vertex inside of it in small steps.

use crate::{
    error::VertexError,
    geo::Geometry,
    linalg::Point,
    nuclide::NuclideId,
    numeric::Float,
    random::UniformSource,
    stepper::{self, Ray},
};

/// Default length of the steps used to locate the vertex, in native units
pub const DEFAULT_VERTEX_STEP: Float = 0.001;

/// Stretch of a ray which lies in a material containing the target nuclide
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSegment {
    /// Distance from the ray origin to the start of the segment
    pub start: Float,

    /// Length of the segment
    pub length: Float,

    /// Weight of the material (its density, or 1)
    pub weight: Float,
}
//
impl TargetSegment {
    pub fn weighted_length(&self) -> Float {
        self.length * self.weight
    }
}

/// Segments of a ray which cross the material of a nuclide, in ray order
pub fn target_segments(
    geometry: &(impl Geometry + ?Sized),
    ray: &Ray,
    nuclide: NuclideId,
    weight_with_density: bool,
) -> Vec<TargetSegment> {
    let mut segments = Vec::new();
    stepper::walk_segments(geometry, ray, None, |material, start, length| {
        if material.contains(nuclide) {
            segments.push(TargetSegment {
                start,
                length,
                weight: material.weight(weight_with_density),
            });
        }
    });
    segments
}

/// Total weighted path length of a set of segments
pub fn weighted_path_length(segments: &[TargetSegment]) -> Float {
    segments.iter().map(TargetSegment::weighted_length).sum()
}

/// Vertex sampler
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexSampler {
    /// Length of the steps used to locate the vertex
    pub step: Float,

    /// Truth that material density should weight path lengths
    pub weight_with_density: bool,
}
//
impl VertexSampler {
    /// Draw a vertex along a ray, in the material of some nuclide
    pub fn generate(
        &self,
        geometry: &(impl Geometry + ?Sized),
        ray: &Ray,
        nuclide: NuclideId,
        rng: &mut (impl UniformSource + ?Sized),
    ) -> Result<Point, VertexError> {
        let segments = target_segments(geometry, ray, nuclide, self.weight_with_density);
        let total = weighted_path_length(&segments);
        if total == 0. {
            log::error!("No material with nuclide {nuclide} along this ray");
            return Err(VertexError::NoTargetMaterial(nuclide));
        }
        log::debug!("(Distance)x(Density) = {total} over {} segment(s)", segments.len());
        let threshold = rng.random() * total;
        log::debug!("Random distance in selected material: {threshold}");
        self.locate_threshold(geometry, ray, nuclide, &segments, threshold)
    }

    /// Find the point of a ray where the weighted length travelled in the
    /// target segments reaches some threshold
    ///
    /// Inside of the segment where the threshold is reached, the length is
    /// counted in steps and the vertex is placed one step before the
    /// crossing point. If that position is not in the nuclide's material,
    /// the crossing point is tried, then the middle of the segment. A
    /// threshold beyond the total falls in the last segment.
    ///
    pub fn locate_threshold(
        &self,
        geometry: &(impl Geometry + ?Sized),
        ray: &Ray,
        nuclide: NuclideId,
        segments: &[TargetSegment],
        threshold: Float,
    ) -> Result<Point, VertexError> {
        if segments.is_empty() {
            return Err(VertexError::NoTargetMaterial(nuclide));
        }

        let mut before = 0.;
        let mut index = segments.len() - 1;
        for (i, segment) in segments.iter().enumerate() {
            if i == index || before + segment.weighted_length() >= threshold {
                index = i;
                break;
            }
            before += segment.weighted_length();
        }
        let segment = &segments[index];
        let residual = (threshold - before).clamp(0., segment.weighted_length());

        let weighted_step = self.step * segment.weight;
        let num_steps = if weighted_step > 0. {
            (residual / weighted_step).ceil().max(1.)
        } else {
            1.
        };
        let crossing = (num_steps * self.step).min(segment.length);
        log::trace!("Threshold crossed {crossing} into segment {index} ({segment:?})");

        let in_target = |point: &Point| {
            geometry
                .locate(point)
                .and_then(|id| geometry.volume(id).material())
                .map_or(false, |material| material.contains(nuclide))
        };
        [crossing - self.step, crossing, segment.length / 2.]
            .into_iter()
            .filter(|&offset| offset >= 0.)
            .map(|offset| ray.at(segment.start + offset))
            .find(in_target)
            .ok_or_else(|| {
                log::warn!("No point of segment {segment:?} is in a material with {nuclide}");
                VertexError::OutsideTarget(nuclide)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geo::{
            native::{tests::water_in_air, NativeGeometry},
            shape::{Shape, Solid},
            voxel::tests::iron_void_water,
            Volume,
        },
        linalg::{self, Vector},
        material::{Element, Material},
        random::testing::Replay,
    };

    fn ray(origin: [Float; 3], direction: [Float; 3]) -> Ray {
        Ray::new(
            linalg::point(origin),
            linalg::direction(&Vector::from(direction)).unwrap(),
        )
    }

    const SAMPLER: VertexSampler = VertexSampler {
        step: DEFAULT_VERTEX_STEP,
        weight_with_density: true,
    };

    const IRON: NuclideId = NuclideId::new(55, 26);

    fn iron() -> Material {
        Material::pure("Iron", 7.874, 55.845, 26.)
    }

    fn slab(half_thickness: Float, center_z: Float) -> Solid {
        Solid::new(
            Shape::Box {
                half_lengths: [1., 1., half_thickness],
            },
            Point::new(0., 0., center_z),
        )
    }

    /// 0.4mm iron foil, thinner than the vertex step, in a 5m air box
    fn foil_in_air() -> NativeGeometry {
        let air = Material::mixture(
            "Air",
            0.0012,
            vec![Element::new(14.007, 7.), Element::new(15.999, 8.)],
        );
        let mut geometry = NativeGeometry::new(
            Volume::new("World", Some(air.into())),
            Solid::new(
                Shape::Box {
                    half_lengths: [2.5, 2.5, 2.5],
                },
                Point::origin(),
            ),
        )
        .unwrap();
        geometry
            .add_daughter(0, Volume::new("Foil", Some(iron().into())), slab(0.0002, 0.0005))
            .unwrap();
        geometry
    }

    /// Distance from a point to the line of a ray
    fn distance_to_line(ray: &Ray, point: &Point) -> Float {
        let rel = point - ray.origin;
        (rel - *ray.direction * rel.dot(&*ray.direction)).norm()
    }

    /// Check that a generated vertex is in the nuclide's material
    fn assert_in_target(
        geometry: &dyn Geometry,
        result: Result<Point, VertexError>,
        nuclide: NuclideId,
    ) -> Point {
        let vertex = result.unwrap();
        let material = geometry
            .locate(&vertex)
            .and_then(|id| geometry.volume(id).material());
        assert!(
            material.map_or(false, |material| material.contains(nuclide)),
            "vertex = {vertex}, material = {material:?}"
        );
        vertex
    }

    #[test]
    fn total_weighted_length() {
        let geometry = iron_void_water();
        let r = ray([-1., 0.5, 0.5], [1., 0., 0.]);
        let segments = target_segments(&geometry, &r, IRON, true);
        assert_eq!(segments.len(), 2);
        assert!((segments[0].start - 1.).abs() < 1e-6);
        assert!((weighted_path_length(&segments) - 2. * 7.874).abs() < 1e-6);
        let segments = target_segments(&geometry, &r, NuclideId::new(15, 8), false);
        assert!((weighted_path_length(&segments) - 1.).abs() < 1e-6);
    }

    #[test]
    fn vertex_position() {
        let geometry = water_in_air();
        let r = ray([0., 0., -20.], [0., 0., 1.]);
        let hydrogen = NuclideId::new(1, 1);

        // Half of the weighted length is reached in the middle of the tank
        let mut rng = Replay::new(&[0.5]);
        let vertex = SAMPLER.generate(&geometry, &r, hydrogen, &mut rng).unwrap();
        assert!(distance_to_line(&r, &vertex) < 1e-9);
        assert!(vertex.z.abs() < 2. * SAMPLER.step, "vertex = {vertex}");

        // The vertex is always in the tank
        for u in [0., 1e-9, 0.25, 0.999_999, 1.] {
            let mut rng = Replay::new(&[u]);
            let vertex = SAMPLER.generate(&geometry, &r, hydrogen, &mut rng).unwrap();
            assert_eq!(geometry.locate(&vertex), Some(1), "u = {u}, vertex = {vertex}");
        }
    }

    #[test]
    fn sampling_is_deterministic() {
        let geometry = water_in_air();
        let r = ray([0.3, -0.2, -20.], [0.01, 0.02, 1.]);
        let oxygen = NuclideId::new(15, 8);
        let draw = || {
            let mut rng = Replay::new(&[0.7]);
            SAMPLER.generate(&geometry, &r, oxygen, &mut rng).unwrap()
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn density_weighted_placement() {
        // Oxygen lives in the air (density 0.0012) and in the water (density
        // 1), so with density weighting nearly all vertices are in the water
        let geometry = water_in_air();
        let r = ray([0., 0., -20.], [0., 0., 1.]);
        let oxygen = NuclideId::new(15, 8);
        let mut rng = Replay::new(&[0.01, 0.5, 0.99]);
        for _ in 0..3 {
            let vertex = SAMPLER.generate(&geometry, &r, oxygen, &mut rng).unwrap();
            assert_eq!(geometry.locate(&vertex), Some(1), "vertex = {vertex}");
        }

        // Without density weighting, the air in front of the tank is 4/10
        // of the oxygen path length
        let unweighted = VertexSampler {
            weight_with_density: false,
            ..SAMPLER
        };
        let mut rng = Replay::new(&[0.2]);
        let vertex = unweighted.generate(&geometry, &r, oxygen, &mut rng).unwrap();
        assert_eq!(geometry.locate(&vertex), Some(0), "vertex = {vertex}");
        assert!((vertex.z + 3.).abs() < 2. * SAMPLER.step, "vertex = {vertex}");
    }

    #[test]
    fn boundary_adjacent_threshold() {
        // A threshold reached right after entering the material must not
        // report a vertex in front of it
        let geometry = iron_void_water();
        let r = ray([-1., 0.5, 0.5], [1., 0., 0.]);
        let water = NuclideId::new(1, 1);
        let segments = target_segments(&geometry, &r, water, true);
        let vertex = SAMPLER.locate_threshold(&geometry, &r, water, &segments, 1e-12);
        assert_eq!(geometry.locate(&vertex.unwrap()), Some(3));

        // Same at the far end of a material, and beyond the total
        for threshold in [1., 10.] {
            let vertex = SAMPLER.locate_threshold(&geometry, &r, water, &segments, threshold);
            let vertex = vertex.unwrap();
            assert_eq!(geometry.locate(&vertex), Some(3), "vertex = {vertex}");
            assert!(vertex.x < 4., "vertex = {vertex}");
        }
    }

    #[test]
    fn target_thinner_than_step() {
        let geometry = foil_in_air();
        let r = ray([0.1, 0.1, -1.], [0., 0., 1.]);
        for u in [0., 0.25, 0.5, 0.75, 1.] {
            let mut rng = Replay::new(&[u]);
            let result = SAMPLER.generate(&geometry, &r, IRON, &mut rng);
            let vertex = assert_in_target(&geometry, result, IRON);
            assert_eq!(geometry.locate(&vertex), Some(1), "u = {u}, vertex = {vertex}");
            assert!(vertex.z >= 0.0003 && vertex.z <= 0.0007, "u = {u}, vertex = {vertex}");
        }

        // Steps much coarser than the whole world still end up in the foil
        let coarse = VertexSampler {
            step: 10.,
            ..SAMPLER
        };
        let mut rng = Replay::new(&[0.5]);
        assert_in_target(&geometry, coarse.generate(&geometry, &r, IRON, &mut rng), IRON);
    }

    #[test]
    fn thin_world_from_far_away() {
        let geometry = NativeGeometry::new(
            Volume::new("Slab", Some(iron().into())),
            slab(0.0002, 0.0005),
        )
        .unwrap();
        for start in [-1., -1000.] {
            let r = ray([0., 0., start], [0., 0., 1.]);
            for u in [0., 0.5, 1.] {
                let mut rng = Replay::new(&[u]);
                let result = SAMPLER.generate(&geometry, &r, IRON, &mut rng);
                let vertex = assert_in_target(&geometry, result, IRON);
                assert_eq!(geometry.locate(&vertex), Some(0), "vertex = {vertex}");
            }
        }
    }

    #[test]
    fn grazing_rays() {
        let geometry = water_in_air();
        let hydrogen = NuclideId::new(1, 1);
        let accept = |r: &Ray| {
            let mut rng = Replay::new(&[0.5]);
            match SAMPLER.generate(&geometry, r, hydrogen, &mut rng) {
                Err(VertexError::NoTargetMaterial(_) | VertexError::OutsideTarget(_)) => {}
                result => {
                    assert_in_target(&geometry, result, hydrogen);
                }
            }
        };

        // Along a face of the tank
        accept(&ray([1., 0., -20.], [0., 0., 1.]));
        accept(&ray([1., 1., -20.], [0., 0., 1.]));

        // Clipping an edge over a chord much shorter than the step
        accept(&ray([-18.0002, 0., -20.], [1., 0., 1.]));
    }

    #[test]
    fn no_target_material() {
        let geometry = iron_void_water();
        let r = ray([-1., 0.5, 0.5], [1., 0., 0.]);
        let nitrogen = NuclideId::new(14, 7);
        let mut rng = Replay::new(&[0.5]);
        assert_eq!(
            SAMPLER.generate(&geometry, &r, nitrogen, &mut rng),
            Err(VertexError::NoTargetMaterial(nitrogen))
        );
        assert_eq!(
            SAMPLER.locate_threshold(&geometry, &r, nitrogen, &[], 0.),
            Err(VertexError::NoTargetMaterial(nitrogen))
        );

        let missing = ray([-1., 0.5, 0.5], [-1., 0., 0.]);
        assert_eq!(
            SAMPLER.generate(&geometry, &missing, IRON, &mut rng),
            Err(VertexError::NoTargetMaterial(IRON))
        );
    }
}
