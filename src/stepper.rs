//! Stepping of rays through a geometry, one volume at a time
//!
//! This is the primitive shared by all path length computations: starting
//! from some point, a ray is moved from boundary to boundary along a fixed
//! direction, and each segment travelled inside a material is reported to a
//! caller-provided visitor along with its length.

use crate::{
    geo::{self, Geometry},
    linalg::{Direction, Point},
    material::Material,
    numeric::Float,
};

/// Half-line along which path lengths are measured
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point,
    pub direction: Direction,
}
//
impl Ray {
    pub fn new(origin: Point, direction: Direction) -> Self {
        Self { origin, direction }
    }

    /// Point reached after travelling a certain distance along the ray
    pub fn at(&self, distance: Float) -> Point {
        self.origin + *self.direction * distance
    }
}

/// Progress of a ray through the geometry
#[derive(Clone, Copy, Debug)]
pub struct RayState {
    /// Current position
    pub position: Point,

    /// Direction of travel
    pub direction: Direction,

    /// Distance travelled from the ray origin
    pub distance: Float,

    /// Truth that the ray has been inside of the geometry at some point,
    /// which tells apart "not there yet" from "gone for good" when outside
    pub entered: bool,
}
//
impl RayState {
    pub fn new(ray: &Ray) -> Self {
        Self {
            position: ray.origin,
            direction: ray.direction,
            distance: 0.,
            entered: false,
        }
    }

    /// Move forward along the direction of travel
    pub fn advance(&mut self, distance: Float) {
        self.position += *self.direction * distance;
        self.distance += distance;
    }
}

/// Reason why a walk ended
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WalkEnd {
    /// The ray left the geometry after having been inside of it
    Exited,

    /// The ray will never reach the geometry
    NeverEntered,

    /// The configured maximal number of steps was reached
    StepLimit,
}

/// Walk a ray through a geometry, reporting every segment crossed inside a
/// material to the visitor as (material, segment length)
///
/// Segments crossed in volumes with no medium or material are not reported,
/// but still travelled. If max_steps is set, the walk is interrupted after
/// that many steps.
///
pub fn walk<'geom>(
    geometry: &'geom (impl Geometry + ?Sized),
    ray: &Ray,
    max_steps: Option<usize>,
    mut visit: impl FnMut(&'geom Material, Float),
) -> WalkEnd {
    walk_segments(geometry, ray, max_steps, |material, _start, length| {
        visit(material, length)
    })
}

/// Like walk(), but also tells the visitor how far from the ray origin each
/// segment starts, as (material, segment start, segment length)
pub fn walk_segments<'geom>(
    geometry: &'geom (impl Geometry + ?Sized),
    ray: &Ray,
    max_steps: Option<usize>,
    mut visit: impl FnMut(&'geom Material, Float, Float),
) -> WalkEnd {
    let mut state = RayState::new(ray);
    let mut num_steps = 0;
    loop {
        if max_steps.map_or(false, |max| num_steps >= max) {
            return WalkEnd::StepLimit;
        }
        num_steps += 1;

        let volume = geometry.locate(&state.position);
        if volume.is_none() && state.entered {
            return WalkEnd::Exited;
        }

        let step = geometry.step_to_boundary(&state.position, &state.direction);
        if geo::will_never_enter(step) {
            log::trace!("Step {step} means that the ray is not entering the geometry");
            return if state.entered {
                WalkEnd::Exited
            } else {
                WalkEnd::NeverEntered
            };
        }

        if let Some(volume) = volume {
            state.entered = true;
            let volume = geometry.volume(volume);
            match volume.material() {
                Some(material) => {
                    log::trace!(
                        "Crossing {} ({}) at {:?}, step = {step}",
                        volume.name,
                        material.name,
                        state.position
                    );
                    visit(material, state.distance, step)
                }
                None => log::trace!("Crossing {} without material, step = {step}", volume.name),
            }
        }
        state.advance(step);
    }
}
