//! Basic numerical concepts used throughout the program

#![allow(missing_docs)]

// Floating-point precision is configured here
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(not(feature = "f32"))]
pub type Float = f64;

/// Distance by which geometry backends overshoot each boundary, so that the
/// point reached by a step is unambiguously located on the far side of it.
///
/// Must stay well above the floating-point granularity of detector-sized
/// coordinates, hence the precision-dependent value.
#[cfg(feature = "f32")]
pub const BOUNDARY_PUSH: Float = 1e-4;
#[cfg(not(feature = "f32"))]
pub const BOUNDARY_PUSH: Float = 1e-9;

/// Directions shorter than this cannot be normalized meaningfully
#[cfg(feature = "f32")]
pub const MIN_DIRECTION_NORM: Float = 1e-12;
#[cfg(not(feature = "f32"))]
pub const MIN_DIRECTION_NORM: Float = 1e-30;
