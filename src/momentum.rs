//! This module implements some domain-specific 4-momentum handling logic.

use crate::numeric::Float;
use nalgebra::SVector;
use prefix_num_ops::real::*;

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Relativistic 4-momentum (GeV)
pub type Momentum = SVector<Float, MOMENTUM_DIM>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Convenience const for accessing the E coordinate of a 4-vector
pub const E: usize = 3;

/// Build a 4-momentum from its spatial components and energy
pub fn momentum(px: Float, py: Float, pz: Float, e: Float) -> Momentum {
    Momentum::new(px, py, pz, e)
}

/// Invariant mass of a 4-momentum
///
/// Slightly space-like momenta, which round-off can produce out of massless
/// systems, are treated as massless.
///
pub fn invariant_mass(p: &Momentum) -> Float {
    let p2 = p.fixed_rows::<3>(X).norm_squared();
    let m2 = p[E] * p[E] - p2;
    sqrt(m2.max(0.))
}
