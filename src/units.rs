//! Length units
//!
//! Path lengths are reported in meters. Geometries may be described in any of
//! the units below, the analyzer's scaling factor takes care of conversion.

use crate::numeric::Float;

/// Reference length unit of all path-length outputs
pub const METER: Float = 1.;

pub const KILOMETER: Float = 1000. * METER;
pub const CENTIMETER: Float = 0.01 * METER;
pub const MILLIMETER: Float = 0.001 * METER;

/// Look up a length unit from its name or symbol (e.g. "cm", "meter")
pub fn length_unit(name: &str) -> Option<Float> {
    match name.to_lowercase().as_str() {
        "m" | "meter" | "meters" => Some(METER),
        "km" | "kilometer" | "kilometers" => Some(KILOMETER),
        "cm" | "centimeter" | "centimeters" => Some(CENTIMETER),
        "mm" | "millimeter" | "millimeters" => Some(MILLIMETER),
        _ => None,
    }
}
