//! nugeom: Detector geometry analysis for neutrino Monte Carlo generators
//!
//!
//! # Introduction (for the physicist)
//!
//! A neutrino event generator needs to know how much matter of each nuclear
//! species a neutrino crosses on its way through a detector, and where it
//! finally interacts. This crate answers both questions for a detector
//! described as a set of volumes filled with materials:
//!
//! * The path length through each target nuclide along a neutrino ray,
//!   optionally weighted by the material density.
//! * The maximal such path length over all rays entering the detector, which
//!   generators use to normalize interaction probabilities.
//! * An interaction vertex along a ray, drawn in the material of a chosen
//!   target nuclide, with a probability proportional to the local density.
//!
//! It also provides a composite hadronization model, which hands interactions
//! over from a low-W to a high-W model across a transition window.
//!
//!
//! # Introduction (for the numerical guy)
//!
//! Path lengths are computed by stepping along rays from volume boundary to
//! volume boundary. Maximal path lengths are Monte Carlo estimates obtained by
//! shooting random rays from the surface of the detector's bounding box.
//! Vertices are drawn by inverting the cumulative weighted path length along
//! the ray, walking it again in small steps.
//!
//!
//! # Introduction (for the computer guy)
//!
//! Geometries are consumed through the `geo::Geometry` trait, which only
//! answers "which volume is this point in" and "how far is the next boundary".
//! Two implementations are provided: a tree of placed primitive shapes, and a
//! regular lattice of material cells. Both can be loaded from JSON
//! descriptions. All random sampling takes its random number source as an
//! explicit parameter.

#![warn(missing_docs)]

pub mod analyzer;
pub mod config;
pub mod error;
pub mod geo;
pub mod hadronization;
pub mod linalg;
pub mod material;
pub mod momentum;
pub mod nuclide;
pub mod numeric;
pub mod output;
pub mod pathlength;
pub mod random;
pub mod scanner;
pub mod stepper;
pub mod summary;
pub mod units;
pub mod vertex;

pub use crate::{
    analyzer::GeomAnalyzer,
    error::{GeometryError, HadronizationError, VertexError},
    nuclide::{NuclideId, TargetNuclei},
    pathlength::PathLengthRecord,
};

/// We'll use eyre's type-erased result type for application-level errors
pub type Result<T> = eyre::Result<T>;
