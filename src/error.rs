//! Typed errors of the library

use crate::{nuclide::NuclideId, numeric::Float};

use std::path::PathBuf;

use thiserror::Error;

/// Problems found while loading or building a geometry
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The geometry description could not be read
    #[error("could not read geometry description {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The geometry description is not valid JSON for any known backend
    #[error("malformed geometry description: {0}")]
    Parse(#[from] serde_json::Error),

    /// A geometry must have exactly one world (mother-less) volume
    #[error("expected exactly one world volume, found {0}")]
    WorldCount(usize),

    /// Volume names are used for lookup, so they must be unique
    #[error("volume {0:?} is defined more than once")]
    DuplicateVolume(String),

    /// Daughters must be declared after their mother
    #[error("volume {volume:?} refers to undeclared mother volume {mother:?}")]
    UnknownMother { volume: String, mother: String },

    /// Volumes must refer to a material from the catalog
    #[error("volume {volume:?} refers to unknown material {material:?}")]
    UnknownMaterial { volume: String, material: String },

    /// Degenerate or non-finite shape dimensions
    #[error("volume {volume:?} has an invalid shape: {reason}")]
    InvalidShape { volume: String, reason: String },

    /// Inconsistent voxel grid layout
    #[error("invalid voxel grid: {0}")]
    InvalidVoxelGrid(String),
}

/// Reasons why an interaction vertex could not be generated
#[derive(Debug, Error, PartialEq)]
pub enum VertexError {
    /// No geometry was loaded in the analyzer
    #[error("no geometry is loaded")]
    NoGeometry,

    /// The ray direction could not be normalized
    #[error("the ray direction is a null vector")]
    NullDirection,

    /// The ray never crosses any material containing the target nuclide
    #[error("no material containing nuclide {0} along this ray")]
    NoTargetMaterial(NuclideId),

    /// No point of the selected target segment could be located in a
    /// material containing the nuclide
    #[error("could not place a vertex inside a material containing nuclide {0}")]
    OutsideTarget(NuclideId),

    /// Vertex location steps must be finite and positive
    #[error("invalid vertex location step {0}")]
    InvalidStep(Float),
}

/// Invalid configuration of a composite hadronization model
#[derive(Debug, Error, PartialEq)]
pub enum HadronizationError {
    /// The transition window must be a finite, non-empty W range
    #[error("invalid transition window [{w_min}, {w_max}] GeV")]
    InvalidWindow { w_min: Float, w_max: Float },
}
