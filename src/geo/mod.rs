//! Navigable detector geometries
//!
//! The analysis code only sees geometries through the Geometry trait, which
//! answers two kinds of questions: in which volume is a given point, and how
//! far along a given direction is the next volume boundary. Queries take and
//! return plain values, there is no hidden navigation cursor.
//!
//! Two backends are provided:
//!
//! * A native tree of placed volumes made of primitive shapes
//!   ([`native::NativeGeometry`]).
//! * A regular lattice of material cells ([`voxel::VoxelGeometry`]), as
//!   produced by detector scans or voxelized CAD exports.
//!
//! Both can be loaded from a JSON description, the `"backend"` field of
//! which selects the implementation.

pub mod native;
pub mod shape;
pub mod voxel;

use crate::{
    error::GeometryError,
    linalg::{Direction, Point},
    material::{Material, Medium},
    numeric::Float,
};

use self::{
    native::{NativeDescription, NativeGeometry},
    shape::BoundingBox,
    voxel::{VoxelDescription, VoxelGeometry},
};

use serde::Deserialize;

use std::{fs, path::Path};

/// Step returned when no boundary will ever be crossed along a ray
pub const NEVER_ENTERS_STEP: Float = 1e30;

/// Any step at least this large means that the ray misses the geometry
const NEVER_ENTERS_THRESHOLD: Float = 9.99e29;

/// Truth that a boundary step means that the ray will never enter anything
pub fn will_never_enter(step: Float) -> bool {
    step >= NEVER_ENTERS_THRESHOLD
}

/// Index of a volume within a geometry
pub type VolumeId = usize;

/// Named region of the detector, made of a single medium
#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    /// Unique name, for lookup and reporting
    pub name: String,

    /// Tracking medium, may be missing for pure containers
    pub medium: Option<Medium>,
}
//
impl Volume {
    pub fn new(name: impl Into<String>, medium: Option<Medium>) -> Self {
        Self {
            name: name.into(),
            medium,
        }
    }

    /// Resolve the volume's material through its medium
    pub fn material(&self) -> Option<&Material> {
        self.medium.as_ref()?.material.as_ref()
    }
}

/// Navigable volumetric geometry
pub trait Geometry {
    /// All volumes of the geometry, indexed by VolumeId
    fn volumes(&self) -> &[Volume];

    /// Outermost volume, enclosing all others
    fn world(&self) -> VolumeId;

    /// Find the innermost volume containing a point, if any
    fn locate(&self, point: &Point) -> Option<VolumeId>;

    /// Distance to travel from a point along a direction in order to cross
    /// the next volume boundary
    ///
    /// The distance slightly overshoots the boundary (see BOUNDARY_PUSH), so
    /// that locating the destination point yields the next volume. If no
    /// boundary lies ahead, NEVER_ENTERS_STEP is returned.
    ///
    fn step_to_boundary(&self, point: &Point, direction: &Direction) -> Float;

    /// Axis-aligned box enclosing a volume
    fn bounding_box(&self, volume: VolumeId) -> BoundingBox;

    /// Access a volume by index
    fn volume(&self, volume: VolumeId) -> &Volume {
        &self.volumes()[volume]
    }

    /// Look up a volume by name
    fn find_volume(&self, name: &str) -> Option<VolumeId> {
        self.volumes().iter().position(|volume| volume.name == name)
    }
}

/// Geometry description, as stored on disk
#[derive(Debug, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum GeometryDescription {
    Native(NativeDescription),
    Voxel(VoxelDescription),
}
//
impl GeometryDescription {
    /// Parse a geometry description from a JSON string
    pub fn from_json(json: &str) -> Result<Self, GeometryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a geometry description from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| GeometryError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Build the geometry with the selected backend
    pub fn build(self) -> Result<Box<dyn Geometry>, GeometryError> {
        Ok(match self {
            GeometryDescription::Native(desc) => Box::new(NativeGeometry::from_description(desc)?),
            GeometryDescription::Voxel(desc) => Box::new(VoxelGeometry::from_description(desc)?),
        })
    }
}

/// Load a geometry from a JSON description file
pub fn load(path: impl AsRef<Path>) -> Result<Box<dyn Geometry>, GeometryError> {
    let path = path.as_ref();
    log::info!("Loading geometry from: {}", path.display());
    GeometryDescription::from_file(path)?.build()
}
