//! Native geometry backend: a tree of placed primitive shapes
//!
//! Daughter volumes are placed inside their mother, and take precedence over
//! it where they overlap. Positions are expressed in the world frame. Shapes
//! are not rotated.

use super::{
    shape::{entry_distance, exit_distance, BoundingBox, Shape, Solid},
    Geometry, Volume, VolumeId, NEVER_ENTERS_STEP,
};
use crate::{
    error::GeometryError,
    linalg::{self, Direction, Point},
    material::{Material, Medium},
    numeric::{Float, BOUNDARY_PUSH},
};

use serde::Deserialize;

use std::collections::HashMap;

/// Description of a volume
#[derive(Debug, Deserialize)]
pub struct VolumeDescription {
    /// Unique name of the volume
    pub name: String,

    /// Shape of the volume
    pub shape: Shape,

    /// Position of the shape's center, in the world frame
    #[serde(default)]
    pub position: [Float; 3],

    /// Name of the enclosing volume, absent for the world volume
    #[serde(default)]
    pub mother: Option<String>,

    /// Name of the material, absent for containers with no medium
    #[serde(default)]
    pub material: Option<String>,
}

/// Description of a native geometry
#[derive(Debug, Deserialize)]
pub struct NativeDescription {
    /// Material catalog
    pub materials: Vec<Material>,

    /// Volumes, mothers must come before their daughters
    pub volumes: Vec<VolumeDescription>,
}

/// Tree of placed volumes
#[derive(Clone, Debug)]
pub struct NativeGeometry {
    /// Volume metadata
    volumes: Vec<Volume>,

    /// Placed shape of each volume
    solids: Vec<Solid>,

    /// Daughters of each volume
    daughters: Vec<Vec<VolumeId>>,
}
//
impl NativeGeometry {
    /// World volume is always the first one
    const WORLD: VolumeId = 0;

    /// Start a geometry from its world volume
    pub fn new(world: Volume, solid: Solid) -> Result<Self, GeometryError> {
        Self::check_shape(&world.name, &solid.shape)?;
        Ok(Self {
            volumes: vec![world],
            solids: vec![solid],
            daughters: vec![Vec::new()],
        })
    }

    /// Place a new volume inside an existing one
    pub fn add_daughter(
        &mut self,
        mother: VolumeId,
        volume: Volume,
        solid: Solid,
    ) -> Result<VolumeId, GeometryError> {
        assert!(mother < self.volumes.len(), "No volume with index {mother}");
        if self.find_volume(&volume.name).is_some() {
            return Err(GeometryError::DuplicateVolume(volume.name));
        }
        Self::check_shape(&volume.name, &solid.shape)?;
        let id = self.volumes.len();
        self.volumes.push(volume);
        self.solids.push(solid);
        self.daughters.push(Vec::new());
        self.daughters[mother].push(id);
        Ok(id)
    }

    /// Build a geometry from its description
    pub fn from_description(desc: NativeDescription) -> Result<Self, GeometryError> {
        // Index the material catalog
        let materials = desc
            .materials
            .into_iter()
            .map(|material| (material.name.clone(), material))
            .collect::<HashMap<_, _>>();
        let make_volume = |vol_desc: &VolumeDescription| -> Result<Volume, GeometryError> {
            let medium = match &vol_desc.material {
                Some(name) => {
                    let material =
                        materials
                            .get(name)
                            .ok_or_else(|| GeometryError::UnknownMaterial {
                                volume: vol_desc.name.clone(),
                                material: name.clone(),
                            })?;
                    Some(Medium::from(material.clone()))
                }
                None => None,
            };
            Ok(Volume::new(vol_desc.name.clone(), medium))
        };
        let make_solid = |vol_desc: &VolumeDescription| {
            Solid::new(vol_desc.shape.clone(), linalg::point(vol_desc.position))
        };

        // There must be exactly one world volume
        let mut worlds = desc.volumes.iter().filter(|v| v.mother.is_none());
        let num_worlds = worlds.clone().count();
        let world_desc = match (worlds.next(), num_worlds) {
            (Some(world), 1) => world,
            _ => return Err(GeometryError::WorldCount(num_worlds)),
        };
        let mut geometry = Self::new(make_volume(world_desc)?, make_solid(world_desc))?;

        // Place the other volumes in order of declaration
        for vol_desc in &desc.volumes {
            let mother_name = match &vol_desc.mother {
                Some(name) => name,
                None => continue,
            };
            let mother = geometry
                .find_volume(mother_name)
                .ok_or_else(|| GeometryError::UnknownMother {
                    volume: vol_desc.name.clone(),
                    mother: mother_name.clone(),
                })?;
            geometry.add_daughter(mother, make_volume(vol_desc)?, make_solid(vol_desc))?;
        }

        log::debug!("Built a native geometry with {} volumes", geometry.volumes.len());
        Ok(geometry)
    }

    /// Reject degenerate shapes
    fn check_shape(name: &str, shape: &Shape) -> Result<(), GeometryError> {
        shape
            .validate()
            .map_err(|reason| GeometryError::InvalidShape {
                volume: name.to_owned(),
                reason,
            })
    }
}

impl Geometry for NativeGeometry {
    fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    fn world(&self) -> VolumeId {
        Self::WORLD
    }

    fn locate(&self, point: &Point) -> Option<VolumeId> {
        if !self.solids[Self::WORLD].contains(point) {
            return None;
        }
        let mut current = Self::WORLD;
        while let Some(&daughter) = self.daughters[current]
            .iter()
            .find(|&&daughter| self.solids[daughter].contains(point))
        {
            current = daughter;
        }
        Some(current)
    }

    fn step_to_boundary(&self, point: &Point, direction: &Direction) -> Float {
        let Some(current) = self.locate(point) else {
            // Outside of the world, the only boundary that can be met is the
            // world's own surface
            let world_interval = self.solids[Self::WORLD].ray_interval(point, direction);
            return entry_distance(world_interval)
                .map_or(NEVER_ENTERS_STEP, |distance| distance + BOUNDARY_PUSH);
        };

        // Inside a volume, we may either leave it or enter one of its daughters
        let exit = exit_distance(self.solids[current].ray_interval(point, direction));
        let distance = self.daughters[current]
            .iter()
            .filter_map(|&daughter| {
                entry_distance(self.solids[daughter].ray_interval(point, direction))
            })
            .fold(exit, Float::min);
        distance + BOUNDARY_PUSH
    }

    fn bounding_box(&self, volume: VolumeId) -> BoundingBox {
        self.solids[volume].bounding_box()
    }
}
