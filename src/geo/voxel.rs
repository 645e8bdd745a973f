//! Voxel geometry backend: a regular lattice of material cells
//!
//! Each material of the catalog is exposed as one volume, made of all the
//! cells filled with it. Empty cells form a "void" volume without medium.
//! Boundaries are found by walking the lattice along the ray with a 3D-DDA
//! (Amanatides & Woo), a boundary being any change of cell content.

use super::{
    shape::{entry_distance, BoundingBox},
    Geometry, Volume, VolumeId, NEVER_ENTERS_STEP,
};
use crate::{
    error::GeometryError,
    linalg::{self, Direction, Point, Vector, X, Y, Z},
    material::{Material, Medium},
    numeric::{Float, BOUNDARY_PUSH},
};

use serde::Deserialize;

/// Description of a voxel geometry
#[derive(Debug, Deserialize)]
pub struct VoxelDescription {
    /// Name of the lattice as a whole
    pub name: String,

    /// Lower corner of the lattice
    pub min_corner: [Float; 3],

    /// Size of a cell along each axis
    pub cell_size: [Float; 3],

    /// Number of cells along each axis
    pub dims: [usize; 3],

    /// Material catalog
    pub materials: Vec<Material>,

    /// Index of each cell's material (null for void), X index varying fastest
    pub cells: Vec<Option<usize>>,
}

/// Regular lattice of material cells
#[derive(Clone, Debug)]
pub struct VoxelGeometry {
    /// Lattice envelope, void cells and one volume per material
    volumes: Vec<Volume>,

    /// Volume of each cell
    cells: Vec<VolumeId>,

    /// Lower corner of the lattice
    min_corner: Point,

    /// Size of a cell along each axis
    cell_size: Vector,

    /// Number of cells along each axis
    dims: [usize; 3],
}
//
impl VoxelGeometry {
    /// Volume standing for the lattice as a whole
    const ENVELOPE: VolumeId = 0;

    /// Volume made of the empty cells
    const VOID: VolumeId = 1;

    /// Build a lattice from its cell contents
    ///
    /// Cells are listed with the X index varying fastest, each being either
    /// an index into the material list or None for empty cells.
    ///
    pub fn new(
        name: impl Into<String>,
        min_corner: Point,
        cell_size: Vector,
        dims: [usize; 3],
        materials: Vec<Material>,
        cells: &[Option<usize>],
    ) -> Result<Self, GeometryError> {
        let invalid = |reason: String| Err(GeometryError::InvalidVoxelGrid(reason));
        if dims.contains(&0) {
            return invalid(format!("all dimensions must be nonzero, got {dims:?}"));
        }
        if !cell_size.iter().all(|size| size.is_finite() && *size > 0.) {
            return invalid(format!("cell sizes must be finite and positive, got {cell_size:?}"));
        }
        let num_cells = dims.iter().product::<usize>();
        if cells.len() != num_cells {
            return invalid(format!("expected {num_cells} cells, got {}", cells.len()));
        }
        if let Some(bad) = cells.iter().flatten().find(|&&idx| idx >= materials.len()) {
            return invalid(format!(
                "cell refers to material #{bad}, but only {} are defined",
                materials.len()
            ));
        }

        // Material i is represented by volume i + 2
        let cells = cells
            .iter()
            .map(|content| content.map_or(Self::VOID, |idx| idx + 2))
            .collect();
        let volumes = [Volume::new(name, None), Volume::new("void", None)]
            .into_iter()
            .chain(
                materials.into_iter().map(|material| {
                    Volume::new(material.name.clone(), Some(Medium::from(material)))
                }),
            )
            .collect();
        Ok(Self {
            volumes,
            cells,
            min_corner,
            cell_size,
            dims,
        })
    }

    /// Build a lattice from its description
    pub fn from_description(desc: VoxelDescription) -> Result<Self, GeometryError> {
        Self::new(
            desc.name,
            linalg::point(desc.min_corner),
            Vector::from(desc.cell_size),
            desc.dims,
            desc.materials,
            &desc.cells,
        )
    }

    /// Box enclosing the whole lattice
    fn envelope(&self) -> BoundingBox {
        let extent = Vector::from_fn(|axis, _| self.dims[axis] as Float * self.cell_size[axis]);
        BoundingBox::from_corners(&self.min_corner, &(self.min_corner + extent))
    }

    /// Linear index of a cell
    fn linear_index(&self, cell: [usize; 3]) -> usize {
        cell[X] + self.dims[X] * (cell[Y] + self.dims[Y] * cell[Z])
    }

    /// Cell containing a point of the lattice envelope
    ///
    /// Points on the upper faces of the envelope are attributed to the last
    /// cell along the corresponding axis.
    ///
    fn cell_of(&self, point: &Point) -> [usize; 3] {
        let rel = point - self.min_corner;
        let mut cell = [0; 3];
        for axis in X..=Z {
            let idx = (rel[axis] / self.cell_size[axis]).floor().max(0.) as usize;
            cell[axis] = idx.min(self.dims[axis] - 1);
        }
        cell
    }

    /// Walk the lattice from a point inside of it until the cell content
    /// changes or the lattice is left, returning the distance travelled
    fn distance_to_content_change(&self, point: &Point, direction: &Direction) -> Float {
        let mut cell = self.cell_of(point);
        let content = self.cells[self.linear_index(cell)];

        // Distance to the next cell boundary along each axis, and distance
        // between two successive boundaries along each axis
        let mut t_max = [Float::INFINITY; 3];
        let mut t_delta = [Float::INFINITY; 3];
        for axis in X..=Z {
            let d = direction[axis];
            let lower = self.min_corner[axis] + cell[axis] as Float * self.cell_size[axis];
            if d > 0. {
                t_max[axis] = (lower + self.cell_size[axis] - point[axis]) / d;
                t_delta[axis] = self.cell_size[axis] / d;
            } else if d < 0. {
                t_max[axis] = (lower - point[axis]) / d;
                t_delta[axis] = -self.cell_size[axis] / d;
            }
        }

        loop {
            // Move to the nearest cell boundary
            let axis = [Y, Z]
                .into_iter()
                .fold(X, |best, axis| if t_max[axis] < t_max[best] { axis } else { best });
            let distance = t_max[axis].max(0.);
            let next = if direction[axis] > 0. {
                Some(cell[axis] + 1).filter(|&idx| idx < self.dims[axis])
            } else {
                cell[axis].checked_sub(1)
            };

            // Stop when leaving the lattice or changing material
            match next {
                Some(idx) => cell[axis] = idx,
                None => return distance,
            }
            if self.cells[self.linear_index(cell)] != content {
                return distance;
            }
            t_max[axis] += t_delta[axis];
        }
    }
}

impl Geometry for VoxelGeometry {
    fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    fn world(&self) -> VolumeId {
        Self::ENVELOPE
    }

    fn locate(&self, point: &Point) -> Option<VolumeId> {
        self.envelope()
            .contains(point)
            .then(|| self.cells[self.linear_index(self.cell_of(point))])
    }

    fn step_to_boundary(&self, point: &Point, direction: &Direction) -> Float {
        let envelope = self.envelope();
        if envelope.contains(point) {
            self.distance_to_content_change(point, direction) + BOUNDARY_PUSH
        } else {
            entry_distance(envelope.ray_interval(point, direction))
                .map_or(NEVER_ENTERS_STEP, |distance| distance + BOUNDARY_PUSH)
        }
    }

    fn bounding_box(&self, volume: VolumeId) -> BoundingBox {
        if volume == Self::ENVELOPE {
            return self.envelope();
        }

        // Enclose all the cells of the volume
        let mut min = [usize::MAX; 3];
        let mut max = [0; 3];
        for (linear, _) in self.cells.iter().enumerate().filter(|(_, &v)| v == volume) {
            let cell = [
                linear % self.dims[X],
                (linear / self.dims[X]) % self.dims[Y],
                linear / (self.dims[X] * self.dims[Y]),
            ];
            for axis in X..=Z {
                min[axis] = min[axis].min(cell[axis]);
                max[axis] = max[axis].max(cell[axis] + 1);
            }
        }
        if min[X] == usize::MAX {
            log::warn!(
                "Volume {} has no cell, using the whole lattice as its bounding box",
                self.volumes[volume].name
            );
            return self.envelope();
        }
        let corner = |cells: [usize; 3]| {
            self.min_corner + Vector::from_fn(|axis, _| cells[axis] as Float * self.cell_size[axis])
        };
        BoundingBox::from_corners(&corner(min), &corner(max))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::material::Element;

    /// 4x1x1 lattice of 1m cells along X: iron, iron, void, water
    pub(crate) fn iron_void_water() -> VoxelGeometry {
        let iron = Material::pure("Iron", 7.874, 55.845, 26.);
        let water = Material::mixture(
            "Water",
            1.0,
            vec![Element::new(1.008, 1.), Element::new(15.999, 8.)],
        );
        VoxelGeometry::new(
            "Lattice",
            Point::origin(),
            Vector::repeat(1.),
            [4, 1, 1],
            vec![iron, water],
            &[Some(0), Some(0), None, Some(1)],
        )
        .unwrap()
    }

    fn dir(x: Float, y: Float, z: Float) -> Direction {
        linalg::direction(&Vector::new(x, y, z)).unwrap()
    }

    #[test]
    fn volumes() {
        let geometry = iron_void_water();
        let names = geometry
            .volumes()
            .iter()
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Lattice", "void", "Iron", "Water"]);
        assert!(geometry.volume(geometry.world()).material().is_none());
        assert!(geometry.volume(1).material().is_none());
    }

    #[test]
    fn location() {
        let geometry = iron_void_water();
        assert_eq!(geometry.locate(&Point::new(0.5, 0.5, 0.5)), Some(2));
        assert_eq!(geometry.locate(&Point::new(1.5, 0.5, 0.5)), Some(2));
        assert_eq!(geometry.locate(&Point::new(2.5, 0.5, 0.5)), Some(1));
        assert_eq!(geometry.locate(&Point::new(4.0, 0.5, 0.5)), Some(3));
        assert_eq!(geometry.locate(&Point::new(4.1, 0.5, 0.5)), None);
    }

    #[test]
    fn boundary_steps() {
        let geometry = iron_void_water();
        let along_x = dir(1., 0., 0.);

        // Iron spans two cells, which are crossed in one step
        let step = geometry.step_to_boundary(&Point::new(0.25, 0.5, 0.5), &along_x);
        assert!((step - 1.75).abs() < 1e-6);

        // Leaving the lattice through the water cell
        let step = geometry.step_to_boundary(&Point::new(3.5, 0.5, 0.5), &along_x);
        assert!((step - 0.5).abs() < 1e-6);

        // Going backwards, then sideways
        let step = geometry.step_to_boundary(&Point::new(3.5, 0.5, 0.5), &dir(-1., 0., 0.));
        assert!((step - 0.5).abs() < 1e-6);
        let step = geometry.step_to_boundary(&Point::new(0.5, 0.5, 0.5), &dir(0., 1., 0.));
        assert!((step - 0.5).abs() < 1e-6);

        // Entering from outside, or missing the lattice entirely
        let step = geometry.step_to_boundary(&Point::new(-2., 0.5, 0.5), &along_x);
        assert!((step - 2.).abs() < 1e-6);
        let step = geometry.step_to_boundary(&Point::new(-2., 0.5, 0.5), &dir(0., 0., 1.));
        assert_eq!(step, NEVER_ENTERS_STEP);
    }

    #[test]
    fn bounding_boxes() {
        let geometry = iron_void_water();
        assert_eq!(
            geometry.bounding_box(geometry.world()),
            BoundingBox::new(Point::new(2., 0.5, 0.5), Vector::new(2., 0.5, 0.5))
        );
        assert_eq!(
            geometry.bounding_box(2),
            BoundingBox::new(Point::new(1., 0.5, 0.5), Vector::new(1., 0.5, 0.5))
        );
        assert_eq!(
            geometry.bounding_box(3),
            BoundingBox::new(Point::new(3.5, 0.5, 0.5), Vector::new(0.5, 0.5, 0.5))
        );
    }

    #[test]
    fn invalid_grids() {
        let build = |dims: [usize; 3], cells: &[Option<usize>]| {
            VoxelGeometry::new(
                "Bad",
                Point::origin(),
                Vector::repeat(1.),
                dims,
                vec![Material::pure("Iron", 7.874, 55.845, 26.)],
                cells,
            )
        };
        assert!(build([1, 1, 1], &[Some(0)]).is_ok());
        assert!(build([0, 1, 1], &[]).is_err());
        assert!(build([2, 1, 1], &[Some(0)]).is_err());
        assert!(build([1, 1, 1], &[Some(1)]).is_err());
    }
}
