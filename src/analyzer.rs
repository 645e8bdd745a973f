//! Geometry analyzer: the interface between detector geometries and event
//! generation drivers
//!
//! For a loaded geometry, the analyzer can tell which target nuclides are
//! present, how much (density-weighted) path length a neutrino travelling
//! along some ray sees through each of them, what the maximal such path
//! length is over all rays, and where along a ray an interaction with a
//! given nuclide takes place.

use crate::{
    error::{GeometryError, VertexError},
    geo::{self, Geometry, VolumeId},
    linalg::{self, Point, Vector},
    nuclide::{NuclideId, TargetNuclei},
    numeric::Float,
    pathlength::PathLengthRecord,
    random::UniformSource,
    scanner::{self, ScanSettings},
    stepper::{self, Ray},
    units,
    vertex::{VertexSampler, DEFAULT_VERTEX_STEP},
};

use std::path::Path;

/// Analysis state which only makes sense for one particular geometry
///
/// Loading another geometry replaces all of it at once.
///
struct LoadedGeometry {
    /// Navigable geometry
    geometry: Box<dyn Geometry>,

    /// Volume whose bounding box is scanned for maximal path lengths
    top_volume: VolumeId,

    /// Target nuclides found in the geometry
    target_nuclei: TargetNuclei,

    /// Path lengths along the last ray given to compute_path_lengths()
    path_lengths: PathLengthRecord,

    /// Result of the last compute_max_path_lengths()
    max_path_lengths: PathLengthRecord,
}
//
impl LoadedGeometry {
    fn new(geometry: Box<dyn Geometry>) -> Self {
        let target_nuclei = TargetNuclei::from_geometry(&*geometry);
        let path_lengths = PathLengthRecord::new(&target_nuclei);
        let max_path_lengths = PathLengthRecord::new(&target_nuclei);
        let top_volume = geometry.world();
        Self {
            geometry,
            top_volume,
            target_nuclei,
            path_lengths,
            max_path_lengths,
        }
    }
}

/// Geometry analyzer
pub struct GeomAnalyzer {
    /// Currently loaded geometry, if any
    loaded: Option<LoadedGeometry>,

    /// Ratio of the geometry's length unit to the meter
    scale: Float,

    /// Sampling density of the maximal path length scan
    scan: ScanSettings,

    /// Truth that path lengths should be weighted by material density
    weight_with_density: bool,

    /// Length of the steps used to locate interaction vertices
    vertex_step: Float,

    /// Last generated interaction vertex
    vertex: Point,

    /// What path length queries return when no geometry is loaded
    no_path_lengths: PathLengthRecord,

    /// What target nuclide queries return when no geometry is loaded
    no_target_nuclei: TargetNuclei,
}
//
impl GeomAnalyzer {
    // ### CONSTRUCTION ###

    /// Set up an analyzer with default settings and no geometry
    pub fn new() -> Self {
        log::info!("Initializing geometry analyzer");
        Self {
            loaded: None,
            scale: 1.,
            scan: ScanSettings::default(),
            weight_with_density: true,
            vertex_step: DEFAULT_VERTEX_STEP,
            vertex: Point::origin(),
            no_path_lengths: PathLengthRecord::default(),
            no_target_nuclei: TargetNuclei::default(),
        }
    }

    /// Set up an analyzer for a geometry
    pub fn with_geometry(geometry: Box<dyn Geometry>) -> Self {
        let mut analyzer = Self::new();
        analyzer.load(geometry);
        analyzer
    }

    /// Load a geometry, replacing any previously loaded one
    pub fn load(&mut self, geometry: Box<dyn Geometry>) {
        log::info!("A geometry is being passed to the analyzer");
        self.loaded = Some(LoadedGeometry::new(geometry));
        self.vertex = Point::origin();
    }

    /// Load a geometry from a description file
    ///
    /// On failure, any previously loaded geometry is kept.
    ///
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), GeometryError> {
        let geometry = geo::load(path)?;
        self.load(geometry);
        Ok(())
    }

    // ### CONFIGURATION ###

    /// Declare the length unit of the geometry (e.g. units::CENTIMETER), so
    /// that path lengths can be converted to meters
    pub fn set_units(&mut self, unit: Float) {
        self.scale = unit / units::METER;
        log::info!("Geometry units scale factor: {}", self.scale);
    }

    /// Conversion factor from geometry units to meters
    pub fn scale(&self) -> Float {
        self.scale
    }

    /// Restrict the maximal path length scan to the bounding box of some
    /// volume, e.g. to only generate events in part of a detector
    ///
    /// Unknown volume names are ignored (with a warning).
    ///
    pub fn set_top_volume_name(&mut self, name: &str) {
        log::info!("Geometry top volume name: {name}");
        let Some(loaded) = &mut self.loaded else {
            log::warn!("No geometry is loaded, will not change the current top volume");
            return;
        };
        match loaded.geometry.find_volume(name) {
            Some(volume) => loaded.top_volume = volume,
            None => {
                log::warn!("Could not find volume: {name}");
                log::warn!("Will not change the current top volume");
            }
        }
    }

    /// Name of the volume whose bounding box is used by the scan
    pub fn top_volume_name(&self) -> Option<&str> {
        let loaded = self.loaded.as_ref()?;
        Some(loaded.geometry.volume(loaded.top_volume).name.as_str())
    }

    /// Number of random points generated on each face of the bounding box
    /// during the maximal path length scan
    pub fn set_scanner_n_points(&mut self, n_points: usize) {
        self.scan.n_points = n_points;
    }

    /// Number of rays shot from each random point of the scan
    pub fn set_scanner_n_rays(&mut self, n_rays: usize) {
        self.scan.n_rays = n_rays;
    }

    /// Toggle weighting of path lengths by material density
    pub fn set_weight_with_density(&mut self, weight_with_density: bool) {
        self.weight_with_density = weight_with_density;
    }

    /// Truth that path lengths are weighted by material density
    pub fn weight_with_density(&self) -> bool {
        self.weight_with_density
    }

    /// Set the length of the steps used to locate vertices (geometry units)
    pub fn set_vertex_step(&mut self, step: Float) -> Result<(), VertexError> {
        if !(step.is_finite() && step > 0.) {
            return Err(VertexError::InvalidStep(step));
        }
        self.vertex_step = step;
        Ok(())
    }

    // ### QUERIES ###

    /// Target nuclides present in the geometry
    pub fn list_of_target_nuclei(&self) -> &TargetNuclei {
        match &self.loaded {
            Some(loaded) => &loaded.target_nuclei,
            None => {
                log::error!("No geometry is loaded!");
                &self.no_target_nuclei
            }
        }
    }

    /// Estimate the maximal path length through each target nuclide (in
    /// meters) by scanning rays from the surface of the top volume's
    /// bounding box
    pub fn compute_max_path_lengths(
        &mut self,
        rng: &mut (impl UniformSource + ?Sized),
    ) -> &PathLengthRecord {
        log::info!("Computing the maximum path lengths for all materials");
        let Some(loaded) = &mut self.loaded else {
            log::error!("No geometry is loaded!");
            return &self.no_path_lengths;
        };
        loaded.max_path_lengths.set_all_to_zero();

        let bbox = loaded.geometry.bounding_box(loaded.top_volume);
        log::info!("Box dimensions : {}", bbox.half_lengths * 2.);
        log::info!("Box origin     : {}", bbox.origin);
        log::info!(
            "Will generate [{}] random points on each box surface",
            self.scan.n_points
        );
        log::info!("Will generate [{}] rays for each point", self.scan.n_rays);

        for nuclide in loaded.target_nuclei.iter() {
            log::info!("Calculating max path length for nuclide: {nuclide}");
            let max = scanner::max_path_length(
                &*loaded.geometry,
                &bbox,
                nuclide,
                self.scan,
                self.weight_with_density,
                rng,
            );
            log::info!("Max path length found = {max}");
            loaded.max_path_lengths.set_path_length(nuclide, max);
        }

        loaded.max_path_lengths.scale(self.scale);
        &loaded.max_path_lengths
    }

    /// Compute the path length through each target nuclide (in meters) of a
    /// neutrino starting at some point and travelling along some direction
    ///
    /// The direction does not need to be normalized (a momentum will do).
    ///
    pub fn compute_path_lengths(&mut self, start: &Point, direction: &Vector) -> &PathLengthRecord {
        log::debug!("Computing path lengths from {start} along {direction}");
        let Some(loaded) = &mut self.loaded else {
            log::error!("No geometry is loaded!");
            return &self.no_path_lengths;
        };
        loaded.path_lengths.set_all_to_zero();
        let Some(direction) = linalg::direction(direction) else {
            log::error!("Cannot compute path lengths along a null direction");
            return &loaded.path_lengths;
        };

        let ray = Ray::new(*start, direction);
        let weight_with_density = self.weight_with_density;
        let path_lengths = &mut loaded.path_lengths;
        stepper::walk(&*loaded.geometry, &ray, None, |material, step| {
            let weight = material.weight(weight_with_density);
            for nuclide in material.nuclides() {
                path_lengths.add_path_length(nuclide, step * weight);
            }
        });

        loaded.path_lengths.scale(self.scale);
        &loaded.path_lengths
    }

    /// Generate an interaction vertex in the material of some target
    /// nuclide, for a neutrino starting at some point and travelling along
    /// some direction
    ///
    /// On failure, the vertex is left at the origin.
    ///
    pub fn generate_vertex(
        &mut self,
        start: &Point,
        direction: &Vector,
        nuclide: NuclideId,
        rng: &mut (impl UniformSource + ?Sized),
    ) -> Result<Point, VertexError> {
        log::debug!("Generating vtx in material: {nuclide} along the input neutrino direction");
        self.vertex = Point::origin();
        let Some(loaded) = &self.loaded else {
            log::error!("No geometry is loaded!");
            return Err(VertexError::NoGeometry);
        };
        let Some(direction) = linalg::direction(direction) else {
            log::error!("Cannot generate a vertex along a null direction");
            return Err(VertexError::NullDirection);
        };

        let sampler = VertexSampler {
            step: self.vertex_step,
            weight_with_density: self.weight_with_density,
        };
        let ray = Ray::new(*start, direction);
        self.vertex = sampler.generate(&*loaded.geometry, &ray, nuclide, rng)?;
        log::debug!("Vertex = {}", self.vertex);
        Ok(self.vertex)
    }

    /// Last generated vertex (origin if the last generation failed)
    pub fn vertex(&self) -> &Point {
        &self.vertex
    }
}

impl Default for GeomAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
