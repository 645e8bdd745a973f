//! Mechanism for loading and sharing the run configuration

use crate::{
    linalg::{Point, Vector},
    numeric::Float,
    units, Result,
};

use eyre::{ensure, eyre, WrapErr};

use std::{fs, path::PathBuf, str::FromStr};

/// Run configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Geometry description file (JSON)
    pub geometry_file: PathBuf,

    /// Name of the length unit of the geometry description
    pub length_unit_name: String,

    /// Length unit of the geometry description, relative to the meter
    pub length_unit: Float,

    /// Volume whose bounding box is scanned for maximal path lengths, if
    /// not the world volume
    pub top_volume: Option<String>,

    /// Number of random points per bounding box face in the scan
    pub n_points: usize,

    /// Number of random rays per point in the scan
    pub n_rays: usize,

    /// Whether path lengths should be weighted by material density
    pub weight_with_density: bool,

    /// Length of the steps used to locate vertices (geometry units)
    pub vertex_step: Float,

    /// Number of neutrinos to be generated
    pub num_events: usize,

    /// Random number generator seed
    pub seed: u64,

    /// Starting point of the neutrinos (geometry units)
    pub start: Point,

    /// Direction of the neutrinos (need not be normalized)
    pub direction: Vector,
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and print it out
    pub fn load(file_name: &str) -> Result<Self> {
        let config_str = fs::read_to_string(file_name)
            .wrap_err_with(|| format!("Could not read configuration file {file_name}"))?;
        let config = Self::parse(&config_str)?;
        config.print();
        Ok(config)
    }

    /// Decode and check a configuration
    pub fn parse(config_str: &str) -> Result<Self> {
        // Configuration items are the first non-whitespace chunk of text on
        // each line, blank lines are ignored.
        let mut config_iter = config_str
            .lines()
            .filter_map(|line| line.split_whitespace().next());

        // Fetch the next configuration item, tagged with the name of the field
        // which it is supposed to fill for error reporting purposes.
        let mut next_item = |name: &'static str| -> Result<ConfigItem> {
            config_iter
                .next()
                .map(|data| ConfigItem::new(name, data))
                .ok_or_else(|| eyre!("Missing configuration of {}", name))
        };

        let geometry_file = PathBuf::from(next_item("geometry_file")?.data);
        let length_unit_name = next_item("length_unit")?.data.to_owned();
        let length_unit = units::length_unit(&length_unit_name)
            .ok_or_else(|| eyre!("Unknown length unit {length_unit_name:?}"))?;
        let top_volume = match next_item("top_volume")?.data {
            "-" => None,
            name => Some(name.to_owned()),
        };
        let config = Configuration {
            geometry_file,
            length_unit_name,
            length_unit,
            top_volume,
            n_points: next_item("n_points")?.parse::<usize>()?,
            n_rays: next_item("n_rays")?.parse::<usize>()?,
            weight_with_density: next_item("weight_with_density")?.parse_bool()?,
            vertex_step: next_item("vertex_step")?.parse::<Float>()?,
            num_events: next_item("num_events")?.parse::<usize>()?,
            seed: next_item("seed")?.parse::<u64>()?,
            start: Point::new(
                next_item("start_x")?.parse::<Float>()?,
                next_item("start_y")?.parse::<Float>()?,
                next_item("start_z")?.parse::<Float>()?,
            ),
            direction: Vector::new(
                next_item("direction_x")?.parse::<Float>()?,
                next_item("direction_y")?.parse::<Float>()?,
                next_item("direction_z")?.parse::<Float>()?,
            ),
        };

        ensure!(config.num_events > 0, "Please generate at least one event");
        ensure!(
            config.n_points > 0 && config.n_rays > 0,
            "The maximal path length scan needs at least one point and one ray"
        );
        ensure!(
            config.vertex_step.is_finite() && config.vertex_step > 0.,
            "The vertex location step must be finite and positive"
        );
        ensure!(
            config.direction.iter().all(|x| x.is_finite()) && config.direction.norm() > 0.,
            "The neutrino direction must be a finite, non-null vector"
        );

        Ok(config)
    }

    /// Display the configuration
    pub fn print(&self) {
        println!("GEOMETRY       : {}", self.geometry_file.display());
        println!("LENGTH UNIT    : {}", self.length_unit_name);
        println!(
            "TOP VOLUME     : {}",
            self.top_volume.as_deref().unwrap_or("(world)")
        );
        println!("SCAN POINTS    : {}", self.n_points);
        println!("SCAN RAYS      : {}", self.n_rays);
        println!("DENSITY WEIGHT : {}", self.weight_with_density);
        println!("VERTEX STEP    : {}", self.vertex_step);
        println!("NEVENTS        : {}", self.num_events);
        println!("SEED           : {}", self.seed);
        println!("START          : {}", self.start);
        println!("DIRECTION      : {}", self.direction.transpose());
    }
}

/// A value from the configuration file, tagged with the struct field which it
/// is supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Parse this data using special logic which handles Fortran's bool syntax
    fn parse_bool(self) -> Result<bool> {
        match self.data.to_lowercase().as_str() {
            ".true." => Ok(true),
            ".false." => Ok(false),
            _ => self.parse::<bool>(),
        }
    }
}
