//! Target nuclide identification

use crate::{geo::Geometry, numeric::Float};

use std::fmt::{self, Display};

/// Identifier of a target nucleus, following the PDG ion numbering scheme
/// 10LZZZAAAI (with L = I = 0 here)
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NuclideId(i32);
//
impl NuclideId {
    /// Build the identifier of a nucleus from its mass number and charge
    pub const fn new(a: i32, z: i32) -> Self {
        Self(1_000_000_000 + 10_000 * z + 10 * a)
    }

    /// Build the identifier from the (possibly fractional) mass number and
    /// charge stored in material databases, which are truncated
    pub fn from_az(a: Float, z: Float) -> Self {
        Self::new(a as i32, z as i32)
    }

    /// Raw PDG code
    pub fn pdg_code(self) -> i32 {
        self.0
    }

    /// Mass number
    pub fn a(self) -> i32 {
        (self.0 / 10) % 1000
    }

    /// Atomic number
    pub fn z(self) -> i32 {
        (self.0 / 10_000) % 1000
    }
}

impl Display for NuclideId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

impl From<NuclideId> for i32 {
    fn from(id: NuclideId) -> i32 {
        id.0
    }
}

/// Set of target nuclides present in a loaded geometry
///
/// Kept sorted and free of duplicates, so that it can directly be used to
/// size per-nuclide accumulators.
///
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TargetNuclei(Vec<NuclideId>);
//
impl TargetNuclei {
    /// Enumerate the target nuclides found in the materials of a geometry
    ///
    /// Every volume is visited, and mixtures are expanded into their
    /// constituent elements. Volumes without medium or material, such as pure
    /// containers, have no target to offer and are skipped.
    ///
    pub fn from_geometry(geometry: &dyn Geometry) -> Self {
        let volumes = geometry.volumes();
        log::debug!("Number of volumes found: {}", volumes.len());
        let targets = volumes
            .iter()
            .filter_map(|volume| {
                let material = volume.material();
                if material.is_none() {
                    log::debug!("Volume {} has no material, skipping it", volume.name);
                }
                material
            })
            .flat_map(|material| material.nuclides())
            .collect::<Self>();
        log::info!("Target nuclides in the geometry: {}", targets);
        targets
    }

    /// Number of distinct nuclides
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Truth that no nuclide was found
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Truth that a nuclide is part of the set
    pub fn contains(&self, id: NuclideId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Iterate over the nuclides, in increasing PDG code order
    pub fn iter(&self) -> impl Iterator<Item = NuclideId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<NuclideId> for TargetNuclei {
    /// Collect nuclides, duplicates are welcome
    fn from_iter<I: IntoIterator<Item = NuclideId>>(iter: I) -> Self {
        let mut ids = iter.into_iter().collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }
}

impl Display for TargetNuclei {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "[")?;
        for (idx, id) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(fmt, ", ")?;
            }
            write!(fmt, "{}", id)?;
        }
        write!(fmt, "]")
    }
}
