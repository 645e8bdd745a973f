//! Per-nuclide path length accumulation

use crate::{
    nuclide::{NuclideId, TargetNuclei},
    numeric::Float,
    random::UniformSource,
};

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

/// Path lengths traversed through each target nuclide of a geometry
///
/// The set of keys is fixed at construction time to the target nuclides of
/// the geometry, every accumulation pass should start from
/// set_all_to_zero().
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathLengthRecord(BTreeMap<NuclideId, Float>);
//
impl PathLengthRecord {
    /// Build a zeroed record for a set of target nuclides
    pub fn new(targets: &TargetNuclei) -> Self {
        Self(targets.iter().map(|id| (id, 0.)).collect())
    }

    /// Reset all path lengths to zero, keeping the set of nuclides
    pub fn set_all_to_zero(&mut self) {
        self.0.values_mut().for_each(|length| *length = 0.);
    }

    /// Add some length to a nuclide's total
    ///
    /// Lengths for nuclides that are not part of the record are dropped, as
    /// that would indicate a geometry which changed after being scanned.
    ///
    pub fn add_path_length(&mut self, nuclide: NuclideId, length: Float) {
        debug_assert!(length >= 0., "Negative path length {length}");
        match self.0.get_mut(&nuclide) {
            Some(total) => *total += length,
            None => log::warn!("Dropping path length for unknown nuclide {nuclide}"),
        }
    }

    /// Overwrite a nuclide's path length
    pub fn set_path_length(&mut self, nuclide: NuclideId, length: Float) {
        match self.0.get_mut(&nuclide) {
            Some(total) => *total = length,
            None => log::warn!("Dropping path length for unknown nuclide {nuclide}"),
        }
    }

    /// Multiply all path lengths by some factor (unit conversion)
    pub fn scale(&mut self, factor: Float) {
        self.0.values_mut().for_each(|length| *length *= factor);
    }

    /// Path length for a given nuclide, if it is part of the record
    pub fn path_length(&self, nuclide: NuclideId) -> Option<Float> {
        self.0.get(&nuclide).copied()
    }

    /// Iterate over (nuclide, path length) pairs
    pub fn iter(&self) -> impl Iterator<Item = (NuclideId, Float)> + '_ {
        self.0.iter().map(|(&id, &length)| (id, length))
    }

    /// Number of nuclides in the record
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Truth that the record tracks no nuclide
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of the path lengths of all nuclides
    pub fn total(&self) -> Float {
        self.0.values().sum()
    }

    /// Truth that no length was accumulated at all
    pub fn are_all_zero(&self) -> bool {
        self.0.values().all(|&length| length == 0.)
    }

    /// Pick a nuclide with a probability proportional to its path length
    ///
    /// Returns None if all path lengths are zero.
    ///
    pub fn pick(&self, rng: &mut (impl UniformSource + ?Sized)) -> Option<NuclideId> {
        let total = self.total();
        if total <= 0. {
            return None;
        }
        let threshold = rng.random() * total;
        let mut cumulated = 0.;
        let mut last_nonzero = None;
        for (id, length) in self.iter().filter(|&(_, length)| length > 0.) {
            cumulated += length;
            last_nonzero = Some(id);
            if threshold < cumulated {
                return Some(id);
            }
        }
        // Round-off in the cumulated sum
        last_nonzero
    }
}

impl Display for PathLengthRecord {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, length) in self.iter() {
            writeln!(fmt, " - Nuclide: {:>10} -> path length = {:e}", id, length)?;
        }
        Ok(())
    }
}
