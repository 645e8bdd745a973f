//! This module accumulates per-event results of a vertex generation run into
//! a final summary

use crate::{
    linalg::{Point, Vector},
    nuclide::NuclideId,
    numeric::Float,
    pathlength::PathLengthRecord,
};

use num_traits::Zero;

use std::collections::BTreeMap;

/// Interactions generated on one target nuclide
#[derive(Clone, Debug, PartialEq)]
pub struct NuclideTally {
    /// Number of vertices generated
    pub count: usize,

    /// Sum of the vertex positions, relative to the origin
    vertex_sum: Vector,

    /// Sum of the path lengths seen by the rays which interacted (m)
    path_length_sum: Float,
}
//
impl NuclideTally {
    fn new() -> Self {
        Self {
            count: 0,
            vertex_sum: Vector::zero(),
            path_length_sum: 0.,
        }
    }

    /// Mean vertex position
    pub fn mean_vertex(&self) -> Point {
        Point::from(self.vertex_sum / (self.count.max(1) as Float))
    }

    /// Mean path length through this nuclide of the rays which interacted
    pub fn mean_path_length(&self) -> Float {
        self.path_length_sum / (self.count.max(1) as Float)
    }
}

/// Summary of a vertex generation run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Number of events which were processed
    pub num_events: usize,

    /// Events whose ray crossed no target material
    pub missed: usize,

    /// Events for which vertex generation failed
    pub failed: usize,

    /// Successfully generated vertices, per target nuclide
    tallies: BTreeMap<NuclideId, NuclideTally>,
}
//
impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event whose ray crossed no target material
    pub fn integrate_miss(&mut self) {
        self.num_events += 1;
        self.missed += 1;
    }

    /// Record an event for which vertex generation failed
    pub fn integrate_failure(&mut self) {
        self.num_events += 1;
        self.failed += 1;
    }

    /// Record a successfully generated vertex
    pub fn integrate(
        &mut self,
        nuclide: NuclideId,
        vertex: &Point,
        path_lengths: &PathLengthRecord,
    ) {
        self.num_events += 1;
        let tally = self.tallies.entry(nuclide).or_insert_with(NuclideTally::new);
        tally.count += 1;
        tally.vertex_sum += vertex.coords;
        tally.path_length_sum += path_lengths.path_length(nuclide).unwrap_or(0.);
    }

    /// Number of successfully generated vertices
    pub fn num_vertices(&self) -> usize {
        self.tallies.values().map(|tally| tally.count).sum()
    }

    /// Iterate over per-nuclide tallies
    pub fn tallies(&self) -> impl Iterator<Item = (NuclideId, &NuclideTally)> + '_ {
        self.tallies.iter().map(|(&id, tally)| (id, tally))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nuclide::TargetNuclei;

    #[test]
    fn integration() {
        let (h, o) = (NuclideId::new(1, 1), NuclideId::new(16, 8));
        let targets: TargetNuclei = [h, o].into_iter().collect();
        let mut record = PathLengthRecord::new(&targets);
        record.set_path_length(h, 2.);
        record.set_path_length(o, 4.);

        let mut summary = RunSummary::new();
        summary.integrate(h, &Point::new(1., 0., 0.), &record);
        summary.integrate(h, &Point::new(3., 2., 0.), &record);
        summary.integrate(o, &Point::new(0., 0., -1.), &record);
        summary.integrate_miss();
        summary.integrate_failure();

        assert_eq!(summary.num_events, 5);
        assert_eq!(summary.num_vertices(), 3);
        assert_eq!((summary.missed, summary.failed), (1, 1));

        let tallies = summary.tallies().collect::<Vec<_>>();
        assert_eq!(tallies.len(), 2);
        let (id, h_tally) = tallies[0];
        assert_eq!(id, h);
        assert_eq!(h_tally.count, 2);
        assert_eq!(h_tally.mean_vertex(), Point::new(2., 1., 0.));
        assert_eq!(h_tally.mean_path_length(), 2.);
        assert_eq!(tallies[1].1.mean_path_length(), 4.);
    }
}
