//! This module is in charge of outputting the final run results to the
//! standard output and to disk

use crate::{
    config::Configuration, numeric::Float, pathlength::PathLengthRecord, summary::RunSummary,
    Result,
};

use eyre::WrapErr;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use std::{
    fs::File,
    io::{self, Write},
    time::Duration,
};

/// Name of the results file
pub const RESULTS_FILE: &str = "nugeom.data";

/// Output the run results to the console and to disk
pub fn dump_results(
    cfg: &Configuration,
    max_path_lengths: &PathLengthRecord,
    summary: &RunSummary,
    elapsed_time: Duration,
) -> Result<()> {
    // Timestamp of when the run ended
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .wrap_err("Failed to format the run timestamp")?;

    write_results(&mut io::stdout().lock(), cfg, max_path_lengths, summary, elapsed_time)?;

    let mut dat_file = File::create(RESULTS_FILE)
        .wrap_err_with(|| format!("Failed to create {RESULTS_FILE}"))?;
    writeln!(dat_file, " {timestamp}")?;
    write_results(&mut dat_file, cfg, max_path_lengths, summary, elapsed_time)?;
    Ok(())
}

/// Write down the run results in a human-readable key/value format
fn write_results(
    out: &mut impl Write,
    cfg: &Configuration,
    max_path_lengths: &PathLengthRecord,
    summary: &RunSummary,
    elapsed_time: Duration,
) -> io::Result<()> {
    write_kv(out, "Geometry", cfg.geometry_file.display())?;
    write_kv(out, "Length unit", &cfg.length_unit_name)?;
    write_kv(out, "Density weighting", cfg.weight_with_density)?;
    write_kv(out, "Vertex step", cfg.vertex_step)?;
    write_kv(out, "Neutrino start", cfg.start)?;
    write_kv(out, "Neutrino direction", cfg.direction.transpose())?;
    writeln!(out, " ---------------------------------------------")?;

    writeln!(out, " Maximal path lengths (m, times density when weighted)")?;
    write!(out, "{max_path_lengths}")?;
    writeln!(out, " ---------------------------------------------")?;

    write_kv(out, "Number of events", summary.num_events)?;
    write_kv(out, "... missing the targets", summary.missed)?;
    write_kv(out, "... failed vertex generation", summary.failed)?;
    write_kv(out, "... with a vertex", summary.num_vertices())?;
    for (nuclide, tally) in summary.tallies() {
        writeln!(out, " Nuclide {nuclide}")?;
        let fraction = tally.count as Float / (summary.num_events.max(1) as Float);
        write_kv(out, "  Vertex fraction", fraction)?;
        write_kv(out, "  Mean vertex", tally.mean_vertex())?;
        write_kv(out, "  Mean path length", tally.mean_path_length())?;
    }
    writeln!(out, " ---------------------------------------------")?;

    let elapsed_secs = elapsed_time.as_secs_f64();
    write_kv(out, "Elapsed time (s)", elapsed_secs)?;
    let secs_per_ev = elapsed_secs / (summary.num_events.max(1) as f64);
    write_kv(out, "Elapsed time per event (s)", secs_per_ev)
}

/// Key-value output that uses fixed-size columns for better readability
fn write_kv(out: &mut impl Write, key: &str, value: impl std::fmt::Display) -> io::Result<()> {
    writeln!(out, " {key:<31}: {value}")
}
