//! Vertex generation driver
//!
//! Loads a detector geometry, estimates the maximal path length through each
//! of its target nuclides, then shoots a number of neutrinos along a fixed
//! beam and generates an interaction vertex for each of them:
//!
//! * compute the path length through each target nuclide along the beam,
//! * pick the target nuclide with a probability proportional to its path
//!   length,
//! * generate the vertex in the material of that nuclide,
//! * sum it up,
//!
//! then display and store a summary of the run.

use eyre::WrapErr;

use nugeom::{
    config::Configuration, output, random::RandomGenerator, summary::RunSummary, GeomAnalyzer,
    Result,
};

use std::time::Instant;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG: &str = "nugeom.cfg";

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // ### CONFIGURATION READOUT ###

    let config_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_owned());
    let cfg = Configuration::load(&config_file).wrap_err("Failed to load the configuration")?;

    // ### ANALYZER INITIALIZATION ###

    let mut analyzer = GeomAnalyzer::new();
    analyzer
        .load_file(&cfg.geometry_file)
        .wrap_err("Failed to load the geometry")?;
    analyzer.set_units(cfg.length_unit);
    if let Some(top_volume) = &cfg.top_volume {
        analyzer.set_top_volume_name(top_volume);
    }
    analyzer.set_scanner_n_points(cfg.n_points);
    analyzer.set_scanner_n_rays(cfg.n_rays);
    analyzer.set_weight_with_density(cfg.weight_with_density);
    analyzer
        .set_vertex_step(cfg.vertex_step)
        .wrap_err("Failed to configure vertex generation")?;
    log::info!("Target nuclei: {}", analyzer.list_of_target_nuclei());

    // NOTE: The clock is started after configuration and geometry I/O
    let saved_time = Instant::now();
    let mut rng = RandomGenerator::with_seed(cfg.seed);

    let max_path_lengths = analyzer.compute_max_path_lengths(&mut rng).clone();
    log::info!("Maximal path lengths:\n{max_path_lengths}");

    // ### VERTEX GENERATION ###

    let mut summary = RunSummary::new();
    for _ in 0..cfg.num_events {
        let path_lengths = analyzer
            .compute_path_lengths(&cfg.start, &cfg.direction)
            .clone();
        let Some(nuclide) = path_lengths.pick(&mut rng) else {
            summary.integrate_miss();
            continue;
        };
        match analyzer.generate_vertex(&cfg.start, &cfg.direction, nuclide, &mut rng) {
            Ok(vertex) => summary.integrate(nuclide, &vertex, &path_lengths),
            Err(e) => {
                log::warn!("Vertex generation failed: {e}");
                summary.integrate_failure();
            }
        }
    }

    // ### RESULTS DISPLAY AND STORAGE ###

    let elapsed_time = saved_time.elapsed();
    output::dump_results(&cfg, &max_path_lengths, &summary, elapsed_time)
        .wrap_err("Failed to output the results")?;

    Ok(())
}
