//! Headless driver for the sphereflock simulation.

pub mod cli;
pub mod index;
pub mod settings;
pub mod simulation;

pub use cli::Args;
pub use index::SpatialIndex;
pub use simulation::{run, RunOptions, Simulation};

use anyhow::{Context, Result};
use sphereflock_shared::FlockSettings;

/// Settings from the file named on the command line (or defaults), with
/// command-line overrides applied.
pub fn resolve_settings(args: &Args) -> Result<FlockSettings> {
    let mut settings = match &args.settings {
        Some(path) => settings::load(path)?,
        None => FlockSettings::default(),
    };
    args.apply_to(&mut settings);
    Ok(settings)
}

/// Builds a simulation and spawns the initial boids.
pub fn build_simulation(args: &Args, settings: &FlockSettings) -> Result<Simulation> {
    let mut simulation =
        Simulation::new(settings, args.seed).context("Failed to create simulation")?;
    for _ in 0..args.boids {
        simulation.add_boid();
    }
    Ok(simulation)
}
