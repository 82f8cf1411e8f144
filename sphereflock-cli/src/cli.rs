use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use sphereflock_shared::{FlockSettings, IndexSetting, OrderSetting};

use crate::simulation::RunOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    /// Later boids see earlier boids' moves from the same frame
    Sequential,
    /// Every boid decides against the previous frame
    Simultaneous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndexArg {
    BruteForce,
    Grid,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Boids flocking in a spherical world", long_about = None)]
pub struct Args {
    /// Number of boids to start with
    #[arg(short = 'n', long, default_value_t = 30)]
    pub boids: usize,

    /// JSON settings file; the flags below override its values
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// World radius
    #[arg(short = 'r', long)]
    pub world_radius: Option<f32>,

    /// Frames to simulate
    #[arg(short, long, default_value_t = 600)]
    pub frames: u64,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub dt: f32,

    /// Random seed for spawn positions and headings
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// When a boid's move becomes visible to the rest of the flock
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    /// Proximity index backend
    #[arg(long, value_enum)]
    pub index: Option<IndexArg>,

    /// Report every N frames (0 reports only the last frame)
    #[arg(long, default_value_t = 60)]
    pub report_every: u64,

    /// Emit reports as JSON lines on stdout
    #[arg(long)]
    pub json: bool,

    /// Include every boid's pose in reports
    #[arg(long)]
    pub snapshots: bool,

    /// Add a boid before this frame (repeatable)
    #[arg(long = "add-at")]
    pub add_at: Vec<u64>,

    /// Remove the last boid before this frame (repeatable)
    #[arg(long = "remove-at")]
    pub remove_at: Vec<u64>,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    pub print_settings: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

impl Args {
    /// Overrides `settings` with whatever was given on the command line.
    pub fn apply_to(&self, settings: &mut FlockSettings) {
        if let Some(radius) = self.world_radius {
            settings.world_radius = radius;
        }
        if let Some(order) = self.order {
            settings.update_order = match order {
                OrderArg::Sequential => OrderSetting::Sequential,
                OrderArg::Simultaneous => OrderSetting::Simultaneous,
            };
        }
        if let Some(index) = self.index {
            settings.index = match index {
                IndexArg::BruteForce => IndexSetting::BruteForce,
                IndexArg::Grid => IndexSetting::Grid,
            };
        }
    }

    pub fn run_options(&self) -> Result<RunOptions> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            bail!("Frame time must be a positive finite number of seconds, got {}", self.dt);
        }
        Ok(RunOptions {
            frames: self.frames,
            elapsed_time: self.dt,
            report_every: self.report_every,
            snapshots: self.snapshots,
            add_at: self.add_at.clone(),
            remove_at: self.remove_at.clone(),
        })
    }
}
