use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use sphereflock_cli::{build_simulation, resolve_settings, run, Args};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let settings = resolve_settings(&args)?;

    if args.print_settings {
        println!("{}", settings.to_json_pretty()?);
        return Ok(());
    }

    log::info!("Using {} boids", args.boids);
    log::info!("World radius: {}", settings.world_radius);
    log::info!(
        "Update order: {:?}, index: {:?}",
        settings.update_order,
        settings.index
    );

    let mut simulation = build_simulation(&args, &settings)?;
    let options = args.run_options()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    run(&mut simulation, &options, |report| {
        if args.json {
            serde_json::to_writer(&mut out, report)?;
            writeln!(out)?;
        } else {
            log::info!(
                "frame {} t={:.2}s: {} boids, {} avoiding, mean speed {:.2}, polarization {:.2}, max distance {:.1}",
                report.frame,
                report.time,
                report.boids,
                report.avoiding,
                report.mean_speed,
                report.polarization,
                report.max_distance
            );
        }
        Ok(())
    })
    .context("Simulation error")?;

    out.flush()?;
    Ok(())
}
