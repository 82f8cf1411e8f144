use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sphereflock_core::{
    AgentId, AgentParams, Flock, Kinematics, SimpleVehicle, UpdateSummary, Vec3, World,
};
use sphereflock_shared::{AgentSnapshot, FlockSettings, FrameReport, Point3};

use crate::index::SpatialIndex;
use crate::settings;

fn point(v: Vec3) -> Point3 {
    Point3::new(v.x, v.y, v.z)
}

/// A flock plus the clock and random source driving it.
pub struct Simulation {
    flock: Flock<SimpleVehicle, SpatialIndex>,
    agent_params: AgentParams,
    rng: StdRng,
    frame: u64,
    time: f32,
}

impl Simulation {
    pub fn new(settings: &FlockSettings, seed: u64) -> Result<Self> {
        let world = World::new(settings.world_radius).context("Invalid world settings")?;
        let index = SpatialIndex::from_settings(settings).context("Invalid proximity settings")?;
        let flock = Flock::new(world, index, settings::flocking_params(settings))
            .context("Invalid flocking settings")?
            .with_update_order(settings::update_order(settings));

        Ok(Self {
            flock,
            agent_params: settings::agent_params(settings),
            rng: StdRng::seed_from_u64(seed),
            frame: 0,
            time: 0.0,
        })
    }

    pub fn flock(&self) -> &Flock<SimpleVehicle, SpatialIndex> {
        &self.flock
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Spawns a boid with a random heading and drops it at a random whole
    /// coordinate of the square enclosing the world.
    pub fn add_boid(&mut self) -> AgentId {
        let vehicle = SimpleVehicle::random(&self.agent_params, &mut self.rng);
        let id = self.flock.add(vehicle);

        let extent = self.flock.world().radius() as i32;
        let x = self.rng.gen_range(-extent..=extent) as f32;
        let z = self.rng.gen_range(-extent..=extent) as f32;
        self.flock.move_to(id, x, 0.0, z);
        id
    }

    /// Removes the most recently added boid. Returns `false` on an empty flock.
    pub fn remove_boid(&mut self) -> bool {
        self.flock.remove_last().is_some()
    }

    pub fn step(&mut self, elapsed_time: f32) -> UpdateSummary {
        self.frame += 1;
        self.time += elapsed_time;
        self.flock.update(self.time, elapsed_time)
    }

    pub fn report(&self, summary: &UpdateSummary, with_agents: bool) -> FrameReport {
        let agents = self.flock.agents();
        let center = self.flock.world().center();

        let mut position_sum = Vec3::ZERO;
        let mut forward_sum = Vec3::ZERO;
        let mut speed_sum = 0.0;
        let mut max_distance: f32 = 0.0;
        for agent in agents {
            let vehicle = agent.vehicle();
            position_sum += vehicle.position();
            forward_sum += vehicle.forward();
            speed_sum += vehicle.speed();
            max_distance = max_distance.max(vehicle.position().distance(&center));
        }

        let (centroid, mean_speed, polarization) = if agents.is_empty() {
            (Vec3::ZERO, 0.0, 0.0)
        } else {
            let n = agents.len() as f32;
            (position_sum / n, speed_sum / n, (forward_sum / n).length())
        };

        let snapshots = if with_agents {
            agents
                .iter()
                .map(|agent| {
                    let vehicle = agent.vehicle();
                    AgentSnapshot {
                        id: agent.id().get(),
                        position: point(vehicle.position()),
                        forward: point(vehicle.forward()),
                        side: point(vehicle.side()),
                        speed: vehicle.speed(),
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        FrameReport {
            frame: self.frame,
            time: self.time,
            boids: agents.len(),
            avoiding: summary.avoiding,
            centroid: point(centroid),
            mean_speed,
            polarization,
            max_distance,
            agents: snapshots,
        }
    }
}

/// Frame loop options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub frames: u64,
    pub elapsed_time: f32,
    /// Emit a report every this many frames; 0 only reports the last frame.
    pub report_every: u64,
    pub snapshots: bool,
    /// Frames before which one boid is added.
    pub add_at: Vec<u64>,
    /// Frames before which the last boid is removed.
    pub remove_at: Vec<u64>,
}

/// Runs `options.frames` frames, handing each due report to `emit`.
pub fn run<F>(simulation: &mut Simulation, options: &RunOptions, mut emit: F) -> Result<()>
where
    F: FnMut(&FrameReport) -> Result<()>,
{
    for i in 1..=options.frames {
        let next = simulation.frame() + 1;
        for _ in options.add_at.iter().filter(|&&f| f == next) {
            simulation.add_boid();
            log::info!("{} boids", simulation.flock().len());
        }
        for _ in options.remove_at.iter().filter(|&&f| f == next) {
            if simulation.remove_boid() {
                log::info!("{} boids", simulation.flock().len());
            } else {
                log::warn!("No boid left to remove at frame {}", next);
            }
        }

        let summary = simulation.step(options.elapsed_time);

        let is_last = i == options.frames;
        let is_due = options.report_every > 0 && simulation.frame() % options.report_every == 0;
        if is_due || is_last {
            let report = simulation.report(&summary, options.snapshots);
            emit(&report)?;
        }
    }

    Ok(())
}
