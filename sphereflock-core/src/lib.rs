#![cfg_attr(not(feature = "std"), no_std)]

//! Flocking decisions for boids in a spherical world.
//!
//! Each agent turns its neighborhood into one steering force per frame
//! (separation, alignment and cohesion, unless obstacle avoidance takes
//! over), hands it to its vehicle, and wraps around at the world boundary.

extern crate alloc;

pub mod agent;
pub mod behavior;
pub mod error;
pub mod flock;
pub mod obstacle;
pub mod params;
pub mod proximity;
pub mod vec3;
pub mod vehicle;
pub mod world;

pub use agent::{Agent, AgentId, NeighborQuery, SteeringDecision, SteeringKind};
pub use behavior::Flockmate;
pub use error::ConfigError;
pub use flock::{Flock, FlockContext, UpdateSummary};
pub use obstacle::{Avoidance, Obstacle, ObstacleSet};
pub use params::{AgentParams, BehaviorParams, FlockingParams, UpdateOrder};
pub use proximity::{
    BruteForceDatabase, LocalityGrid, ProximityDatabase, ProximityToken, MAX_GRID_BINS,
};
pub use vec3::Vec3;
pub use vehicle::{Kinematics, SimpleVehicle};
pub use world::World;
