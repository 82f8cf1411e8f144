use crate::error::{positive_finite, ConfigError};

/// Geometric filter and weight for one flocking behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorParams {
    /// Neighbors farther than this are ignored.
    pub radius: f32,
    /// Cosine of the half-angle of the vision cone. -1.0 sees all around.
    pub cos_max_angle: f32,
    pub weight: f32,
}

impl BehaviorParams {
    pub const fn new(radius: f32, cos_max_angle: f32, weight: f32) -> Self {
        Self {
            radius,
            cos_max_angle,
            weight,
        }
    }

    fn is_finite(&self) -> bool {
        self.radius.is_finite() && self.cos_max_angle.is_finite() && self.weight.is_finite()
    }
}

/// Tunables for the flocking decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockingParams {
    pub separation: BehaviorParams,
    pub alignment: BehaviorParams,
    pub cohesion: BehaviorParams,
    /// Time horizon handed to obstacle avoidance.
    pub obstacle_lookahead: f32,
}

impl Default for FlockingParams {
    fn default() -> Self {
        Self {
            separation: BehaviorParams::new(5.0, -0.707, 12.0),
            alignment: BehaviorParams::new(7.5, 0.7, 8.0),
            cohesion: BehaviorParams::new(9.0, -0.15, 8.0),
            obstacle_lookahead: 0.5,
        }
    }
}

impl FlockingParams {
    /// Radius of the single neighbor query shared by all three behaviors.
    pub fn max_radius(&self) -> f32 {
        self.separation
            .radius
            .max(self.alignment.radius)
            .max(self.cohesion.radius)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, behavior) in [
            ("separation", &self.separation),
            ("alignment", &self.alignment),
            ("cohesion", &self.cohesion),
        ] {
            if !behavior.is_finite() {
                return Err(ConfigError::NonFiniteBehavior(name));
            }
        }
        let max_radius = self.max_radius();
        if !positive_finite(max_radius) {
            return Err(ConfigError::NeighborRadius(max_radius));
        }
        if !positive_finite(self.obstacle_lookahead) {
            return Err(ConfigError::LookaheadTime(self.obstacle_lookahead));
        }
        Ok(())
    }
}

/// Per-agent vehicle limits and spawn pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentParams {
    /// Steering force is clipped to this magnitude.
    pub max_force: f32,
    /// Velocity is clipped to this magnitude.
    pub max_speed: f32,
    pub radius: f32,
    /// Initial speed as a fraction of `max_speed`.
    pub initial_speed_fraction: f32,
    /// Distance from the origin at which agents are spawned.
    pub spawn_distance: f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            max_force: 8.0,
            max_speed: 2.0,
            radius: 0.5,
            initial_speed_fraction: 0.3,
            spawn_distance: 10.0,
        }
    }
}

/// When an agent's new position becomes visible to the rest of the flock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateOrder {
    /// Each agent re-registers before the next one decides, so later agents
    /// see earlier agents' positions from the current frame.
    #[default]
    Sequential,
    /// Every agent decides against the previous frame, then all move.
    Simultaneous,
}
