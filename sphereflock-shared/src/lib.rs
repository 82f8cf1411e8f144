use serde::{Deserialize, Serialize};

/// A 3D point or direction in world units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Distance, vision cone and weight of one flocking rule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BehaviorSettings {
    pub radius: f32,
    /// Cosine of the vision cone half-angle
    pub angle: f32,
    pub weight: f32,
}

impl BehaviorSettings {
    pub fn new(radius: f32, angle: f32, weight: f32) -> Self {
        Self {
            radius,
            angle,
            weight,
        }
    }
}

/// Vehicle limits applied to every spawned boid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentSettings {
    pub max_force: f32,
    pub max_speed: f32,
    pub radius: f32,
    pub initial_speed_fraction: f32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_force: 27.0,
            max_speed: 9.0,
            radius: 1.0,
            initial_speed_fraction: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderSetting {
    #[default]
    Sequential,
    Simultaneous,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IndexSetting {
    BruteForce,
    #[default]
    Grid,
}

/// Every tunable of a simulation run. Missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlockSettings {
    pub world_radius: f32,
    pub separation: BehaviorSettings,
    pub alignment: BehaviorSettings,
    pub cohesion: BehaviorSettings,
    pub obstacle_lookahead: f32,
    pub agent: AgentSettings,
    pub update_order: OrderSetting,
    pub index: IndexSetting,
    /// Bins per horizontal axis of the locality grid
    pub grid_divisions: usize,
}

impl Default for FlockSettings {
    fn default() -> Self {
        Self {
            world_radius: 60.0,
            separation: BehaviorSettings::new(5.0, -0.707, 12.0),
            alignment: BehaviorSettings::new(7.5, 0.7, 8.0),
            cohesion: BehaviorSettings::new(9.0, -0.15, 8.0),
            obstacle_lookahead: 0.5,
            agent: AgentSettings::default(),
            update_order: OrderSetting::default(),
            index: IndexSetting::default(),
            grid_divisions: 12,
        }
    }
}

impl FlockSettings {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Pose of one boid, enough to draw it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSnapshot {
    pub id: u32,
    pub position: Point3,
    pub forward: Point3,
    pub side: Point3,
    pub speed: f32,
}

/// Per-frame summary emitted by the driver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub time: f32,
    pub boids: usize,
    /// Boids steering around an obstacle this frame
    pub avoiding: usize,
    pub centroid: Point3,
    pub mean_speed: f32,
    /// Length of the mean heading: 1.0 when every boid flies the same way
    pub polarization: f32,
    /// Farthest boid from the world center
    pub max_distance: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<AgentSnapshot>,
}
