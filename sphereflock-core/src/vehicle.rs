//! The kinematics capability the decision layer drives, and a point-mass
//! backend implementing it.

#[cfg(feature = "std")]
use rand::Rng;

#[cfg(feature = "std")]
use crate::params::AgentParams;
use crate::vec3::{Vec3, EPSILON};

/// Operations the flocking layer needs from a vehicle.
///
/// Integration, clipping and orientation are the implementor's business;
/// the flock only reads the pose and hands over a steering force.
pub trait Kinematics {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    /// Unit heading.
    fn forward(&self) -> Vec3;
    /// Unit vector to the side of the heading, perpendicular to up.
    fn side(&self) -> Vec3;

    fn speed(&self) -> f32;
    fn set_speed(&mut self, speed: f32);

    /// Bounding sphere radius.
    fn radius(&self) -> f32;
    fn set_radius(&mut self, radius: f32);

    fn max_force(&self) -> f32;
    fn set_max_force(&mut self, max_force: f32);

    fn max_speed(&self) -> f32;
    fn set_max_speed(&mut self, max_speed: f32);

    /// Advances the vehicle by `elapsed_time` under `force`.
    ///
    /// Must leave the vehicle untouched when `elapsed_time` is not positive.
    fn apply_steering_force(&mut self, force: Vec3, elapsed_time: f32);

    fn velocity(&self) -> Vec3 {
        self.forward() * self.speed()
    }
}

/// Point-mass vehicle with an orthonormal local space.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleVehicle {
    position: Vec3,
    forward: Vec3,
    side: Vec3,
    up: Vec3,
    speed: f32,
    mass: f32,
    radius: f32,
    max_force: f32,
    max_speed: f32,
}

impl Default for SimpleVehicle {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleVehicle {
    pub fn new() -> Self {
        let mut vehicle = Self {
            position: Vec3::ZERO,
            forward: Vec3::new(0.0, 0.0, 1.0),
            side: Vec3::ZERO,
            up: Vec3::UP,
            speed: 0.0,
            mass: 1.0,
            radius: 0.5,
            max_force: 0.1,
            max_speed: 1.0,
        };
        vehicle.set_forward(vehicle.forward);
        vehicle
    }

    /// A vehicle at `position` heading along `forward` on the XZ plane.
    pub fn with_pose(position: Vec3, forward: Vec3, speed: f32) -> Self {
        let mut vehicle = Self::new();
        vehicle.position = position;
        vehicle.set_forward(forward);
        vehicle.speed = speed;
        vehicle
    }

    /// Fresh boid pose: limits from `params`, random heading, placed at
    /// `params.spawn_distance` from the origin in a random XZ direction.
    #[cfg(feature = "std")]
    pub fn random<R: Rng + ?Sized>(params: &AgentParams, rng: &mut R) -> Self {
        let mut vehicle = Self::new();
        vehicle.max_force = params.max_force;
        vehicle.max_speed = params.max_speed;
        vehicle.radius = params.radius;
        vehicle.speed = params.max_speed * params.initial_speed_fraction;
        vehicle.randomize_heading_on_xz_plane(rng);
        vehicle.position = random_unit_vector_on_xz_plane(rng) * params.spawn_distance;
        vehicle
    }

    #[cfg(feature = "std")]
    pub fn randomize_heading_on_xz_plane<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.up = Vec3::UP;
        self.set_forward(random_unit_vector_on_xz_plane(rng));
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Non-positive masses are ignored.
    pub fn set_mass(&mut self, mass: f32) {
        if mass > 0.0 {
            self.mass = mass;
        }
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Re-derives side and up from a new heading. A zero heading keeps the
    /// current orientation.
    pub fn set_forward(&mut self, forward: Vec3) {
        let forward = forward.normalize();
        if forward.is_zero() {
            return;
        }
        let side = forward.cross(&self.up).normalize();
        if side.is_zero() {
            // Heading parallel to up: keep the old side axis.
            self.forward = forward;
            self.up = self.side.cross(&forward).normalize();
            return;
        }
        self.forward = forward;
        self.side = side;
        self.up = side.cross(&forward);
    }
}

impl Kinematics for SimpleVehicle {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn forward(&self) -> Vec3 {
        self.forward
    }

    fn side(&self) -> Vec3 {
        self.side
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    fn max_force(&self) -> f32 {
        self.max_force
    }

    fn set_max_force(&mut self, max_force: f32) {
        self.max_force = max_force;
    }

    fn max_speed(&self) -> f32 {
        self.max_speed
    }

    fn set_max_speed(&mut self, max_speed: f32) {
        self.max_speed = max_speed;
    }

    fn apply_steering_force(&mut self, force: Vec3, elapsed_time: f32) {
        // Also rejects NaN.
        if !(elapsed_time > 0.0) {
            return;
        }

        let clipped = force.truncate_length(self.max_force);
        let acceleration = clipped / self.mass;
        let new_velocity =
            (self.velocity() + acceleration * elapsed_time).truncate_length(self.max_speed);

        self.speed = new_velocity.length();
        self.position += new_velocity * elapsed_time;

        if self.speed > EPSILON {
            self.set_forward(new_velocity / self.speed);
        }
    }
}

#[cfg(feature = "std")]
pub fn random_unit_vector_on_xz_plane<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let angle = rng.gen_range(0.0..core::f32::consts::TAU);
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving_vehicle() -> SimpleVehicle {
        let mut vehicle = SimpleVehicle::with_pose(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 1.0);
        vehicle.set_max_force(10.0);
        vehicle.set_max_speed(5.0);
        vehicle
    }

    #[test]
    fn test_local_space_is_orthonormal() {
        let vehicle = SimpleVehicle::with_pose(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0), 0.0);
        assert!((vehicle.forward().length() - 1.0).abs() < 0.0001);
        assert!((vehicle.side().length() - 1.0).abs() < 0.0001);
        assert!(vehicle.forward().dot(&vehicle.side()).abs() < 0.0001);
        assert_eq!(vehicle.side().y, 0.0);
    }

    #[test]
    fn test_coasting_moves_along_forward() {
        let mut vehicle = moving_vehicle();
        vehicle.apply_steering_force(Vec3::ZERO, 2.0);
        assert_eq!(vehicle.position(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(vehicle.speed(), 1.0);
    }

    #[test]
    fn test_force_is_clipped() {
        let mut vehicle = moving_vehicle();
        vehicle.apply_steering_force(Vec3::new(1000.0, 0.0, 0.0), 0.1);
        // 1.0 + 10.0 * 0.1
        assert!((vehicle.speed() - 2.0).abs() < 0.0001);
    }

    #[test]
    fn test_speed_is_clipped() {
        let mut vehicle = moving_vehicle();
        vehicle.apply_steering_force(Vec3::new(10.0, 0.0, 0.0), 10.0);
        assert!((vehicle.speed() - 5.0).abs() < 0.0001);
    }

    #[test]
    fn test_turning_updates_heading() {
        let mut vehicle = moving_vehicle();
        vehicle.apply_steering_force(Vec3::new(0.0, 0.0, 10.0), 0.1);
        assert!(vehicle.forward().z > 0.0);
        assert!((vehicle.forward().length() - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_zero_elapsed_time_is_no_op() {
        let mut vehicle = moving_vehicle();
        let before = vehicle.clone();
        vehicle.apply_steering_force(Vec3::new(5.0, 0.0, 5.0), 0.0);
        assert_eq!(vehicle, before);
        vehicle.apply_steering_force(Vec3::new(5.0, 0.0, 5.0), -1.0);
        assert_eq!(vehicle, before);
    }

    #[test]
    fn test_random_vehicle_uses_params() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let params = AgentParams::default();
        let vehicle = SimpleVehicle::random(&params, &mut rng);

        assert_eq!(vehicle.max_force(), 8.0);
        assert_eq!(vehicle.max_speed(), 2.0);
        assert_eq!(vehicle.radius(), 0.5);
        assert!((vehicle.speed() - 0.6).abs() < 0.0001);
        assert_eq!(vehicle.position().y, 0.0);
        assert!((vehicle.position().length() - 10.0).abs() < 0.001);
        assert_eq!(vehicle.forward().y, 0.0);
    }
}
