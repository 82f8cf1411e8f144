//! Obstacle avoidance contract. Obstacle shapes live outside this crate; the
//! flock only needs each obstacle's verdict for a vehicle.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::vec3::Vec3;
use crate::vehicle::Kinematics;

/// An imminent collision reported by an obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Avoidance {
    /// Distance along the vehicle's path to the collision point.
    pub distance: f32,
    /// Steering force that avoids it.
    pub force: Vec3,
}

pub trait Obstacle: fmt::Debug {
    /// `None` when the vehicle won't hit this obstacle within
    /// `min_time_to_collision`.
    fn steer_to_avoid(&self, vehicle: &dyn Kinematics, min_time_to_collision: f32)
        -> Option<Avoidance>;
}

/// Obstacles shared by every agent in a flock.
#[derive(Debug, Default)]
pub struct ObstacleSet {
    obstacles: Vec<Box<dyn Obstacle>>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, obstacle: Box<dyn Obstacle>) {
        self.obstacles.push(obstacle);
    }

    pub fn remove_last(&mut self) -> Option<Box<dyn Obstacle>> {
        self.obstacles.pop()
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Force avoiding the nearest obstacle on the vehicle's path, or zero
    /// when nothing is within `min_time_to_collision`.
    pub fn steer_to_avoid_obstacles(&self, vehicle: &dyn Kinematics, min_time_to_collision: f32) -> Vec3 {
        self.obstacles
            .iter()
            .filter_map(|obstacle| obstacle.steer_to_avoid(vehicle, min_time_to_collision))
            .filter(|avoidance| !avoidance.force.is_zero())
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .map_or(Vec3::ZERO, |avoidance| avoidance.force)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::vehicle::SimpleVehicle;

    /// Reports the same avoidance for any vehicle.
    #[derive(Debug)]
    pub(crate) struct FixedObstacle(pub Option<Avoidance>);

    impl Obstacle for FixedObstacle {
        fn steer_to_avoid(&self, _vehicle: &dyn Kinematics, _min_time: f32) -> Option<Avoidance> {
            self.0
        }
    }

    pub(crate) fn fixed(distance: f32, force: Vec3) -> Box<dyn Obstacle> {
        Box::new(FixedObstacle(Some(Avoidance { distance, force })))
    }

    #[test]
    fn test_empty_set_gives_zero() {
        let set = ObstacleSet::new();
        let vehicle = SimpleVehicle::new();
        assert_eq!(set.steer_to_avoid_obstacles(&vehicle, 0.5), Vec3::ZERO);
    }

    #[test]
    fn test_nearest_obstacle_wins() {
        let mut set = ObstacleSet::new();
        set.add(fixed(8.0, Vec3::new(1.0, 0.0, 0.0)));
        set.add(fixed(3.0, Vec3::new(0.0, 0.0, 2.0)));
        set.add(Box::new(FixedObstacle(None)));

        let vehicle = SimpleVehicle::new();
        assert_eq!(set.steer_to_avoid_obstacles(&vehicle, 0.5), Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_zero_force_reports_are_ignored() {
        let mut set = ObstacleSet::new();
        set.add(fixed(1.0, Vec3::ZERO));
        set.add(fixed(5.0, Vec3::new(-1.0, 0.0, 0.0)));

        let vehicle = SimpleVehicle::new();
        assert_eq!(set.steer_to_avoid_obstacles(&vehicle, 0.5), Vec3::new(-1.0, 0.0, 0.0));
    }
}
