//! The three classic flocking rules as pure functions over a neighbor slice.
//!
//! Each rule filters the slice with its own distance and vision cone, so
//! one query at the largest radius can serve all three.

use crate::agent::AgentId;
use crate::vec3::Vec3;

/// The slice of an agent's state the flocking rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flockmate {
    pub id: AgentId,
    pub position: Vec3,
    pub forward: Vec3,
    pub radius: f32,
}

/// Whether `other` counts as a neighbor of `agent`.
///
/// Anything closer than `min_distance` always counts. Beyond that it must be
/// within `max_distance` and inside the cone `dot(forward, offset) > cos_max_angle`.
pub fn in_boid_neighborhood(
    agent: &Flockmate,
    other: &Flockmate,
    min_distance: f32,
    max_distance: f32,
    cos_max_angle: f32,
) -> bool {
    if other.id == agent.id {
        return false;
    }
    let offset = other.position - agent.position;
    let distance_squared = offset.length_squared();

    if distance_squared < min_distance * min_distance {
        true
    } else if distance_squared > max_distance * max_distance {
        false
    } else {
        let unit_offset = offset.normalize();
        agent.forward.dot(&unit_offset) > cos_max_angle
    }
}

fn qualifying<'a>(
    agent: &'a Flockmate,
    max_distance: f32,
    cos_max_angle: f32,
    neighbors: &'a [Flockmate],
) -> impl Iterator<Item = &'a Flockmate> + 'a {
    let min_distance = agent.radius * 3.0;
    neighbors.iter().filter(move |other| {
        in_boid_neighborhood(agent, other, min_distance, max_distance, cos_max_angle)
    })
}

/// Steer away from crowding neighbors, each weighted by inverse distance.
pub fn separation(
    agent: &Flockmate,
    max_distance: f32,
    cos_max_angle: f32,
    neighbors: &[Flockmate],
) -> Vec3 {
    let mut steering = Vec3::zero();

    for other in qualifying(agent, max_distance, cos_max_angle, neighbors) {
        let offset = other.position - agent.position;
        let distance_squared = offset.length_squared();
        // Coincident agents give no direction to flee in.
        if distance_squared > 0.0 {
            steering += offset / -distance_squared;
        }
    }

    steering.normalize()
}

/// Steer toward the average heading of neighbors.
pub fn alignment(
    agent: &Flockmate,
    max_distance: f32,
    cos_max_angle: f32,
    neighbors: &[Flockmate],
) -> Vec3 {
    let mut sum = Vec3::zero();
    let mut count = 0;

    for other in qualifying(agent, max_distance, cos_max_angle, neighbors) {
        sum += other.forward;
        count += 1;
    }

    if count > 0 {
        (sum / count as f32 - agent.forward).normalize()
    } else {
        Vec3::zero()
    }
}

/// Steer toward the centroid of neighbors.
pub fn cohesion(
    agent: &Flockmate,
    max_distance: f32,
    cos_max_angle: f32,
    neighbors: &[Flockmate],
) -> Vec3 {
    let mut sum = Vec3::zero();
    let mut count = 0;

    for other in qualifying(agent, max_distance, cos_max_angle, neighbors) {
        sum += other.position;
        count += 1;
    }

    if count > 0 {
        (sum / count as f32 - agent.position).normalize()
    } else {
        Vec3::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mate(id: u32, x: f32, z: f32, forward: Vec3) -> Flockmate {
        Flockmate {
            id: AgentId::new(id),
            position: Vec3::new(x, 0.0, z),
            forward,
            radius: 0.5,
        }
    }

    const EAST: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    const NORTH: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    #[test]
    fn test_self_is_never_a_neighbor() {
        let me = mate(0, 0.0, 0.0, EAST);
        assert!(!in_boid_neighborhood(&me, &me, 1.5, 5.0, -1.0));
    }

    #[test]
    fn test_close_neighbor_counts_regardless_of_angle() {
        let me = mate(0, 0.0, 0.0, EAST);
        let behind = mate(1, -1.0, 0.0, EAST);
        assert!(in_boid_neighborhood(&me, &behind, 1.5, 5.0, 0.9));
    }

    #[test]
    fn test_vision_cone_filters_far_neighbors() {
        let me = mate(0, 0.0, 0.0, EAST);
        let ahead = mate(1, 3.0, 0.0, EAST);
        let behind = mate(2, -3.0, 0.0, EAST);
        assert!(in_boid_neighborhood(&me, &ahead, 1.5, 5.0, 0.7));
        assert!(!in_boid_neighborhood(&me, &behind, 1.5, 5.0, 0.7));
        assert!(!in_boid_neighborhood(&me, &ahead, 1.5, 2.0, 0.7));
    }

    #[test]
    fn test_separation_points_away_from_neighbor() {
        let me = mate(0, 0.0, 0.0, EAST);
        let neighbors = [me, mate(1, 2.0, 0.0, EAST)];
        let steering = separation(&me, 5.0, -0.707, &neighbors);

        assert!((steering.x + 1.0).abs() < 0.0001);
        assert!(steering.z.abs() < 0.0001);
    }

    #[test]
    fn test_separation_nearer_neighbor_dominates() {
        let me = mate(0, 0.0, 0.0, EAST);
        let neighbors = [mate(1, 1.0, 1.0, EAST), mate(2, 4.0, -4.0, EAST)];
        let steering = separation(&me, 10.0, -1.0, &neighbors);
        assert!(steering.z < 0.0);
    }

    #[test]
    fn test_alignment_turns_toward_average_heading() {
        let me = mate(0, 0.0, 0.0, EAST);
        let neighbors = [mate(1, 3.0, 0.5, NORTH), mate(2, 3.0, -0.5, NORTH)];
        let steering = alignment(&me, 7.5, 0.7, &neighbors);

        // (0,0,1) - (1,0,0), normalized
        let expected = Vec3::new(-1.0, 0.0, 1.0).normalize();
        assert!((steering - expected).length() < 0.0001);
    }

    #[test]
    fn test_cohesion_points_to_centroid() {
        let me = mate(0, 0.0, 0.0, EAST);
        let neighbors = [mate(1, 4.0, 2.0, EAST), mate(2, 4.0, -2.0, EAST)];
        let steering = cohesion(&me, 9.0, -0.15, &neighbors);
        assert!((steering - EAST).length() < 0.0001);
    }

    #[test]
    fn test_no_qualifying_neighbors_gives_zero() {
        let me = mate(0, 0.0, 0.0, EAST);
        let far = [mate(1, 50.0, 0.0, NORTH)];
        assert_eq!(separation(&me, 5.0, -0.707, &far), Vec3::ZERO);
        assert_eq!(alignment(&me, 7.5, 0.7, &far), Vec3::ZERO);
        assert_eq!(cohesion(&me, 9.0, -0.15, &far), Vec3::ZERO);
        assert_eq!(cohesion(&me, 9.0, -0.15, &[]), Vec3::ZERO);
    }

    #[test]
    fn test_coincident_neighbor_gives_no_nan() {
        let me = mate(0, 0.0, 0.0, EAST);
        let twin = [mate(1, 0.0, 0.0, EAST)];
        let steering = separation(&me, 5.0, -0.707, &twin);
        assert_eq!(steering, Vec3::ZERO);
        assert_eq!(cohesion(&me, 9.0, -0.15, &twin), Vec3::ZERO);
        assert_eq!(alignment(&me, 7.5, -1.0, &twin), Vec3::ZERO);
    }
}
