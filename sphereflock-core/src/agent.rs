use alloc::vec::Vec;
use core::fmt;

use crate::behavior::{self, Flockmate};
use crate::flock::FlockContext;
use crate::obstacle::ObstacleSet;
use crate::params::FlockingParams;
use crate::proximity::{ProximityDatabase, ProximityToken};
use crate::vec3::Vec3;
use crate::vehicle::Kinematics;
use crate::world::World;

/// Identity of an agent, unique within its flock for the flock's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(u32);

impl AgentId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "boid#{}", self.0)
    }
}

/// Range query over the flock, resolved to the agents' current state.
pub trait NeighborQuery {
    fn find_neighbors(&self, center: Vec3, radius: f32, out: &mut Vec<Flockmate>);
}

/// Which rule produced a steering force.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteeringKind {
    /// Obstacle avoidance overrode flocking entirely.
    Avoidance,
    /// Weighted flocking components; `force` is their sum.
    Flocking {
        separation: Vec3,
        alignment: Vec3,
        cohesion: Vec3,
    },
}

/// The outcome of one agent's decision for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringDecision {
    pub force: Vec3,
    pub kind: SteeringKind,
}

impl SteeringDecision {
    pub fn is_avoiding(&self) -> bool {
        matches!(self.kind, SteeringKind::Avoidance)
    }
}

/// A boid: a vehicle plus its registration in the flock's proximity database.
#[derive(Debug)]
pub struct Agent<V> {
    id: AgentId,
    token: ProximityToken,
    vehicle: V,
}

impl<V: Kinematics> Agent<V> {
    pub(crate) fn new(id: AgentId, token: ProximityToken, vehicle: V) -> Self {
        Self { id, token, vehicle }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn vehicle(&self) -> &V {
        &self.vehicle
    }

    pub fn position(&self) -> Vec3 {
        self.vehicle.position()
    }

    pub fn as_flockmate(&self) -> Flockmate {
        Flockmate {
            id: self.id,
            position: self.vehicle.position(),
            forward: self.vehicle.forward(),
            radius: self.vehicle.radius(),
        }
    }

    /// Steering force for this frame.
    ///
    /// Any non-zero obstacle avoidance is returned as is. Otherwise the
    /// neighborhood is queried once, at the largest behavior radius, and the
    /// weighted separation, alignment and cohesion are summed.
    pub fn steer_to_flock<Q: NeighborQuery + ?Sized>(
        &self,
        params: &FlockingParams,
        neighbors: &Q,
        obstacles: &ObstacleSet,
    ) -> SteeringDecision {
        let avoidance = obstacles.steer_to_avoid_obstacles(&self.vehicle, params.obstacle_lookahead);
        if !avoidance.is_zero() {
            return SteeringDecision {
                force: avoidance,
                kind: SteeringKind::Avoidance,
            };
        }

        let me = self.as_flockmate();
        let mut mates = Vec::new();
        neighbors.find_neighbors(me.position, params.max_radius(), &mut mates);

        let sep = &params.separation;
        let ali = &params.alignment;
        let coh = &params.cohesion;
        let separation = behavior::separation(&me, sep.radius, sep.cos_max_angle, &mates) * sep.weight;
        let alignment = behavior::alignment(&me, ali.radius, ali.cos_max_angle, &mates) * ali.weight;
        let cohesion = behavior::cohesion(&me, coh.radius, coh.cos_max_angle, &mates) * coh.weight;

        SteeringDecision {
            force: separation + alignment + cohesion,
            kind: SteeringKind::Flocking {
                separation,
                alignment,
                cohesion,
            },
        }
    }

    /// One frame: decide, move, wrap at the world boundary and re-register.
    pub fn tick<D: ProximityDatabase>(
        &mut self,
        current_time: f32,
        elapsed_time: f32,
        context: &mut FlockContext<D>,
    ) -> SteeringDecision {
        log::trace!("{} tick at t={}", self.id, current_time);
        let decision = self.steer_to_flock(context.params(), &*context, context.obstacles());
        self.apply_steering(decision.force, elapsed_time, context);
        decision
    }

    /// Everything in a tick after the decision.
    pub(crate) fn apply_steering<D: ProximityDatabase>(
        &mut self,
        force: Vec3,
        elapsed_time: f32,
        context: &mut FlockContext<D>,
    ) {
        // Motion stays on the horizontal plane.
        let force = force.with_y_zero();
        if elapsed_time > 0.0 {
            self.vehicle.apply_steering_force(force, elapsed_time);
        }
        self.contain(context.world());
        context.register(&*self);
    }

    fn contain(&mut self, world: &World) {
        let position = world.contain(self.vehicle.position()).with_y_zero();
        self.vehicle.set_position(position);
    }

    /// Teleports the agent. Callers must re-register it afterwards.
    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.vehicle.set_position(position);
    }

    pub(crate) fn token(&self) -> &ProximityToken {
        &self.token
    }

    pub(crate) fn into_parts(self) -> (V, ProximityToken) {
        (self.vehicle, self.token)
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::obstacle::tests::fixed;
    use crate::params::BehaviorParams;
    use crate::vehicle::SimpleVehicle;

    /// Serves a fixed neighbor list and counts how often it is asked.
    struct ScriptedNeighbors {
        mates: Vec<Flockmate>,
        calls: Cell<usize>,
        last_radius: Cell<f32>,
    }

    impl ScriptedNeighbors {
        fn new(mates: Vec<Flockmate>) -> Self {
            Self {
                mates,
                calls: Cell::new(0),
                last_radius: Cell::new(0.0),
            }
        }
    }

    impl NeighborQuery for ScriptedNeighbors {
        fn find_neighbors(&self, _center: Vec3, radius: f32, out: &mut Vec<Flockmate>) {
            self.calls.set(self.calls.get() + 1);
            self.last_radius.set(radius);
            out.extend_from_slice(&self.mates);
        }
    }

    const EAST: Vec3 = Vec3::new(1.0, 0.0, 0.0);

    fn agent_at(id: u32, position: Vec3) -> Agent<SimpleVehicle> {
        Agent::new(
            AgentId::new(id),
            ProximityToken::new(id as usize),
            SimpleVehicle::with_pose(position, EAST, 1.0),
        )
    }

    fn mate_at(id: u32, position: Vec3, forward: Vec3) -> Flockmate {
        Flockmate {
            id: AgentId::new(id),
            position,
            forward,
            radius: 0.5,
        }
    }

    fn crowd() -> Vec<Flockmate> {
        vec![
            mate_at(1, Vec3::new(2.0, 0.0, 0.5), Vec3::new(0.0, 0.0, 1.0)),
            mate_at(2, Vec3::new(4.0, 0.0, -1.0), EAST),
            mate_at(3, Vec3::new(6.0, 0.0, 3.0), Vec3::new(0.6, 0.0, 0.8)),
        ]
    }

    #[test]
    fn test_obstacle_avoidance_overrides_flocking() {
        let agent = agent_at(0, Vec3::ZERO);
        let neighbors = ScriptedNeighbors::new(crowd());
        let mut obstacles = ObstacleSet::new();
        let avoid = Vec3::new(0.0, 0.0, -3.5);
        obstacles.add(fixed(2.0, avoid));

        let decision = agent.steer_to_flock(&FlockingParams::default(), &neighbors, &obstacles);

        assert_eq!(decision.force, avoid);
        assert!(decision.is_avoiding());
        assert_eq!(neighbors.calls.get(), 0);
    }

    #[test]
    fn test_no_neighbors_no_obstacles_gives_zero() {
        let agent = agent_at(0, Vec3::ZERO);
        let neighbors = ScriptedNeighbors::new(Vec::new());
        let decision =
            agent.steer_to_flock(&FlockingParams::default(), &neighbors, &ObstacleSet::new());
        assert_eq!(decision.force, Vec3::ZERO);
        assert!(!decision.is_avoiding());
    }

    #[test]
    fn test_single_query_at_max_radius() {
        let agent = agent_at(0, Vec3::ZERO);
        let neighbors = ScriptedNeighbors::new(crowd());
        let params = FlockingParams {
            separation: BehaviorParams::new(5.0, -0.707, 12.0),
            alignment: BehaviorParams::new(11.0, 0.7, 8.0),
            cohesion: BehaviorParams::new(9.0, -0.15, 8.0),
            obstacle_lookahead: 1.0,
        };

        agent.steer_to_flock(&params, &neighbors, &ObstacleSet::new());

        assert_eq!(neighbors.calls.get(), 1);
        assert_eq!(neighbors.last_radius.get(), 11.0);
    }

    #[test]
    fn test_weights_scale_components_linearly() {
        let agent = agent_at(0, Vec3::ZERO);
        let neighbors = ScriptedNeighbors::new(crowd());
        let base = FlockingParams::default();
        let mut tripled = base;
        tripled.cohesion.weight *= 3.0;

        let a = agent.steer_to_flock(&base, &neighbors, &ObstacleSet::new());
        let b = agent.steer_to_flock(&tripled, &neighbors, &ObstacleSet::new());

        match (a.kind, b.kind) {
            (
                SteeringKind::Flocking {
                    separation: sep_a,
                    alignment: ali_a,
                    cohesion: coh_a,
                },
                SteeringKind::Flocking {
                    separation: sep_b,
                    alignment: ali_b,
                    cohesion: coh_b,
                },
            ) => {
                assert!(!coh_a.is_zero());
                assert!((coh_b - coh_a * 3.0).length() < 0.0001);
                assert_eq!(sep_a, sep_b);
                assert_eq!(ali_a, ali_b);
                assert!((b.force - a.force - coh_a * 2.0).length() < 0.0001);
            }
            other => panic!("expected flocking decisions, got {:?}", other),
        }
    }

    #[test]
    fn test_separation_from_close_neighbor() {
        let agent = agent_at(0, Vec3::ZERO);
        let neighbors =
            ScriptedNeighbors::new(vec![mate_at(1, Vec3::new(2.0, 0.0, 0.0), EAST)]);
        let params = FlockingParams::default();

        let decision = agent.steer_to_flock(&params, &neighbors, &ObstacleSet::new());

        match decision.kind {
            SteeringKind::Flocking { separation, .. } => {
                assert!(separation.x < 0.0);
                assert!((separation.length() - 12.0).abs() < 0.0001);
            }
            SteeringKind::Avoidance => panic!("no obstacles were present"),
        }
    }

    #[test]
    fn test_agent_id_display() {
        assert_eq!(alloc::format!("{}", AgentId::new(7)), "boid#7");
    }
}
