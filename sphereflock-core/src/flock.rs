use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::agent::{Agent, AgentId, NeighborQuery, SteeringDecision};
use crate::behavior::Flockmate;
use crate::error::ConfigError;
use crate::obstacle::ObstacleSet;
use crate::params::{FlockingParams, UpdateOrder};
use crate::proximity::ProximityDatabase;
use crate::vec3::Vec3;
use crate::vehicle::Kinematics;
use crate::world::World;

/// Everything an agent shares with the rest of its flock during a tick.
#[derive(Debug)]
pub struct FlockContext<D> {
    world: World,
    database: D,
    obstacles: ObstacleSet,
    params: FlockingParams,
    /// Last registered state of every agent, keyed by id.
    roster: BTreeMap<AgentId, Flockmate>,
}

impl<D: ProximityDatabase> FlockContext<D> {
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn params(&self) -> &FlockingParams {
        &self.params
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    /// Publishes the agent's current state to the proximity database and
    /// to every later neighbor lookup.
    pub(crate) fn register<V: Kinematics>(&mut self, agent: &Agent<V>) {
        self.database
            .update_for_new_position(agent.token(), agent.position());
        self.roster.insert(agent.id(), agent.as_flockmate());
    }
}

impl<D: ProximityDatabase> NeighborQuery for FlockContext<D> {
    fn find_neighbors(&self, center: Vec3, radius: f32, out: &mut Vec<Flockmate>) {
        let mut ids = Vec::new();
        self.database.find_neighbors(center, radius, &mut ids);
        // Backends return ids in their own order; sum in a fixed one.
        ids.sort_unstable();
        out.extend(ids.iter().filter_map(|id| self.roster.get(id).copied()));
    }
}

/// What happened during one `Flock::update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateSummary {
    pub agents: usize,
    /// Agents whose force came from obstacle avoidance this frame.
    pub avoiding: usize,
}

/// The simulation: an ordered set of agents and the world they share.
#[derive(Debug)]
pub struct Flock<V, D> {
    agents: Vec<Agent<V>>,
    context: FlockContext<D>,
    order: UpdateOrder,
    next_id: u32,
    decisions: Vec<SteeringDecision>,
}

impl<V: Kinematics, D: ProximityDatabase> Flock<V, D> {
    pub fn new(world: World, database: D, params: FlockingParams) -> Result<Self, ConfigError> {
        params.validate()?;
        log::info!(
            "creating flock: world radius {}, neighbor radius {}",
            world.radius(),
            params.max_radius()
        );
        Ok(Self {
            agents: Vec::new(),
            context: FlockContext {
                world,
                database,
                obstacles: ObstacleSet::new(),
                params,
                roster: BTreeMap::new(),
            },
            order: UpdateOrder::default(),
            next_id: 0,
            decisions: Vec::new(),
        })
    }

    pub fn with_update_order(mut self, order: UpdateOrder) -> Self {
        self.order = order;
        self
    }

    pub fn update_order(&self) -> UpdateOrder {
        self.order
    }

    pub fn world(&self) -> &World {
        self.context.world()
    }

    pub fn params(&self) -> &FlockingParams {
        self.context.params()
    }

    /// Takes effect from the next update.
    pub fn set_params(&mut self, params: FlockingParams) -> Result<(), ConfigError> {
        params.validate()?;
        self.context.params = params;
        Ok(())
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        self.context.obstacles()
    }

    pub fn obstacles_mut(&mut self) -> &mut ObstacleSet {
        &mut self.context.obstacles
    }

    pub fn database(&self) -> &D {
        self.context.database()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent<V>] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent<V>> {
        self.agents.iter().find(|agent| agent.id() == id)
    }

    /// Adds a vehicle at the end of the update order and registers its
    /// current position.
    pub fn add(&mut self, vehicle: V) -> AgentId {
        let id = AgentId::new(self.next_id);
        self.next_id += 1;

        let token = self.context.database.allocate_token(id);
        let agent = Agent::new(id, token, vehicle);
        self.context.register(&agent);
        log::debug!("added {} at {:?}", id, agent.position());
        self.agents.push(agent);
        id
    }

    /// Teleports an agent. Returns `false` for an unknown id.
    pub fn move_to(&mut self, id: AgentId, x: f32, y: f32, z: f32) -> bool {
        let Some(agent) = self.agents.iter_mut().find(|agent| agent.id() == id) else {
            return false;
        };
        agent.set_position(Vec3::new(x, y, z));
        self.context.register(&*agent);
        true
    }

    /// Removes the most recently added agent, returning its vehicle.
    pub fn remove_last(&mut self) -> Option<V> {
        let agent = self.agents.pop()?;
        Some(self.release(agent))
    }

    pub fn remove(&mut self, id: AgentId) -> Option<V> {
        let index = self.agents.iter().position(|agent| agent.id() == id)?;
        let agent = self.agents.remove(index);
        Some(self.release(agent))
    }

    fn release(&mut self, agent: Agent<V>) -> V {
        let id = agent.id();
        self.context.roster.remove(&id);
        let (vehicle, token) = agent.into_parts();
        self.context.database.release_token(token);
        log::debug!("removed {} ({} left)", id, self.agents.len());
        vehicle
    }

    /// Advances every agent by one frame.
    pub fn update(&mut self, current_time: f32, elapsed_time: f32) -> UpdateSummary {
        let mut summary = UpdateSummary {
            agents: self.agents.len(),
            avoiding: 0,
        };

        match self.order {
            UpdateOrder::Sequential => {
                for agent in self.agents.iter_mut() {
                    let decision = agent.tick(current_time, elapsed_time, &mut self.context);
                    if decision.is_avoiding() {
                        summary.avoiding += 1;
                    }
                }
            }
            UpdateOrder::Simultaneous => {
                self.decisions.clear();
                for agent in &self.agents {
                    let decision = agent.steer_to_flock(
                        &self.context.params,
                        &self.context,
                        &self.context.obstacles,
                    );
                    self.decisions.push(decision);
                }
                for (agent, decision) in self.agents.iter_mut().zip(&self.decisions) {
                    if decision.is_avoiding() {
                        summary.avoiding += 1;
                    }
                    agent.apply_steering(decision.force, elapsed_time, &mut self.context);
                }
            }
        }

        summary
    }
}
