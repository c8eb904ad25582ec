use std::collections::BTreeMap;

use crate::infra::{AgentId, Color, EnvError, EnvResult, Position};

use super::map::ObstacleGrid;

/// Static description of one agent as given in the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub id: AgentId,
    pub start: Position,
    pub goal: Position,
    pub color: Color,
}

impl AgentSpec {
    pub fn new(id: AgentId, start: impl Into<Position>, goal: impl Into<Position>, color: Color) -> Self {
        Self {
            id,
            start: start.into(),
            goal: goal.into(),
            color,
        }
    }
}

/// Live agent state during an episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: AgentId,
    pub start: Position,
    pub goal: Position,
    pub color: Color,
    pub position: Position,
    pub done: bool,
}

impl Agent {
    fn from_spec(spec: &AgentSpec) -> Self {
        Self {
            id: spec.id,
            start: spec.start,
            goal: spec.goal,
            color: spec.color,
            position: spec.start,
            done: spec.start == spec.goal,
        }
    }

    pub fn on_goal(&self) -> bool {
        self.position == self.goal
    }
}

/// Agents keyed and iterated by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRegistry {
    agents: BTreeMap<AgentId, Agent>,
}

impl AgentRegistry {
    /// Validate the specs against the grid and place every agent on its start.
    ///
    /// Starts are checked by the occupancy overlay; here we reject duplicate
    /// ids and goals that are outside the grid or on a wall.
    pub fn new(specs: &[AgentSpec], grid: &ObstacleGrid) -> EnvResult<Self> {
        let mut agents = BTreeMap::new();
        for spec in specs {
            if !grid.is_in_bounds(spec.goal) {
                return Err(EnvError::configuration(format!(
                    "goal position {} of agent {} is outside the {}x{} grid",
                    spec.goal,
                    spec.id,
                    grid.rows(),
                    grid.cols()
                )));
            }
            if grid.is_wall(spec.goal) {
                return Err(EnvError::Overlap {
                    agent: spec.id,
                    kind: "goal",
                    position: spec.goal,
                    with: "obstacles",
                });
            }
            if agents.insert(spec.id, Agent::from_spec(spec)).is_some() {
                return Err(EnvError::configuration(format!(
                    "agent id {} is configured more than once",
                    spec.id
                )));
            }
        }
        Ok(Self { agents })
    }

    /// Put every agent back on its start and recompute the done flags.
    pub fn reset(&mut self) {
        for agent in self.agents.values_mut() {
            agent.position = agent.start;
            agent.done = agent.on_goal();
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    pub fn on_goal(&self, id: AgentId) -> bool {
        self.agents.get(&id).is_some_and(Agent::on_goal)
    }

    pub fn is_done(&self, id: AgentId) -> bool {
        self.agents.get(&id).is_some_and(|agent| agent.done)
    }

    pub fn all_done(&self) -> bool {
        self.agents.values().all(|agent| agent.done)
    }

    /// Ids in increasing order
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn positions(&self) -> BTreeMap<AgentId, Position> {
        self.agents.iter().map(|(id, a)| (*id, a.position)).collect()
    }

    pub fn starts(&self) -> impl Iterator<Item = (AgentId, Position)> + '_ {
        self.agents.iter().map(|(id, a)| (*id, a.start))
    }

    pub fn goals(&self) -> impl Iterator<Item = (AgentId, Position)> + '_ {
        self.agents.iter().map(|(id, a)| (*id, a.goal))
    }

    pub fn colors(&self) -> impl Iterator<Item = (AgentId, Color)> + '_ {
        self.agents.iter().map(|(id, a)| (*id, a.color))
    }

    pub fn dones(&self) -> BTreeMap<AgentId, bool> {
        self.agents.iter().map(|(id, a)| (*id, a.done)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ObstacleGrid {
        ObstacleGrid::from_rows(&["000", "010", "000"]).unwrap()
    }

    #[test]
    fn test_registry_orders_by_id() {
        let specs = vec![
            AgentSpec::new(2, (2, 2), (0, 0), Color::Blue),
            AgentSpec::new(0, (0, 0), (2, 2), Color::Red),
            AgentSpec::new(1, (0, 2), (0, 2), Color::Green),
        ];
        let registry = AgentRegistry::new(&specs, &grid()).unwrap();

        assert_eq!(registry.ids(), vec![0, 1, 2]);
        assert_eq!(registry.len(), 3);
        assert!(registry.is_done(1), "agent starting on its goal is done");
        assert!(!registry.is_done(0));
        assert!(!registry.all_done());
        assert_eq!(
            registry.colors().map(|(_, c)| c).collect::<Vec<_>>(),
            vec![Color::Red, Color::Green, Color::Blue]
        );
    }

    #[test]
    fn test_goal_on_wall_is_overlap() {
        let specs = vec![AgentSpec::new(0, (0, 0), (1, 1), Color::Red)];
        let err = AgentRegistry::new(&specs, &grid()).unwrap_err();
        assert!(matches!(err, EnvError::Overlap { kind: "goal", .. }));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let specs = vec![
            AgentSpec::new(0, (0, 0), (2, 2), Color::Red),
            AgentSpec::new(0, (0, 1), (2, 1), Color::Blue),
        ];
        let err = AgentRegistry::new(&specs, &grid()).unwrap_err();
        assert!(matches!(err, EnvError::Configuration { .. }));
    }

    #[test]
    fn test_reset_restores_starts() {
        let specs = vec![AgentSpec::new(0, (0, 0), (0, 1), Color::Red)];
        let mut registry = AgentRegistry::new(&specs, &grid()).unwrap();
        if let Some(agent) = registry.get_mut(0) {
            agent.position = Position::new(0, 1);
            agent.done = true;
        }
        assert!(registry.on_goal(0));

        registry.reset();
        assert_eq!(registry.get(0).unwrap().position, Position::new(0, 0));
        assert!(!registry.is_done(0));
    }
}
