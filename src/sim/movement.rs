//! Movement engine - applies one action per agent per tick

use std::collections::{BTreeMap, HashMap};

use crate::infra::{Action, AgentId};
use crate::state::{AgentRegistry, OccupancyMap};

/// What happened to a single agent's action during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// The agent moved to the target cell
    Applied,
    /// The agent issued STAY (or had no action this tick)
    Stayed,
    /// The target is a wall or occupied by another agent
    RejectedBlocked,
    /// The target lies outside the grid
    RejectedOutOfBounds,
    /// The agent already reached its goal and is frozen
    NoOpAlreadyDone,
}

impl MoveOutcome {
    pub fn is_applied(self) -> bool {
        self == MoveOutcome::Applied
    }
}

/// Sole writer of agent positions and the occupancy overlay during a step.
pub struct MovementEngine<'a> {
    agents: &'a mut AgentRegistry,
    occupancy: &'a mut OccupancyMap,
}

impl<'a> MovementEngine<'a> {
    pub fn new(agents: &'a mut AgentRegistry, occupancy: &'a mut OccupancyMap) -> Self {
        Self { agents, occupancy }
    }

    /// Try to move one agent. Illegal moves are absorbed as a stay.
    ///
    /// Returns `None` when no agent with this id exists.
    pub fn move_agent(&mut self, id: AgentId, action: Action) -> Option<MoveOutcome> {
        let agent = self.agents.get_mut(id)?;

        if agent.done {
            return Some(MoveOutcome::NoOpAlreadyDone);
        }
        if action == Action::Stay {
            return Some(MoveOutcome::Stayed);
        }

        let current = agent.position;
        let target = current.offset(action);

        if !self.occupancy.is_in_bounds(target) {
            tracing::debug!("Agent {} {} from {} rejected: out of bounds", id, action, current);
            return Some(MoveOutcome::RejectedOutOfBounds);
        }
        if !self.occupancy.is_free(target) {
            tracing::debug!("Agent {} {} from {} rejected: {} blocked", id, action, current, target);
            return Some(MoveOutcome::RejectedBlocked);
        }

        // Position and overlay are written together so they never disagree
        self.occupancy.move_agent(current, target);
        agent.position = target;
        agent.done = agent.on_goal();

        tracing::debug!("Agent {} {} {} -> {} (done: {})", id, action, current, target, agent.done);
        Some(MoveOutcome::Applied)
    }

    /// Apply a whole tick in increasing id order, whatever the map's iteration order.
    ///
    /// Each legality check sees the overlay as already updated by lower ids,
    /// so a lower id wins a contested cell.
    pub fn apply(&mut self, actions: &HashMap<AgentId, Action>) -> BTreeMap<AgentId, MoveOutcome> {
        for id in actions.keys() {
            if !self.agents.contains(*id) {
                tracing::warn!("Ignoring action for unknown agent {}", id);
            }
        }

        let mut outcomes = BTreeMap::new();
        for id in self.agents.ids() {
            let action = actions.get(&id).copied().unwrap_or(Action::Stay);
            if let Some(outcome) = self.move_agent(id, action) {
                outcomes.insert(id, outcome);
            }
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{Color, Position};
    use crate::state::{AgentSpec, ObstacleGrid};

    fn setup(rows: &[&str], specs: &[AgentSpec]) -> (AgentRegistry, OccupancyMap) {
        let grid = ObstacleGrid::from_rows(rows).unwrap();
        let agents = AgentRegistry::new(specs, &grid).unwrap();
        let occupancy = OccupancyMap::initialise(&grid, agents.starts()).unwrap();
        (agents, occupancy)
    }

    #[test]
    fn test_blocked_by_wall() {
        let (mut agents, mut occupancy) =
            setup(&["01", "00"], &[AgentSpec::new(0, (0, 0), (1, 1), Color::Red)]);
        let mut engine = MovementEngine::new(&mut agents, &mut occupancy);

        assert_eq!(engine.move_agent(0, Action::Right), Some(MoveOutcome::RejectedBlocked));
        assert_eq!(engine.move_agent(0, Action::Up), Some(MoveOutcome::RejectedOutOfBounds));
        assert_eq!(engine.move_agent(0, Action::Stay), Some(MoveOutcome::Stayed));
        assert_eq!(engine.move_agent(0, Action::Down), Some(MoveOutcome::Applied));
        assert_eq!(engine.move_agent(7, Action::Down), None);
        assert_eq!(agents.get(0).unwrap().position, Position::new(1, 0));
    }

    #[test]
    fn test_done_agent_is_frozen() {
        let (mut agents, mut occupancy) =
            setup(&["00", "00"], &[AgentSpec::new(0, (0, 0), (0, 1), Color::Red)]);
        let mut engine = MovementEngine::new(&mut agents, &mut occupancy);

        assert_eq!(engine.move_agent(0, Action::Right), Some(MoveOutcome::Applied));
        assert_eq!(engine.move_agent(0, Action::Down), Some(MoveOutcome::NoOpAlreadyDone));
        assert!(agents.is_done(0));
        assert_eq!(agents.get(0).unwrap().position, Position::new(0, 1));
        assert!(occupancy.is_occupied(Position::new(0, 1)), "done agents keep blocking their cell");
    }

    #[test]
    fn test_lower_id_claims_cell_first() {
        // Both agents want (1, 1); agent 0 is processed first and wins it
        let (mut agents, mut occupancy) = setup(
            &["000", "000"],
            &[
                AgentSpec::new(1, (1, 2), (0, 0), Color::Blue),
                AgentSpec::new(0, (1, 0), (0, 2), Color::Red),
            ],
        );
        let actions = HashMap::from([(1, Action::Left), (0, Action::Right)]);
        let outcomes = MovementEngine::new(&mut agents, &mut occupancy).apply(&actions);

        assert_eq!(outcomes[&0], MoveOutcome::Applied);
        assert_eq!(outcomes[&1], MoveOutcome::RejectedBlocked);
        assert_eq!(agents.get(0).unwrap().position, Position::new(1, 1));
        assert_eq!(agents.get(1).unwrap().position, Position::new(1, 2));
    }

    #[test]
    fn test_missing_and_unknown_actions() {
        let (mut agents, mut occupancy) = setup(
            &["000"],
            &[
                AgentSpec::new(0, (0, 0), (0, 2), Color::Red),
                AgentSpec::new(1, (0, 2), (0, 0), Color::Blue),
            ],
        );
        let actions = HashMap::from([(0, Action::Right), (9, Action::Left)]);
        let outcomes = MovementEngine::new(&mut agents, &mut occupancy).apply(&actions);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[&0], MoveOutcome::Applied);
        assert_eq!(outcomes[&1], MoveOutcome::Stayed);
        assert_eq!(occupancy.occupied_count(), 2);
    }
}
