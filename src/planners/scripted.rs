use std::collections::HashMap;

use crate::infra::{Action, AgentId};
use crate::sim::Observation;

use super::Policy;

/// Replays a recorded action sequence, then keeps every agent in place.
pub struct ScriptedPolicy {
    script: Vec<HashMap<AgentId, Action>>,
    cursor: usize,
}

impl ScriptedPolicy {
    pub fn new(script: Vec<HashMap<AgentId, Action>>) -> Self {
        Self { script, cursor: 0 }
    }

    /// Single-agent script from a list of moves
    pub fn for_agent(id: AgentId, actions: &[Action]) -> Self {
        Self::new(
            actions
                .iter()
                .map(|action| HashMap::from([(id, *action)]))
                .collect(),
        )
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.script.len()
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

impl Policy for ScriptedPolicy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn act(&mut self, observation: &Observation) -> HashMap<AgentId, Action> {
        match self.script.get(self.cursor) {
            Some(actions) => {
                self.cursor += 1;
                actions.clone()
            }
            None => observation
                .positions
                .keys()
                .map(|id| (*id, Action::Stay))
                .collect(),
        }
    }
}
