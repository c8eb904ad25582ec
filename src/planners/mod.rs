mod random;
mod scripted;

use std::collections::HashMap;

use crate::infra::{Action, AgentId};
use crate::sim::Observation;

pub use random::RandomPolicy;
pub use scripted::ScriptedPolicy;

/// Chooses one action per agent from the current observation
pub trait Policy {
    fn name(&self) -> &str;

    fn act(&mut self, observation: &Observation) -> HashMap<AgentId, Action>;
}
