use std::collections::{BTreeMap, HashMap};

use crate::infra::{Action, AgentId};
use crate::sim::{MoveOutcome, MultiAgentEnv, Observation};

/// Result of one driven episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeSummary {
    /// Steps actually taken
    pub steps: usize,
    /// Every agent reached its goal
    pub all_done: bool,
}

/// Trait for observing episode events during a run
pub trait EpisodeObserver {
    /// Called after the environment has been reset
    fn on_reset(&mut self, env: &MultiAgentEnv, observation: &Observation);

    /// Called once actions for a tick are chosen, before they are applied
    fn on_actions_selected(
        &mut self,
        _tick: usize,
        _observation: &Observation,
        _actions: &HashMap<AgentId, Action>,
    ) {
        // Default implementation does nothing
    }

    /// Called after every step
    fn on_step(
        &mut self,
        _env: &MultiAgentEnv,
        _observation: &Observation,
        _outcomes: &BTreeMap<AgentId, MoveOutcome>,
    ) {
        // Default implementation does nothing
    }

    /// Called when the episode ends, either all agents done or step budget exhausted
    fn on_episode_end(&mut self, summary: &EpisodeSummary);
}

pub struct CompositeObserver {
    observers: Vec<Box<dyn EpisodeObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Box<dyn EpisodeObserver>>) -> Self {
        Self { observers }
    }
}

impl EpisodeObserver for CompositeObserver {
    fn on_reset(&mut self, env: &MultiAgentEnv, observation: &Observation) {
        for observer in &mut self.observers {
            observer.on_reset(env, observation);
        }
    }

    fn on_actions_selected(
        &mut self,
        tick: usize,
        observation: &Observation,
        actions: &HashMap<AgentId, Action>,
    ) {
        for observer in &mut self.observers {
            observer.on_actions_selected(tick, observation, actions);
        }
    }

    fn on_step(
        &mut self,
        env: &MultiAgentEnv,
        observation: &Observation,
        outcomes: &BTreeMap<AgentId, MoveOutcome>,
    ) {
        for observer in &mut self.observers {
            observer.on_step(env, observation, outcomes);
        }
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) {
        for observer in &mut self.observers {
            observer.on_episode_end(summary);
        }
    }
}

/// Two observers side by side, keeping both concrete types retrievable after a run
impl<A: EpisodeObserver, B: EpisodeObserver> EpisodeObserver for (A, B) {
    fn on_reset(&mut self, env: &MultiAgentEnv, observation: &Observation) {
        self.0.on_reset(env, observation);
        self.1.on_reset(env, observation);
    }

    fn on_actions_selected(
        &mut self,
        tick: usize,
        observation: &Observation,
        actions: &HashMap<AgentId, Action>,
    ) {
        self.0.on_actions_selected(tick, observation, actions);
        self.1.on_actions_selected(tick, observation, actions);
    }

    fn on_step(
        &mut self,
        env: &MultiAgentEnv,
        observation: &Observation,
        outcomes: &BTreeMap<AgentId, MoveOutcome>,
    ) {
        self.0.on_step(env, observation, outcomes);
        self.1.on_step(env, observation, outcomes);
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) {
        self.0.on_episode_end(summary);
        self.1.on_episode_end(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct CountingObserver {
        ends: Arc<Mutex<usize>>,
    }

    impl EpisodeObserver for CountingObserver {
        fn on_reset(&mut self, _env: &MultiAgentEnv, _observation: &Observation) {}

        fn on_episode_end(&mut self, _summary: &EpisodeSummary) {
            *self.ends.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_composite_and_pair_forward_to_all() {
        let ends = Arc::new(Mutex::new(0));
        let counter = || CountingObserver { ends: Arc::clone(&ends) };
        let summary = EpisodeSummary {
            steps: 3,
            all_done: true,
        };

        let mut composite = CompositeObserver::new(vec![Box::new(counter()), Box::new(counter())]);
        composite.on_episode_end(&summary);
        assert_eq!(*ends.lock().unwrap(), 2);

        let mut pair = (counter(), counter());
        pair.on_episode_end(&summary);
        assert_eq!(*ends.lock().unwrap(), 4);
    }
}
