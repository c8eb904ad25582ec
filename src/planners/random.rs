use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::infra::{Action, AgentId};
use crate::sim::Observation;

use super::Policy;

/// Uniformly random actions, reproducible when seeded
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn act(&mut self, observation: &Observation) -> HashMap<AgentId, Action> {
        observation
            .positions
            .keys()
            .map(|id| {
                let index = self.rng.random_range(0..Action::ALL.len());
                (*id, Action::ALL[index])
            })
            .collect()
    }
}
