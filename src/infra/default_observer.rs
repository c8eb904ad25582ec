use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::infra::{AgentId, EpisodeObserver, EpisodeSummary};
use crate::sim::{MoveOutcome, MultiAgentEnv, Observation};

/// Logs episode progress through `tracing`.
pub struct DefaultObserver;

impl EpisodeObserver for DefaultObserver {
    fn on_reset(&mut self, env: &MultiAgentEnv, observation: &Observation) {
        info!("Episode started");
        info!("- map size: {}x{}", env.grid().rows(), env.grid().cols());
        info!("- agents: {}", observation.positions.len());
        if let Some(seed) = env.config().seed {
            info!("- seed: {}", seed);
        }
        debug!("\n{}", env.draw_ascii_map());
    }

    fn on_step(
        &mut self,
        env: &MultiAgentEnv,
        observation: &Observation,
        outcomes: &BTreeMap<AgentId, MoveOutcome>,
    ) {
        let moved = outcomes.values().filter(|o| o.is_applied()).count();
        let done = observation.dones.values().filter(|d| **d).count();
        debug!(
            "tick: {}, moved: {}/{}, done: {}/{}",
            env.tick(),
            moved,
            outcomes.len(),
            done,
            observation.dones.len()
        );
        debug!("\n{}", env.draw_ascii_map());
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) {
        if summary.all_done {
            info!("...all agents are done at time step {}", summary.steps);
        } else {
            info!("Episode stopped after {} steps without all agents done", summary.steps);
        }
    }
}
