//! Episode driver - connects a policy, observers and the display to the env

use crate::infra::{EnvResult, EpisodeObserver, EpisodeSummary};
use crate::planners::Policy;
use crate::render::RenderMode;

use super::env::MultiAgentEnv;

/// Runs action-perception loops until every agent is done or the step budget runs out.
pub struct EpisodeRunner<'a, P: Policy, O: EpisodeObserver> {
    env: &'a mut MultiAgentEnv,
    policy: P,
    observer: O,
    render: bool,
}

impl<'a, P: Policy, O: EpisodeObserver> EpisodeRunner<'a, P, O> {
    pub fn new(env: &'a mut MultiAgentEnv, policy: P, observer: O) -> Self {
        Self {
            env,
            policy,
            observer,
            render: false,
        }
    }

    /// Push a human-mode frame to the env's display surface every tick
    pub fn with_rendering(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_parts(self) -> (P, O) {
        (self.policy, self.observer)
    }

    pub fn run(&mut self, max_steps: usize) -> EnvResult<EpisodeSummary> {
        tracing::info!("Running action-perception loop with {} policy", self.policy.name());

        let mut observation = self.env.reset()?;
        self.observer.on_reset(self.env, &observation);

        let mut steps = 0;
        for t in 0..max_steps {
            if self.render {
                let caption = format!("t:{}", t);
                self.env.render_with(RenderMode::Human, Some(&caption), None);
            }

            let actions = self.policy.act(&observation);
            self.observer.on_actions_selected(t, &observation, &actions);

            // The terminal observation is still handed to observers before stopping
            if observation.all_done() {
                break;
            }

            observation = self.env.step(&actions);
            steps += 1;
            self.observer
                .on_step(self.env, &observation, self.env.last_outcomes());
        }

        let summary = EpisodeSummary {
            steps,
            all_done: observation.all_done(),
        };
        self.observer.on_episode_end(&summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{Action, Color, Position, TrajectoryRecorder};
    use crate::planners::{RandomPolicy, ScriptedPolicy};
    use crate::sim::EnvConfig;
    use crate::state::AgentSpec;

    #[test]
    fn test_scripted_run_reaches_goal() {
        let config = EnvConfig::default()
            .with_map_name("4x4")
            .with_agent(AgentSpec::new(0, (0, 0), (3, 3), Color::Red));
        let mut env = MultiAgentEnv::new(config).unwrap();
        let policy = ScriptedPolicy::for_agent(
            0,
            &[
                Action::Right,
                Action::Right,
                Action::Down,
                Action::Down,
                Action::Down,
                Action::Right,
            ],
        );

        let mut runner = EpisodeRunner::new(&mut env, policy, TrajectoryRecorder::new());
        let summary = runner.run(100).unwrap();
        assert_eq!(
            summary,
            EpisodeSummary {
                steps: 6,
                all_done: true
            }
        );
        let rows = &runner.observer().history()[&0];
        assert_eq!(rows.len(), 7);
        assert!(rows[..6].iter().all(|entry| !entry.done));
        assert_eq!(rows[6].position, Position::new(3, 3));
        assert!(rows[6].done);
        assert_eq!(env.agents().get(0).unwrap().position, Position::new(3, 3));
    }

    #[test]
    fn test_step_budget_and_seeded_replay() {
        let run = |seed| {
            let mut env = MultiAgentEnv::new(EnvConfig::demo().with_tile_size(4)).unwrap();
            let mut runner = EpisodeRunner::new(&mut env, RandomPolicy::new(Some(seed)), TrajectoryRecorder::new())
                .with_rendering(true);
            let summary = runner.run(25).unwrap();
            let (_, recorder) = runner.into_parts();
            (summary, recorder.to_table())
        };

        let (summary, table) = run(7);
        assert!(summary.steps <= 25);
        assert_eq!(run(7), (summary, table));
    }
}
