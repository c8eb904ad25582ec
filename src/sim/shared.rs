use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::infra::{Action, AgentId, EnvResult};
use crate::render::RgbImage;

use super::env::{MultiAgentEnv, Observation};

/// Environment handle for several callers.
///
/// Legality checks and occupancy writes are not atomic as a pair, so every
/// call takes the one lock guarding the whole environment.
#[derive(Clone)]
pub struct SharedEnv {
    inner: Arc<Mutex<MultiAgentEnv>>,
}

impl SharedEnv {
    pub fn new(env: MultiAgentEnv) -> Self {
        Self {
            inner: Arc::new(Mutex::new(env)),
        }
    }

    pub fn reset(&self) -> EnvResult<Observation> {
        self.lock().reset()
    }

    pub fn step(&self, actions: &HashMap<AgentId, Action>) -> Observation {
        self.lock().step(actions)
    }

    pub fn render(&self, mode: &str, caption: Option<&str>) -> EnvResult<RgbImage> {
        self.lock().render(mode, caption)
    }

    /// Run `f` with exclusive access to the environment
    pub fn with<R>(&self, f: impl FnOnce(&mut MultiAgentEnv) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, MultiAgentEnv> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EnvConfig;
    use std::thread;

    #[test]
    fn test_concurrent_steps_keep_occupancy_consistent() {
        let shared = SharedEnv::new(MultiAgentEnv::new(EnvConfig::demo()).unwrap());
        shared.reset().unwrap();

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let env = shared.clone();
                thread::spawn(move || {
                    for t in 0..25 {
                        let actions: HashMap<AgentId, Action> = (0..3)
                            .map(|id| (id, Action::from_index((worker + t + id) % 5).unwrap_or(Action::Stay)))
                            .collect();
                        env.step(&actions);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        shared.with(|env| {
            assert_eq!(env.tick(), 100);
            assert_eq!(env.occupancy().occupied_count(), 3);
            assert_eq!(env.occupancy().occupied_walls(), 0);
        });
        assert_eq!(shared.render("rgb_array", None).unwrap().width(), 8 * 32);
    }
}
