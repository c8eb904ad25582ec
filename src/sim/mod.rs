mod config;
mod env;
mod movement;
mod runner;
mod shared;

pub use config::{DEFAULT_FPS, DEFAULT_TILE_SIZE, EnvConfig, MAX_TILE_SIZE, RunSettings, parse_agents};
pub use env::{AgentInfo, MultiAgentEnv, Observation};
pub use movement::{MoveOutcome, MovementEngine};
pub use runner::EpisodeRunner;
pub use shared::SharedEnv;
