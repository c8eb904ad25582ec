pub mod infra;
pub mod planners;
pub mod render;
pub mod sim;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use infra::{Action, AgentId, Color, EnvError, EnvResult, Position};
pub use sim::{EnvConfig, MultiAgentEnv, Observation};
pub use state::AgentSpec;
