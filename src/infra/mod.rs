mod default_observer;
mod episode_observer;
mod error;
mod trajectory;
mod types;

pub use default_observer::DefaultObserver;
pub use episode_observer::{CompositeObserver, EpisodeObserver, EpisodeSummary};
pub use error::{EnvError, EnvResult};
pub use trajectory::{TrajectoryEntry, TrajectoryRecorder};
pub use types::{Action, AgentId, Color, Position};
