mod agents;
mod map;
mod occupancy;

pub use agents::{Agent, AgentRegistry, AgentSpec};
pub use map::{Cell, MapSource, ObstacleGrid, preset, preset_names};
pub use occupancy::OccupancyMap;
