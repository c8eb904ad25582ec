//! Environment and run configuration

use std::env;
use std::str::FromStr;

use crate::infra::{AgentId, Color, EnvError, EnvResult, Position};
use crate::state::{AgentSpec, MapSource};

pub const DEFAULT_TILE_SIZE: u32 = 32;
pub const DEFAULT_FPS: u32 = 10;
pub const MAX_TILE_SIZE: u32 = 1024;

/// Constructor-time environment configuration. Not re-settable after the env is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Number of agents; must match the number of agent specs
    pub num_agents: usize,
    /// One record per agent
    pub agents: Vec<AgentSpec>,
    /// Name of a built-in map
    pub map_name: Option<String>,
    /// Custom rows of `0`/`1`
    pub custom_map: Option<Vec<String>>,
    /// Accepted but not implemented: agents always stay on the grid
    pub disappear_on_goal: bool,
    /// Seed for external action generators; the engine itself is deterministic
    pub seed: Option<u64>,
    /// Frame rate hint passed to the display surface
    pub fps: u32,
    /// Tile edge in pixels
    pub tile_size: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            num_agents: 0,
            agents: Vec::new(),
            map_name: None,
            custom_map: None,
            disappear_on_goal: false,
            seed: None,
            fps: DEFAULT_FPS,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl EnvConfig {
    /// Three agents on the 8x8 map, as in the reference demo
    pub fn demo() -> Self {
        Self::default()
            .with_map_name("8x8")
            .with_agent(AgentSpec::new(0, (0, 0), (4, 0), Color::Yellow))
            .with_agent(AgentSpec::new(1, (0, 5), (4, 7), Color::Blue))
            .with_agent(AgentSpec::new(2, (1, 3), (1, 7), Color::Green))
            .with_disappear_on_goal(true)
    }

    pub fn with_map_name(mut self, name: impl Into<String>) -> Self {
        self.map_name = Some(name.into());
        self
    }

    pub fn with_custom_map<S: AsRef<str>>(mut self, rows: &[S]) -> Self {
        self.custom_map = Some(rows.iter().map(|r| r.as_ref().to_string()).collect());
        self
    }

    /// Add an agent and bump `num_agents` accordingly
    pub fn with_agent(mut self, spec: AgentSpec) -> Self {
        self.agents.push(spec);
        self.num_agents = self.agents.len();
        self
    }

    pub fn with_disappear_on_goal(mut self, disappear: bool) -> Self {
        self.disappear_on_goal = disappear;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn map_source(&self) -> EnvResult<MapSource> {
        MapSource::resolve(self.map_name.as_deref(), self.custom_map.as_deref())
    }

    /// Checks that do not need the parsed grid
    pub fn validate(&self) -> EnvResult<()> {
        if self.agents.is_empty() {
            return Err(EnvError::configuration("at least one agent must be configured"));
        }
        if self.num_agents != self.agents.len() {
            return Err(EnvError::configuration(format!(
                "num_agents is {} but {} agents are configured",
                self.num_agents,
                self.agents.len()
            )));
        }
        if self.tile_size == 0 || self.tile_size > MAX_TILE_SIZE {
            return Err(EnvError::configuration(format!(
                "tile_size is {}, expected 1..={}",
                self.tile_size, MAX_TILE_SIZE
            )));
        }
        if self.fps == 0 {
            return Err(EnvError::configuration("fps must be positive"));
        }
        Ok(())
    }

    /// Read the configuration from `MAGE_*` environment variables.
    ///
    /// Unset variables fall back to [`EnvConfig::demo`].
    pub fn from_env() -> EnvResult<Self> {
        let mut config = Self::demo();

        let map_name = env::var("MAGE_MAP").ok();
        let custom_map = env::var("MAGE_CUSTOM_MAP").ok();
        if map_name.is_some() || custom_map.is_some() {
            config.map_name = map_name;
            config.custom_map = custom_map
                .map(|rows| rows.split(',').map(|r| r.trim().to_string()).collect());
        }

        if let Ok(agents) = env::var("MAGE_AGENTS") {
            config.agents = parse_agents(&agents)?;
            config.num_agents = config.agents.len();
        }
        if let Some(seed) = env_var_parsed::<u64>("MAGE_SEED")? {
            config.seed = Some(seed);
        }
        if let Some(fps) = env_var_parsed::<u32>("MAGE_FPS")? {
            config.fps = fps;
        }
        if let Some(tile_size) = env_var_parsed::<u32>("MAGE_TILE_SIZE")? {
            config.tile_size = tile_size;
        }
        if let Some(disappear) = env_var_parsed::<bool>("MAGE_DISAPPEAR_ON_GOAL")? {
            config.disappear_on_goal = disappear;
        }

        Ok(config)
    }
}

/// Settings of the demo driver loop, outside the environment itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub max_steps: usize,
    pub visualizer: bool,
    pub log_folder: Option<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_steps: 500,
            visualizer: false,
            log_folder: None,
        }
    }
}

impl RunSettings {
    pub fn from_env() -> EnvResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_steps: env_var_parsed("MAGE_MAX_STEPS")?.unwrap_or(defaults.max_steps),
            visualizer: env_var_parsed("MAGE_VISUALIZER")?.unwrap_or(defaults.visualizer),
            log_folder: env::var("MAGE_LOG_FOLDER").ok(),
        })
    }
}

fn env_var_parsed<T: FromStr>(key: &str) -> EnvResult<Option<T>> {
    match env::var(key) {
        Ok(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            EnvError::configuration(format!("{} has an invalid value '{}'", key, value))
        }),
        Err(_) => Ok(None),
    }
}

/// Parse `id:row,col>row,col:color` entries separated by `;`.
pub fn parse_agents(text: &str) -> EnvResult<Vec<AgentSpec>> {
    text.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_agent)
        .collect()
}

fn parse_agent(entry: &str) -> EnvResult<AgentSpec> {
    let invalid = || EnvError::configuration(format!("invalid agent entry '{}'", entry));

    let mut parts = entry.split(':');
    let (Some(id), Some(route), Some(color), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let id: AgentId = id.trim().parse().map_err(|_| invalid())?;
    let (start, goal) = route.split_once('>').ok_or_else(invalid)?;
    let start = parse_position(start).ok_or_else(invalid)?;
    let goal = parse_position(goal).ok_or_else(invalid)?;
    let color = Color::from_str(color)?;

    Ok(AgentSpec::new(id, start, goal, color))
}

fn parse_position(text: &str) -> Option<Position> {
    let (row, col) = text.split_once(',')?;
    Some(Position::new(row.trim().parse().ok()?, col.trim().parse().ok()?))
}
