//! Multi-agent grid environment - gym-like reset/step/render interface

use std::collections::{BTreeMap, HashMap};

use crate::infra::{Action, AgentId, EnvError, EnvResult, Position};
use crate::render::{FrameCompositor, HighlightMask, RenderMode, RgbImage};
use crate::state::{AgentRegistry, ObstacleGrid, OccupancyMap};
use crate::ui::{FrameSink, HeadlessSink};

use super::config::EnvConfig;
use super::movement::{MoveOutcome, MovementEngine};

/// Auxiliary per-agent diagnostics. Empty unless a harness fills it.
pub type AgentInfo = BTreeMap<String, String>;

/// Observation returned by `reset` and `step`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub positions: BTreeMap<AgentId, Position>,
    pub dones: BTreeMap<AgentId, bool>,
    pub infos: BTreeMap<AgentId, AgentInfo>,
}

impl Observation {
    pub fn all_done(&self) -> bool {
        self.dones.values().all(|done| *done)
    }
}

/// Deterministic multi-agent grid world.
///
/// Driven by one control loop calling `reset`, `step` and `render` in
/// sequence; wrap it in [`super::SharedEnv`] to share it between threads.
pub struct MultiAgentEnv {
    config: EnvConfig,
    grid: ObstacleGrid,
    agents: AgentRegistry,
    occupancy: OccupancyMap,
    compositor: FrameCompositor,
    sink: Option<Box<dyn FrameSink>>,
    tick: usize,
    last_outcomes: BTreeMap<AgentId, MoveOutcome>,
}

impl MultiAgentEnv {
    pub fn new(config: EnvConfig) -> EnvResult<Self> {
        config.validate()?;
        let grid = ObstacleGrid::parse(&config.map_source()?)?;
        let agents = AgentRegistry::new(&config.agents, &grid)?;
        let occupancy = OccupancyMap::initialise(&grid, agents.starts())?;

        let compositor = FrameCompositor::new(config.tile_size);
        if compositor.frame_dimensions(&grid).is_none() {
            return Err(EnvError::configuration(format!(
                "a {}x{} grid at tile size {} is too large to render",
                grid.rows(),
                grid.cols(),
                config.tile_size
            )));
        }

        if config.disappear_on_goal {
            tracing::warn!("disappear_on_goal is not implemented, agents stay on their goal");
        }
        tracing::info!(
            "Created {}x{} grid with {} walls and {} agents",
            grid.rows(),
            grid.cols(),
            grid.wall_count(),
            agents.len()
        );

        Ok(Self {
            compositor,
            config,
            grid,
            agents,
            occupancy,
            sink: None,
            tick: 0,
            last_outcomes: BTreeMap::new(),
        })
    }

    /// Put every agent back on its start and rebuild the occupancy overlay.
    pub fn reset(&mut self) -> EnvResult<Observation> {
        self.agents.reset();
        self.occupancy = OccupancyMap::initialise(&self.grid, self.agents.starts())?;
        self.tick = 0;
        self.last_outcomes.clear();

        tracing::info!("Episode reset");
        Ok(self.observation())
    }

    /// Apply one tick. Agents move in increasing id order; illegal moves are absorbed.
    pub fn step(&mut self, actions: &HashMap<AgentId, Action>) -> Observation {
        self.tick += 1;
        self.last_outcomes = MovementEngine::new(&mut self.agents, &mut self.occupancy).apply(actions);

        if self.agents.all_done() {
            tracing::info!("All agents are done at tick {}", self.tick);
        }
        self.observation()
    }

    pub fn observation(&self) -> Observation {
        Observation {
            positions: self.agents.positions(),
            dones: self.agents.dones(),
            infos: self
                .agents
                .ids()
                .into_iter()
                .map(|id| (id, AgentInfo::new()))
                .collect(),
        }
    }

    pub fn is_episode_done(&self) -> bool {
        self.agents.all_done()
    }

    /// Ticks since the last reset
    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Outcome of every agent's action in the last step
    pub fn last_outcomes(&self) -> &BTreeMap<AgentId, MoveOutcome> {
        &self.last_outcomes
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn grid(&self) -> &ObstacleGrid {
        &self.grid
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    pub fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    /// Text view of the grid: `#` wall, `.` free, `G` goal, agent ids (mod 10) on top
    pub fn draw_ascii_map(&self) -> String {
        let mut cells: Vec<Vec<char>> = (0..self.grid.rows())
            .map(|row| {
                (0..self.grid.cols())
                    .map(|col| {
                        if self.grid.is_wall(Position::new(row as i32, col as i32)) {
                            '#'
                        } else {
                            '.'
                        }
                    })
                    .collect()
            })
            .collect();

        for (_, goal) in self.agents.goals() {
            cells[goal.row as usize][goal.col as usize] = 'G';
        }
        for agent in self.agents.iter() {
            let digit = char::from_digit((agent.id % 10) as u32, 10).unwrap_or('A');
            cells[agent.position.row as usize][agent.position.col as usize] = digit;
        }

        cells
            .into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    /// Replace the display surface used by human-mode rendering
    pub fn set_sink(&mut self, sink: Box<dyn FrameSink>) {
        if let Some(mut old) = self.sink.replace(sink) {
            old.close();
        }
    }

    /// Render the current state. `mode` is `"human"` or `"rgb_array"`.
    pub fn render(&mut self, mode: &str, caption: Option<&str>) -> EnvResult<RgbImage> {
        let mode = mode.parse::<RenderMode>()?;
        Ok(self.render_with(mode, caption, None))
    }

    pub fn render_with(
        &mut self,
        mode: RenderMode,
        caption: Option<&str>,
        highlight: Option<&HighlightMask>,
    ) -> RgbImage {
        let frame = self.render_frame(highlight);

        if mode == RenderMode::Human {
            let fps = self.config.fps;
            let sink = self
                .sink
                .get_or_insert_with(|| Box::new(HeadlessSink::new()) as Box<dyn FrameSink>);
            if !sink.is_open() {
                sink.show(false);
            }
            sink.show_frame(&frame, caption, fps);
        }
        frame
    }

    pub fn render_frame(&mut self, highlight: Option<&HighlightMask>) -> RgbImage {
        self.compositor
            .render_frame(&self.grid, &self.agents, highlight)
    }

    pub fn close(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.close();
        }
    }
}

impl Drop for MultiAgentEnv {
    fn drop(&mut self) {
        self.close();
    }
}
