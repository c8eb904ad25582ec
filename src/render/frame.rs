use crate::infra::Position;
use crate::state::{AgentRegistry, Cell, ObstacleGrid};

use super::image::{CHANNELS, RgbImage};
use super::tile::{TileContent, TileRenderer};

/// Per-cell highlight flags, `rows x cols`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightMask {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl HighlightMask {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    pub fn set(&mut self, pos: Position, highlighted: bool) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = highlighted;
        }
    }

    pub fn get(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|idx| self.cells[idx])
    }

    fn index(&self, pos: Position) -> Option<usize> {
        let in_bounds = pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.rows
            && (pos.col as usize) < self.cols;
        in_bounds.then(|| pos.row as usize * self.cols + pos.col as usize)
    }
}

/// Composites tiles into one full-frame image per call.
#[derive(Debug)]
pub struct FrameCompositor {
    tiles: TileRenderer,
    tile_size: u32,
}

impl FrameCompositor {
    pub fn new(tile_size: u32) -> Self {
        Self::with_renderer(TileRenderer::default(), tile_size)
    }

    pub fn with_renderer(tiles: TileRenderer, tile_size: u32) -> Self {
        Self { tiles, tile_size }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn tiles(&self) -> &TileRenderer {
        &self.tiles
    }

    /// Pixel size of a full frame for `grid`, or `None` if the frame or a
    /// supersampled tile does not fit in memory-addressable sizes.
    pub fn frame_dimensions(&self, grid: &ObstacleGrid) -> Option<(u32, u32)> {
        let supersampled = self.tile_size.checked_mul(self.tiles.subdivisions())?;
        (supersampled as usize)
            .checked_mul(supersampled as usize)?
            .checked_mul(CHANNELS)?;

        let width = u32::try_from(grid.cols()).ok()?.checked_mul(self.tile_size)?;
        let height = u32::try_from(grid.rows()).ok()?.checked_mul(self.tile_size)?;
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(CHANNELS)?;
        Some((width, height))
    }

    /// Draw terrain, then goals, then agents so an agent covers its own goal marker.
    pub fn render_frame(
        &mut self,
        grid: &ObstacleGrid,
        agents: &AgentRegistry,
        highlight: Option<&HighlightMask>,
    ) -> RgbImage {
        let Some((width, height)) = self.frame_dimensions(grid) else {
            tracing::warn!(
                "Frame for a {}x{} grid at tile size {} does not fit, skipping",
                grid.rows(),
                grid.cols(),
                self.tile_size
            );
            return RgbImage::new(0, 0);
        };
        let mut frame = RgbImage::new(width, height);

        for (pos, cell) in grid.iter() {
            let content = match cell {
                Cell::Wall => TileContent::Wall,
                Cell::Free => TileContent::Empty,
            };
            let highlighted = highlight.is_some_and(|mask| mask.get(pos));
            let tile = self.tiles.render_tile(content, self.tile_size, highlighted);
            self.paste(&mut frame, &tile, pos);
        }

        for agent in agents.iter() {
            let tile = self
                .tiles
                .render_tile(TileContent::Goal(agent.color), self.tile_size, false);
            self.paste(&mut frame, &tile, agent.goal);
        }

        for agent in agents.iter() {
            let tile = self
                .tiles
                .render_tile(TileContent::Agent(agent.color), self.tile_size, false);
            self.paste(&mut frame, &tile, agent.position);
        }

        frame
    }

    fn paste(&self, frame: &mut RgbImage, tile: &RgbImage, pos: Position) {
        frame.blit(
            tile,
            pos.col as u32 * self.tile_size,
            pos.row as u32 * self.tile_size,
        );
    }
}
