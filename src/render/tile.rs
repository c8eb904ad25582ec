use std::collections::HashMap;
use std::sync::Arc;

use crate::infra::Color;

use super::image::RgbImage;
use super::primitives::{downsample, fill_coords, highlight, point_in_circle, point_in_rect};

pub const DEFAULT_SUBDIVISIONS: u32 = 3;

const BACKGROUND: [u8; 3] = [255, 255, 255];
const GRID_LINE: [u8; 3] = [170, 170, 170];
const GRID_LINE_WIDTH: f32 = 0.031;
const WALL_COLOR: Color = Color::Black;

/// Semantic content of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileContent {
    Empty,
    Wall,
    Goal(Color),
    Agent(Color),
}

impl TileContent {
    fn is_cacheable(&self) -> bool {
        !matches!(self, TileContent::Agent(_))
    }

    fn draw(&self, img: &mut RgbImage) {
        match self {
            TileContent::Empty => {}
            TileContent::Wall => {
                fill_coords(img, point_in_rect(0.0, 1.0, 0.0, 1.0), WALL_COLOR.rgb());
            }
            TileContent::Goal(color) => {
                // Square outline: fill the marker then punch the inside back out
                fill_coords(img, point_in_rect(0.12, 0.88, 0.12, 0.88), color.rgb());
                fill_coords(img, point_in_rect(0.22, 0.78, 0.22, 0.78), BACKGROUND);
            }
            TileContent::Agent(color) => {
                fill_coords(img, point_in_circle(0.5, 0.5, 0.31), color.rgb());
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub content: TileContent,
    pub highlight: bool,
    pub tile_size: u32,
}

/// Rasterizes cells and memoizes every non-agent tile for the renderer's lifetime.
#[derive(Debug)]
pub struct TileRenderer {
    subdivisions: u32,
    cache: HashMap<TileKey, Arc<RgbImage>>,
    render_count: usize,
}

impl Default for TileRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_SUBDIVISIONS)
    }
}

impl TileRenderer {
    pub fn new(subdivisions: u32) -> Self {
        Self {
            subdivisions: subdivisions.max(1),
            cache: HashMap::new(),
            render_count: 0,
        }
    }

    pub fn render_tile(&mut self, content: TileContent, tile_size: u32, highlighted: bool) -> Arc<RgbImage> {
        let key = TileKey {
            content,
            highlight: highlighted,
            tile_size,
        };

        if content.is_cacheable()
            && let Some(tile) = self.cache.get(&key)
        {
            return Arc::clone(tile);
        }

        let tile = Arc::new(self.rasterize(&key));
        if content.is_cacheable() {
            tracing::debug!("Caching tile {:?}", key);
            self.cache.insert(key, Arc::clone(&tile));
        }
        tile
    }

    pub fn subdivisions(&self) -> u32 {
        self.subdivisions
    }

    /// Number of tiles drawn from scratch so far
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn rasterize(&mut self, key: &TileKey) -> RgbImage {
        self.render_count += 1;

        let size = key.tile_size * self.subdivisions;
        let mut img = RgbImage::filled(size, size, BACKGROUND);

        key.content.draw(&mut img);

        if key.highlight {
            highlight(&mut img);
        }

        // Top and left guide lines separate neighbouring tiles
        fill_coords(&mut img, point_in_rect(0.0, GRID_LINE_WIDTH, 0.0, 1.0), GRID_LINE);
        fill_coords(&mut img, point_in_rect(0.0, 1.0, 0.0, GRID_LINE_WIDTH), GRID_LINE);

        downsample(&img, self.subdivisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_tiles_are_cached() {
        let mut renderer = TileRenderer::default();
        let first = renderer.render_tile(TileContent::Wall, 32, false);
        let second = renderer.render_tile(TileContent::Wall, 32, false);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(renderer.render_count(), 1);
        assert_eq!(renderer.cache_len(), 1);

        // Different size, highlight or color are distinct keys
        renderer.render_tile(TileContent::Wall, 16, false);
        renderer.render_tile(TileContent::Wall, 32, true);
        renderer.render_tile(TileContent::Goal(Color::Red), 32, false);
        renderer.render_tile(TileContent::Goal(Color::Blue), 32, false);
        assert_eq!(renderer.cache_len(), 5);
        assert_eq!(renderer.render_count(), 5);
    }

    #[test]
    fn test_agent_tiles_are_not_cached() {
        let mut renderer = TileRenderer::default();
        let first = renderer.render_tile(TileContent::Agent(Color::Red), 32, false);
        let second = renderer.render_tile(TileContent::Agent(Color::Red), 32, false);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(renderer.render_count(), 2);
        assert_eq!(renderer.cache_len(), 0);
    }

    #[test]
    fn test_tile_pixels() {
        let mut renderer = TileRenderer::default();

        let empty = renderer.render_tile(TileContent::Empty, 32, false);
        assert_eq!((empty.width(), empty.height()), (32, 32));
        assert_eq!(empty.pixel(0, 10), GRID_LINE, "left guide line");
        assert_eq!(empty.pixel(10, 0), GRID_LINE, "top guide line");
        assert_eq!(empty.pixel(16, 16), BACKGROUND);
        assert_eq!(empty.pixel(31, 31), BACKGROUND);

        let wall = renderer.render_tile(TileContent::Wall, 32, false);
        assert_eq!(wall.pixel(16, 16), [0, 0, 0]);

        let agent = renderer.render_tile(TileContent::Agent(Color::Yellow), 32, false);
        assert_eq!(agent.pixel(16, 16), [255, 255, 0]);
        assert_eq!(agent.pixel(30, 30), BACKGROUND);

        let goal = renderer.render_tile(TileContent::Goal(Color::Blue), 32, false);
        assert_eq!(goal.pixel(16, 16), BACKGROUND, "goal marker is hollow");
        assert_eq!(goal.pixel(16, 5), [0, 0, 255]);
    }

    #[test]
    fn test_highlight_lightens_wall() {
        let mut renderer = TileRenderer::default();
        let wall = renderer.render_tile(TileContent::Wall, 8, true);
        assert_eq!(wall.pixel(4, 4), [76, 76, 76]);
    }
}
