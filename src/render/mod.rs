mod frame;
mod image;
mod primitives;
mod tile;

use std::str::FromStr;

use crate::infra::EnvError;

pub use frame::{FrameCompositor, HighlightMask};
pub use image::RgbImage;
pub use primitives::{downsample, fill_coords, highlight, point_in_circle, point_in_rect};
pub use tile::{DEFAULT_SUBDIVISIONS, TileContent, TileKey, TileRenderer};

/// How `render` delivers the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Push the frame to the display surface and return it
    Human,
    /// Only return the frame
    RgbArray,
}

impl FromStr for RenderMode {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(RenderMode::Human),
            "rgb_array" => Ok(RenderMode::RgbArray),
            other => Err(EnvError::UnsupportedMode {
                mode: other.to_string(),
            }),
        }
    }
}
