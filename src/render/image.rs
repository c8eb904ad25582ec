/// Row-major 8-bit RGB pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RgbImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

pub const CHANNELS: usize = 3;

impl RgbImage {
    /// Black image
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0])
    }

    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = self.offset(x, y);
        [self.data[offset], self.data[offset + 1], self.data[offset + 2]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        let offset = self.offset(x, y);
        self.data[offset..offset + CHANNELS].copy_from_slice(&color);
    }

    /// Copy `src` into this image with its top-left corner at (`x`, `y`).
    /// Parts falling outside this image are clipped.
    pub fn blit(&mut self, src: &RgbImage, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let copy_width = src.width.min(self.width - x) as usize;
        let copy_height = src.height.min(self.height - y);

        for row in 0..copy_height {
            let src_start = src.offset(0, row);
            let dst_start = self.offset(x, y + row);
            let len = copy_width * CHANNELS;
            self.data[dst_start..dst_start + len]
                .copy_from_slice(&src.data[src_start..src_start + len]);
        }
    }

    /// RGBA copy with an opaque alpha channel, as GPU textures expect
    pub fn to_rgba(&self) -> Vec<u8> {
        self.data
            .chunks_exact(CHANNELS)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect()
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width, "x={x} out of bounds (width={})", self.width);
        assert!(y < self.height, "y={y} out of bounds (height={})", self.height);
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}
