//! Shape-fill primitives over normalized tile coordinates
//!
//! Shapes are described as predicates over `(x, y)` in `[0, 1]`, sampled at
//! pixel centres. Tiles are drawn oversized and then box-averaged down.

use super::image::{CHANNELS, RgbImage};

/// Highlight blend toward white
const HIGHLIGHT_ALPHA: f32 = 0.30;

/// Paint every pixel whose centre satisfies `shape`.
pub fn fill_coords<F>(img: &mut RgbImage, shape: F, color: [u8; 3])
where
    F: Fn(f32, f32) -> bool,
{
    let (width, height) = (img.width(), img.height());
    for y in 0..height {
        for x in 0..width {
            let yf = (y as f32 + 0.5) / height as f32;
            let xf = (x as f32 + 0.5) / width as f32;
            if shape(xf, yf) {
                img.set_pixel(x, y, color);
            }
        }
    }
}

pub fn point_in_rect(x_min: f32, x_max: f32, y_min: f32, y_max: f32) -> impl Fn(f32, f32) -> bool {
    move |x, y| x >= x_min && x <= x_max && y >= y_min && y <= y_max
}

pub fn point_in_circle(cx: f32, cy: f32, r: f32) -> impl Fn(f32, f32) -> bool {
    move |x, y| (x - cx) * (x - cx) + (y - cy) * (y - cy) <= r * r
}

/// Blend every pixel 30% toward white
pub fn highlight(img: &mut RgbImage) {
    let (width, height) = (img.width(), img.height());
    for y in 0..height {
        for x in 0..width {
            let px = img.pixel(x, y);
            let blended = px.map(|c| {
                let c = c as f32;
                (c + HIGHLIGHT_ALPHA * (255.0 - c)).clamp(0.0, 255.0) as u8
            });
            img.set_pixel(x, y, blended);
        }
    }
}

/// Average `factor` x `factor` blocks into one pixel (truncating integer mean).
///
/// # Panics
///
/// Panics if the image dimensions are not multiples of `factor`.
pub fn downsample(img: &RgbImage, factor: u32) -> RgbImage {
    assert!(factor > 0, "downsample factor must be positive");
    assert!(
        img.width() % factor == 0 && img.height() % factor == 0,
        "{}x{} image is not divisible by {}",
        img.width(),
        img.height(),
        factor
    );
    if factor == 1 {
        return img.clone();
    }

    let (width, height) = (img.width() / factor, img.height() / factor);
    let block = factor * factor;
    let mut out = RgbImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut sum = [0u32; CHANNELS];
            for dy in 0..factor {
                for dx in 0..factor {
                    let px = img.pixel(x * factor + dx, y * factor + dy);
                    for (acc, c) in sum.iter_mut().zip(px) {
                        *acc += c as u32;
                    }
                }
            }
            out.set_pixel(x, y, sum.map(|s| (s / block) as u8));
        }
    }
    out
}
