//! Edge shadow and blur

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::filter::gaussian_blur_f32;
use imageproc::rect::Rect;

use super::blend;

/// Shadow band width as a fraction of the shorter side
const EDGE_FRACTION: f32 = 0.03;

/// Darkening of the outermost ring (255 minus this is its gray level)
const EDGE_DARKNESS: u32 = 200;

/// Weight of the shadow layer when blended onto the page
const SHADOW_OPACITY: f32 = 0.3;

/// Width in pixels of the darkened border band for an image of this size.
pub fn edge_width(width: u32, height: u32) -> u32 {
    (width.min(height) as f32 * EDGE_FRACTION).round() as u32
}

/// Darken the page borders like light falling off at the scanner lid.
///
/// Nested rectangle outlines go from dark at the outer edge to white at the
/// inner edge of the band; the layer is blurred and mixed in at 30%.
pub fn add_edge_shadow(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let band = edge_width(width, height);
    if band == 0 {
        return image.clone();
    }

    let mut shadow = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for i in 0..band {
        let opacity = EDGE_DARKNESS * (band - i) / band;
        let level = (255 - opacity) as u8;
        let rect = Rect::at(i as i32, i as i32).of_size(width - 2 * i, height - 2 * i);
        draw_hollow_rect_mut(&mut shadow, rect, Rgb([level, level, level]));
    }

    let shadow = gaussian_blur_f32(&shadow, band as f32 / 2.0);
    blend(image, &shadow, SHADOW_OPACITY)
}

/// Gaussian blur with the given radius; a radius of 0 or less is a no-op.
pub fn blur(image: &RgbImage, radius: f32) -> RgbImage {
    if radius > 0.0 {
        gaussian_blur_f32(image, radius)
    } else {
        image.clone()
    }
}
