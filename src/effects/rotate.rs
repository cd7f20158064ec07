//! Rotation jitter

use image::{imageops, Rgb, RgbImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use rand::Rng;
use tracing::debug;

/// Fill for canvas corners the rotated page no longer covers
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Rotate counter-clockwise by `degrees` with bicubic interpolation.
///
/// The canvas grows to the bounding box of the rotated page so nothing is
/// cropped. A zero angle returns the image untouched.
pub fn rotate(image: &RgbImage, degrees: f32) -> RgbImage {
    if degrees == 0.0 {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());

    let new_width = ((width as f32 * cos + height as f32 * sin).ceil() as u32).max(width);
    let new_height = ((width as f32 * sin + height as f32 * cos).ceil() as u32).max(height);

    let mut canvas = RgbImage::from_pixel(new_width, new_height, BACKGROUND);
    imageops::overlay(
        &mut canvas,
        image,
        ((new_width - width) / 2) as i64,
        ((new_height - height) / 2) as i64,
    );

    // imageproc rotates clockwise
    rotate_about_center(&canvas, -radians, Interpolation::Bicubic, BACKGROUND)
}

/// Rotate by an angle drawn uniformly from [-max_degrees, +max_degrees].
pub fn random_rotation<R: Rng + ?Sized>(image: &RgbImage, max_degrees: f32, rng: &mut R) -> RgbImage {
    let max = max_degrees.abs();
    let angle = if max > 0.0 { rng.gen_range(-max..=max) } else { 0.0 };
    debug!(angle, "Rotation angle sampled");
    rotate(image, angle)
}
