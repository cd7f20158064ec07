//! Grayscale and black-and-white conversion
//!
//! Both stages keep the 3-channel pixel format so later stages see a uniform
//! buffer.

use image::{Rgb, RgbImage};

/// BT.601 luma of an RGB pixel, rounded to the nearest integer.
pub fn luminance(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    let weighted = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((weighted + 500) / 1000) as u8
}

/// Replace each pixel with its luminance on all three channels.
pub fn grayscale(image: &RgbImage) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let l = luminance(pixel);
        *pixel = Rgb([l, l, l]);
    }
    out
}

/// Binarize on luminance: below `level` is black, everything else white.
pub fn threshold(image: &RgbImage, level: u8) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let v = if luminance(pixel) < level { 0 } else { 255 };
        *pixel = Rgb([v, v, v]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RgbImage {
        RgbImage::from_fn(16, 16, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, ((x * y) % 256) as u8])
        })
    }

    #[test]
    fn test_luminance_reference_values() {
        assert_eq!(luminance(&Rgb([0, 0, 0])), 0);
        assert_eq!(luminance(&Rgb([255, 255, 255])), 255);
        assert_eq!(luminance(&Rgb([255, 0, 0])), 76);
        assert_eq!(luminance(&Rgb([0, 255, 0])), 150);
        assert_eq!(luminance(&Rgb([0, 0, 255])), 29);
        assert_eq!(luminance(&Rgb([90, 90, 90])), 90);
    }

    #[test]
    fn test_grayscale_channels_equal_luminance() {
        let source = sample();
        let gray = grayscale(&source);
        assert_eq!(gray.dimensions(), source.dimensions());
        for (src, out) in source.pixels().zip(gray.pixels()) {
            let [r, g, b] = out.0;
            assert_eq!(r, g);
            assert_eq!(g, b);
            assert_eq!(r, luminance(src));
        }
    }

    #[test]
    fn test_threshold_is_binary() {
        let source = sample();
        let level = 100;
        let bw = threshold(&source, level);
        for (src, out) in source.pixels().zip(bw.pixels()) {
            let expected = if luminance(src) >= level { 255 } else { 0 };
            assert_eq!(out.0, [expected, expected, expected]);
        }
    }

    #[test]
    fn test_threshold_boundary_maps_to_white() {
        let image = RgbImage::from_pixel(1, 1, Rgb([200, 200, 200]));
        assert_eq!(threshold(&image, 200).get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(threshold(&image, 201).get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_threshold_zero_is_all_white() {
        let bw = threshold(&sample(), 0);
        assert!(bw.pixels().all(|p| p.0 == [255, 255, 255]));
    }
}
