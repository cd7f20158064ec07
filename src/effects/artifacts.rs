//! Scanner noise and paper fold marks

use image::{Rgb, RgbImage};
use rand::Rng;

use super::blend;

/// Weight of the noise layer when blended onto the page
const NOISE_OPACITY: f32 = 0.1;

/// Brightest speckle painted into the noise layer
const NOISE_MAX_LEVEL: u8 = 50;

/// Perpendicular wobble of a fold line, in pixels
const FOLD_JITTER: i64 = 2;

/// Gray range of fold pixels
const FOLD_INTENSITY: std::ops::RangeInclusive<u8> = 150..=230;

/// Blend sparse dark speckles onto the page.
///
/// Pixels on the even-coordinate grid each get a speckle with probability
/// `factor`%; the speckle layer (black elsewhere) is mixed in at 10%.
pub fn add_noise<R: Rng + ?Sized>(image: &RgbImage, factor: u8, rng: &mut R) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut noise = RgbImage::new(width, height);

    for x in (0..width).step_by(2) {
        for y in (0..height).step_by(2) {
            if rng.gen_range(0..100u32) < factor as u32 {
                let level = rng.gen_range(0..=NOISE_MAX_LEVEL);
                noise.put_pixel(x, y, Rgb([level, level, level]));
            }
        }
    }

    blend(image, &noise, NOISE_OPACITY)
}

/// Draw `count` crease lines onto the page in place.
///
/// Each pass picks a horizontal or vertical line somewhere in the middle half
/// of the page and walks it in steps of 2, painting light gray points with a
/// small perpendicular jitter. Points jittered off the canvas are dropped.
pub fn add_fold_marks<R: Rng + ?Sized>(image: &mut RgbImage, count: u32, rng: &mut R) {
    let (width, height) = image.dimensions();

    for _ in 0..count {
        let horizontal = rng.gen_bool(0.5);
        let (along, across) = if horizontal { (width, height) } else { (height, width) };
        let line = rng.gen_range(across / 4..=3 * across / 4) as i64;

        for step in (0..along).step_by(2) {
            let offset = line + rng.gen_range(-FOLD_JITTER..=FOLD_JITTER);
            let intensity = rng.gen_range(FOLD_INTENSITY);
            if offset < 0 || offset >= across as i64 {
                continue;
            }
            let (x, y) = if horizontal {
                (step, offset as u32)
            } else {
                (offset as u32, step)
            };
            image.put_pixel(x, y, Rgb([intensity, intensity, intensity]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn changed_pixels(a: &RgbImage, b: &RgbImage) -> usize {
        a.pixels().zip(b.pixels()).filter(|(p, q)| p != q).count()
    }

    #[test]
    fn test_noise_only_on_even_grid() {
        let white = RgbImage::from_pixel(40, 30, Rgb([255, 255, 255]));
        let mut rng = StdRng::seed_from_u64(5);
        let noisy = add_noise(&white, 100, &mut rng);
        assert_eq!(noisy.dimensions(), white.dimensions());

        // Unsampled pixels only see the 10% blend toward black.
        let base = noisy.get_pixel(1, 1).0[0];
        for (x, y, pixel) in noisy.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            assert!(r == g && g == b);
            if x % 2 == 1 || y % 2 == 1 {
                assert_eq!(r, base);
            } else {
                assert!(r >= base && r <= base + 6, "pixel ({x},{y}) = {r}");
            }
        }
    }

    #[test]
    fn test_noise_hit_rate_follows_factor() {
        let black = RgbImage::new(200, 200);
        let mut rng = StdRng::seed_from_u64(31);
        let noisy = add_noise(&black, 10, &mut rng);

        // 10_000 grid samples, 10% hit; levels 0..=4 round back to black at 10%.
        let expected = 10_000.0 * 0.10 * 46.0 / 51.0;
        let changed = changed_pixels(&black, &noisy) as f64;
        assert!(
            (changed - expected).abs() < 150.0,
            "changed = {changed}, expected about {expected:.0}"
        );
        assert!(noisy
            .enumerate_pixels()
            .all(|(x, y, p)| (x % 2 == 0 && y % 2 == 0) || p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_noise_factor_zero_is_uniform_dimming() {
        let image = RgbImage::from_pixel(10, 10, Rgb([100, 100, 100]));
        let mut rng = StdRng::seed_from_u64(5);
        let out = add_noise(&image, 0, &mut rng);
        assert!(out.pixels().all(|p| p.0 == [90, 90, 90]));
    }

    #[test]
    fn test_single_fold_pass_paints_one_line() {
        let black = RgbImage::new(200, 200);
        let mut folded = black.clone();
        let mut rng = StdRng::seed_from_u64(17);
        add_fold_marks(&mut folded, 1, &mut rng);

        // 100 steps along a 200px side, every one inside the canvas.
        assert_eq!(changed_pixels(&black, &folded), 100);
        for pixel in folded.pixels().filter(|p| p.0 != [0, 0, 0]) {
            assert!(FOLD_INTENSITY.contains(&pixel.0[0]));
        }
    }

    #[test]
    fn test_fold_count_scales_marks() {
        let black = RgbImage::new(200, 200);
        let mut once = black.clone();
        let mut thrice = black.clone();
        add_fold_marks(&mut once, 1, &mut StdRng::seed_from_u64(23));
        add_fold_marks(&mut thrice, 3, &mut StdRng::seed_from_u64(23));

        let single = changed_pixels(&black, &once);
        let triple = changed_pixels(&black, &thrice);
        assert!(triple > 2 * single, "triple = {triple}, single = {single}");
        assert!(triple <= 3 * single);
    }

    #[test]
    fn test_zero_folds_leave_image_alone() {
        let image = RgbImage::from_pixel(20, 20, Rgb([10, 20, 30]));
        let mut out = image.clone();
        add_fold_marks(&mut out, 0, &mut StdRng::seed_from_u64(1));
        assert_eq!(out, image);
    }

    #[test]
    fn test_fold_lines_stay_in_middle_half() {
        let black = RgbImage::new(100, 100);
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            let mut folded = black.clone();
            add_fold_marks(&mut folded, 1, &mut rng);
            for (x, y, pixel) in folded.enumerate_pixels() {
                if pixel.0 != [0, 0, 0] {
                    // One coordinate is the walked axis, the other the jittered line.
                    let near_middle = |v: u32| (23..=77).contains(&v);
                    assert!(near_middle(x) || near_middle(y), "({x},{y})");
                }
            }
        }
    }
}
