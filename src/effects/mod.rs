//! Page effect stages
//!
//! Each stage is a pure transform over an RGB raster. Stochastic stages draw
//! from the random source handed to [`Stage::apply`], so a seeded generator
//! reproduces a page exactly.

pub mod artifacts;
pub mod rotate;
pub mod shadow;
pub mod tone;

use image::RgbImage;
use rand::Rng;
use tracing::debug;

pub use artifacts::{add_fold_marks, add_noise};
pub use rotate::{random_rotation, rotate};
pub use shadow::{add_edge_shadow, blur};
pub use tone::{grayscale, luminance, threshold};

/// One step of the effect chain with its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    /// Rotate by an angle drawn from [-max_degrees, +max_degrees]
    Rotate { max_degrees: f32 },
    /// Desaturate to luminance
    Grayscale,
    /// Binarize: luminance below `level` is black, the rest white
    Threshold { level: u8 },
    /// Blend sparse dark speckles onto the page
    Noise { factor: u8 },
    /// Draw `count` jittered crease lines
    Fold { count: u32 },
    /// Darken the page borders
    Shadow,
    /// Gaussian blur
    Blur { radius: f32 },
}

impl Stage {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Rotate { .. } => "rotate",
            Stage::Grayscale => "grayscale",
            Stage::Threshold { .. } => "threshold",
            Stage::Noise { .. } => "noise",
            Stage::Fold { .. } => "fold",
            Stage::Shadow => "shadow",
            Stage::Blur { .. } => "blur",
        }
    }

    /// Whether the stage consumes randomness
    pub fn is_stochastic(&self) -> bool {
        matches!(
            self,
            Stage::Rotate { .. } | Stage::Noise { .. } | Stage::Fold { .. }
        )
    }

    /// Run this stage over `image`.
    ///
    /// The image must have non-zero width and height.
    pub fn apply<R: Rng + ?Sized>(&self, image: RgbImage, rng: &mut R) -> RgbImage {
        let (width, height) = image.dimensions();
        let out = match *self {
            Stage::Rotate { max_degrees } => random_rotation(&image, max_degrees, rng),
            Stage::Grayscale => grayscale(&image),
            Stage::Threshold { level } => threshold(&image, level),
            Stage::Noise { factor } => add_noise(&image, factor, rng),
            Stage::Fold { count } => {
                let mut image = image;
                add_fold_marks(&mut image, count, rng);
                image
            }
            Stage::Shadow => add_edge_shadow(&image),
            Stage::Blur { radius } => blur(&image, radius),
        };
        debug!(
            stage = self.name(),
            width,
            height,
            out_width = out.width(),
            out_height = out.height(),
            "Stage applied"
        );
        out
    }
}

/// Run every stage of `stages` over `image`, in order.
pub fn apply_stages<R: Rng + ?Sized>(stages: &[Stage], image: RgbImage, rng: &mut R) -> RgbImage {
    stages
        .iter()
        .fold(image, |image, stage| stage.apply(image, rng))
}

/// Per-channel weighted mix: `round(base * (1 - alpha) + overlay * alpha)`.
///
/// Both images must have the same dimensions.
pub(crate) fn blend(base: &RgbImage, overlay: &RgbImage, alpha: f32) -> RgbImage {
    let mut out = base.clone();
    for (dst, src) in out.pixels_mut().zip(overlay.pixels()) {
        for (d, s) in dst.0.iter_mut().zip(src.0.iter()) {
            let mixed = *d as f32 * (1.0 - alpha) + *s as f32 * alpha;
            *d = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
