//! Scan effect configuration

use std::path::PathBuf;

use crate::effects::Stage;

/// Scanner name stamped into metadata when none is given
pub const DEFAULT_SCANNER_NAME: &str = "HP ScanJet Pro 3000";

/// Options controlling which effects run and how the output is encoded
///
/// Each effect stage reads only its own subset of fields. Values are not
/// range-checked here; out-of-range input surfaces as a renderer or codec
/// failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Rasterization resolution (72-300)
    pub dpi: u32,
    /// Apply a small random rotation
    pub rotate: bool,
    /// Rotation angle is drawn from [-max, +max] degrees
    pub max_rotation_degrees: f32,
    /// Desaturate to gray
    pub grayscale: bool,
    /// Binarize at `black_and_white_threshold`
    pub black_and_white: bool,
    /// Luminance at or above this becomes white
    pub black_and_white_threshold: u8,
    /// Sprinkle scanner noise
    pub add_noise: bool,
    /// Percentage of sampled pixels that receive noise
    pub noise_factor: u8,
    /// Draw paper crease lines
    pub fold_marks: bool,
    /// Number of independent fold passes
    pub fold_count: u32,
    /// Darken the page edges
    pub add_shadow: bool,
    /// Gaussian blur radius; 0 disables blurring
    pub blur_radius: f32,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Device name used in the synthesized metadata
    pub scanner_name: String,
    /// Seed for the random source; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            rotate: true,
            max_rotation_degrees: 1.5,
            grayscale: true,
            black_and_white: false,
            black_and_white_threshold: 200,
            add_noise: true,
            noise_factor: 10,
            fold_marks: true,
            fold_count: 1,
            add_shadow: true,
            blur_radius: 0.5,
            jpeg_quality: 85,
            scanner_name: DEFAULT_SCANNER_NAME.to_string(),
            seed: None,
        }
    }
}

impl ScanConfig {
    /// A configuration with every effect switched off.
    ///
    /// Pages are only rasterized and re-encoded.
    pub fn plain() -> Self {
        Self {
            rotate: false,
            grayscale: false,
            black_and_white: false,
            add_noise: false,
            fold_marks: false,
            add_shadow: false,
            blur_radius: 0.0,
            ..Self::default()
        }
    }

    /// Ordered list of the enabled effect stages.
    ///
    /// The order is fixed: rotate, grayscale, threshold, noise, fold, shadow,
    /// blur. Disabled stages are left out entirely.
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::new();

        if self.rotate {
            stages.push(Stage::Rotate {
                max_degrees: self.max_rotation_degrees,
            });
        }
        if self.grayscale {
            stages.push(Stage::Grayscale);
        }
        if self.black_and_white {
            stages.push(Stage::Threshold {
                level: self.black_and_white_threshold,
            });
        }
        if self.add_noise {
            stages.push(Stage::Noise {
                factor: self.noise_factor,
            });
        }
        if self.fold_marks {
            stages.push(Stage::Fold {
                count: self.fold_count,
            });
        }
        if self.add_shadow {
            stages.push(Stage::Shadow);
        }
        if self.blur_radius > 0.0 {
            stages.push(Stage::Blur {
                radius: self.blur_radius,
            });
        }

        stages
    }
}

/// One conversion run: where to read, where to write, and how
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Source PDF
    pub input_path: PathBuf,
    /// Destination PDF
    pub output_path: PathBuf,
    /// Effect and encoding settings
    pub config: ScanConfig,
}
