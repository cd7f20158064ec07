//! PDF Scanify Library
//!
//! Turns a digitally produced PDF into one that looks like a scan of a
//! paper original. This library provides functionality to:
//! - Rasterize PDF pages at a chosen DPI
//! - Apply scan effects (rotation jitter, grayscale, threshold, noise,
//!   fold marks, edge shadow, blur) in a fixed order
//! - Re-encode pages as JPEG and assemble them into a new PDF
//! - Stamp plausible scanner metadata onto the result
//!
//! # Example
//!
//! ```no_run
//! use pdf_scanify::{scan_pdf, ScanConfig, ScanOptions};
//! use std::path::PathBuf;
//!
//! let options = ScanOptions {
//!     input_path: PathBuf::from("invoice.pdf"),
//!     output_path: PathBuf::from("invoice_scanned.pdf"),
//!     config: ScanConfig {
//!         scanner_name: "Canon DR-C225".to_string(),
//!         ..ScanConfig::default()
//!     },
//! };
//!
//! scan_pdf(&options).expect("Failed to scan PDF");
//! ```

pub mod config;
pub mod effects;
pub mod error;
pub mod pdf;
pub mod pipeline;

// Re-export commonly used items
pub use config::{ScanConfig, ScanOptions};
pub use effects::Stage;
pub use error::{Error, Result};
pub use pipeline::{scan_pdf, CancelToken, Pipeline, ProgressCallback, ScanReport, SilentProgress};
