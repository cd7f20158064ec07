//! PDF input and output

pub mod assemble;
pub mod encode;
pub mod metadata;
pub mod render;

// Re-export commonly used items
pub use assemble::DocumentAssembler;
pub use encode::{encode, EncodedPage};
pub use metadata::{count_pages, extract_metadata, PdfMetadata, ScannerMetadata};
pub use render::{PageSource, PdfiumSource, Rasterizer};
