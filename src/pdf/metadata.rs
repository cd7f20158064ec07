//! Scanner metadata synthesis and PDF metadata read-back

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Local};
use lopdf::{decode_text_string, text_string, Dictionary, Document, Object};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Version string appended to the producer
pub const SOFTWARE_VERSION: &str = "3.12.4";

/// Companion application named in the metadata
pub const SCANNING_APPLICATION: &str = "HP Smart";

/// Info dictionary record that makes a PDF look like scanner output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerMetadata {
    pub creator: String,
    pub producer: String,
    /// PDF date string, `D:YYYYMMDDHHmmSS`
    pub creation_date: String,
    pub mod_date: String,
    pub scanner: String,
    pub scanning_application: String,
    /// `YYYY-MM-DD`
    pub scan_date: String,
    /// `HH:MM:SS`
    pub scan_time: String,
    pub uuid: String,
}

impl ScannerMetadata {
    /// Metadata for a scan made now, with a fresh random identifier.
    pub fn synthesize(scanner_name: &str) -> Self {
        Self::synthesize_at(scanner_name, Local::now(), Uuid::new_v4())
    }

    /// Metadata for a scan made at `now` with identifier `id`.
    pub fn synthesize_at(scanner_name: &str, now: DateTime<Local>, id: Uuid) -> Self {
        let pdf_date = now.format("D:%Y%m%d%H%M%S").to_string();
        Self {
            creator: scanner_name.to_string(),
            producer: format!("{} Software {}", scanner_name, SOFTWARE_VERSION),
            creation_date: pdf_date.clone(),
            mod_date: pdf_date,
            scanner: scanner_name.to_string(),
            scanning_application: SCANNING_APPLICATION.to_string(),
            scan_date: now.format("%Y-%m-%d").to_string(),
            scan_time: now.format("%H:%M:%S").to_string(),
            uuid: id.to_string(),
        }
    }

    /// Info dictionary key/value pairs, in a fixed order
    pub fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("Creator", self.creator.as_str()),
            ("Producer", self.producer.as_str()),
            ("CreationDate", self.creation_date.as_str()),
            ("ModDate", self.mod_date.as_str()),
            ("Scanner", self.scanner.as_str()),
            ("ScanningApplication", self.scanning_application.as_str()),
            ("ScanDate", self.scan_date.as_str()),
            ("ScanTime", self.scan_time.as_str()),
            ("UUID", self.uuid.as_str()),
        ]
    }

    /// Build the document Info dictionary
    pub fn to_info_dictionary(&self) -> Dictionary {
        let mut info = Dictionary::new();
        for (key, value) in self.entries() {
            info.set(key, text_string(value));
        }
        info
    }
}

/// Count pages by reading the Count field from the Pages dictionary
/// This is more reliable than get_pages() which doesn't handle nested page trees
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| Error::General("No Root reference in trailer".to_string()))?;

    let catalog = doc.get_dictionary(catalog_id)?;

    let pages_id = catalog
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| Error::General("No Pages reference in catalog".to_string()))?;

    let pages = doc.get_dictionary(pages_id)?;

    match pages.get(b"Count") {
        Ok(Object::Integer(n)) => usize::try_from(*n)
            .map_err(|_| Error::General(format!("Invalid page count {} in Pages", n))),
        Ok(_) => Err(Error::General("Count is not an integer".to_string())),
        Err(_) => Err(Error::General("No Count in Pages".to_string())),
    }
}

/// Metadata read back from an existing PDF
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Every string entry of the Info dictionary
    pub info: BTreeMap<String, String>,
}

impl PdfMetadata {
    /// Look up one Info entry, e.g. `"Producer"`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.info.get(key).map(String::as_str)
    }
}

/// Extract page count and Info dictionary from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    let mut info = BTreeMap::new();
    if let Ok(info_id) = doc.trailer.get(b"Info").and_then(Object::as_reference) {
        if let Ok(info_dict) = doc.get_dictionary(info_id) {
            // Non-string entries are skipped
            for (key, value) in info_dict.iter() {
                if let Ok(text) = decode_text_string(value) {
                    info.insert(String::from_utf8_lossy(key).into_owned(), text);
                }
            }
        }
    }

    Ok(PdfMetadata { page_count, info })
}

/// Count the number of pages in a PDF file
///
/// This is a quick operation that reads the Count field from the Pages dictionary.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(page_count)
}
