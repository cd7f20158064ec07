//! Output document assembly using lopdf

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tempfile::NamedTempFile;
use tracing::{info, instrument};

use crate::error::Result;
use crate::pdf::encode::EncodedPage;
use crate::pdf::metadata::ScannerMetadata;

/// Builds the scanned output one page at a time
///
/// Each page arrives as a one-page document; its objects are renumbered into
/// a shared object table the same way `lopdf`'s merge example stitches
/// documents together. Nothing touches the filesystem until [`write`].
///
/// [`write`]: DocumentAssembler::write
#[derive(Debug)]
pub struct DocumentAssembler {
    objects: BTreeMap<ObjectId, Object>,
    page_ids: Vec<ObjectId>,
    max_id: u32,
    metadata: Option<ScannerMetadata>,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentAssembler {
    /// Empty document
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            page_ids: Vec::new(),
            max_id: 1,
            metadata: None,
        }
    }

    /// Pages appended so far
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Metadata that will be written, if attached
    pub fn metadata(&self) -> Option<&ScannerMetadata> {
        self.metadata.as_ref()
    }

    /// Append a full-page image as the next page.
    ///
    /// Fails with an encode error if the JPEG stream is corrupt or does not
    /// match its declared size.
    pub fn new_page(&mut self, page: EncodedPage) -> Result<()> {
        page.validate()?;
        let mut doc = page.into_document()?;

        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(self.max_id);
        self.max_id = doc.max_id + 1;

        let page_id = doc
            .get_pages()
            .into_values()
            .next()
            .ok_or_else(|| crate::Error::General("encoded page has no page object".to_string()))?;

        // The per-page Catalog and Pages nodes are replaced at write time
        for (id, object) in doc.objects {
            if !is_tree_node(&object) {
                self.objects.insert(id, object);
            }
        }
        self.page_ids.push(page_id);

        Ok(())
    }

    /// Set the document Info dictionary. A later call replaces an earlier one.
    pub fn attach_metadata(&mut self, metadata: ScannerMetadata) {
        self.metadata = Some(metadata);
    }

    /// Build the final lopdf document without writing it
    pub fn build(self) -> Document {
        let mut doc = Document::with_version("1.5");
        doc.objects.extend(self.objects);

        // Keep new_object_id() above every object we just added
        doc.max_id = self.max_id - 1;

        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|&id| Object::Reference(id))
            .collect();

        let mut pages_object = Dictionary::new();
        pages_object.set("Type", Object::Name(b"Pages".to_vec()));
        pages_object.set("Count", Object::Integer(self.page_ids.len() as i64));
        pages_object.set("Kids", Object::Array(kids));

        let catalog_id = doc.new_object_id();
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));

        doc.objects.insert(catalog_id, Object::Dictionary(catalog));
        doc.objects.insert(pages_id, Object::Dictionary(pages_object));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        // Point every page at the new page tree
        for &page_id in &self.page_ids {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }

        if let Some(metadata) = &self.metadata {
            let info_id = doc.add_object(metadata.to_info_dictionary());
            doc.trailer.set("Info", Object::Reference(info_id));
        }

        doc.compress();
        doc
    }

    /// Serialize the document to `path` in one shot.
    ///
    /// Bytes go to a temporary file next to `path` which is renamed into
    /// place only after a complete write, so a failure leaves `path` as it was.
    #[instrument(skip(self), fields(path = %path.display(), pages = self.page_count()))]
    pub fn write(self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut doc = self.build();
        let mut temp = NamedTempFile::new_in(dir)?;
        doc.save_to(&mut temp)?;
        temp.flush()?;
        temp.persist(path).map_err(|e| e.error)?;

        info!("Output written");
        Ok(())
    }
}

fn is_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type").and_then(Object::as_name),
            Ok(b"Catalog") | Ok(b"Pages")
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::encode::encode;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn page(width: u32, height: u32) -> EncodedPage {
        encode(&RgbImage::from_pixel(width, height, Rgb([200, 200, 200])), 80).expect("encode")
    }

    fn media_box(doc: &Document, id: ObjectId) -> Vec<i64> {
        let dict = doc.get_dictionary(id).expect("page");
        dict.get(b"MediaBox")
            .and_then(Object::as_array)
            .expect("MediaBox")
            .iter()
            .map(|o| o.as_i64().expect("int"))
            .collect()
    }

    #[test]
    fn test_pages_kept_in_order() {
        let mut assembler = DocumentAssembler::new();
        assembler.new_page(page(10, 20)).expect("page 1");
        assembler.new_page(page(30, 40)).expect("page 2");
        assembler.new_page(page(50, 60)).expect("page 3");
        assert_eq!(assembler.page_count(), 3);

        let doc = assembler.build();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 3);

        let boxes: Vec<Vec<i64>> = pages.values().map(|&id| media_box(&doc, id)).collect();
        assert_eq!(
            boxes,
            vec![vec![0, 0, 10, 20], vec![0, 0, 30, 40], vec![0, 0, 50, 60]]
        );
    }

    #[test]
    fn test_single_catalog() {
        let mut assembler = DocumentAssembler::new();
        assembler.new_page(page(10, 10)).expect("page 1");
        assembler.new_page(page(10, 10)).expect("page 2");
        let doc = assembler.build();

        let catalogs = doc.objects.values().filter(|o| match o {
            Object::Dictionary(d) => {
                matches!(d.get(b"Type").and_then(Object::as_name), Ok(b"Catalog"))
            }
            _ => false,
        });
        assert_eq!(catalogs.count(), 1);
        assert_eq!(doc.objects.values().filter(|o| is_tree_node(o)).count(), 2);
    }

    #[test]
    fn test_corrupt_page_rejected() {
        let mut assembler = DocumentAssembler::new();
        let result = assembler.new_page(EncodedPage {
            data: b"not a jpeg".to_vec(),
            width: 4,
            height: 4,
        });
        assert!(matches!(result, Err(crate::Error::Encode(_))));
        assert_eq!(assembler.page_count(), 0);
    }

    #[test]
    fn test_write_round_trip_with_metadata() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let output_path = temp_dir.path().join("out.pdf");

        let mut assembler = DocumentAssembler::new();
        assembler.new_page(page(12, 16)).expect("page");
        assembler.attach_metadata(ScannerMetadata::synthesize("Unit Scanner"));
        assembler.write(&output_path).expect("write");

        let doc = Document::load(&output_path).expect("load");
        assert_eq!(doc.get_pages().len(), 1);

        let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).expect("Info");
        let info = doc.get_dictionary(info_id).expect("Info dict");
        let producer = info.get(b"Producer").and_then(Object::as_str).expect("Producer");
        assert_eq!(producer, b"Unit Scanner Software 3.12.4");
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let output_path = temp_dir.path().join("no-such-dir").join("out.pdf");

        let mut assembler = DocumentAssembler::new();
        assembler.new_page(page(8, 8)).expect("page");
        let result = assembler.write(&output_path);
        assert!(matches!(result, Err(crate::Error::Io(_))));
        assert!(!output_path.exists());
    }
}
