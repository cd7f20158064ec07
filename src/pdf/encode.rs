//! Page encoding: raster to JPEG, JPEG to a single-page PDF

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, ImageReader, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Name of the page image in the page's XObject resources
const IMAGE_NAME: &str = "Im0";

/// A JPEG-compressed page image and its pixel dimensions
#[derive(Debug, Clone)]
pub struct EncodedPage {
    /// Baseline JPEG stream
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl EncodedPage {
    /// Check that `data` decodes as a JPEG of the declared size.
    pub fn validate(&self) -> Result<()> {
        let (width, height) = ImageReader::with_format(Cursor::new(&self.data), ImageFormat::Jpeg)
            .into_dimensions()
            .map_err(|e| Error::Encode(format!("corrupt JPEG stream: {}", e)))?;

        if (width, height) != (self.width, self.height) {
            return Err(Error::Encode(format!(
                "JPEG is {}x{} but page declares {}x{}",
                width, height, self.width, self.height
            )));
        }
        Ok(())
    }

    /// Wrap the image in a one-page document.
    ///
    /// The page's MediaBox is the image's pixel size in points and the image
    /// fills it edge to edge.
    pub fn into_document(self) -> Result<Document> {
        let (width, height) = (self.width as i64, self.height as i64);
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            self.data,
        )
        .with_compression(false);
        let image_id = doc.add_object(image);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![width.into(), 0.into(), 0.into(), height.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_NAME => image_id,
                },
            },
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(doc)
    }
}

/// Compress a raster as JPEG at `quality` (1-100).
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn encode(image: &RgbImage, quality: u8) -> Result<EncodedPage> {
    let mut data = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut data, quality);
    image
        .write_with_encoder(encoder)
        .map_err(|e| Error::Encode(format!("JPEG encoding failed: {}", e)))?;

    debug!(bytes = data.len(), quality, "Page encoded");
    Ok(EncodedPage {
        data,
        width: image.width(),
        height: image.height(),
    })
}
