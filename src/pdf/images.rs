//! Raster images as PDF XObjects.
//!
//! Every image (photo, signature, QR code) takes the same path: decode with
//! the `image` crate, re-encode as a FlateDecode RGB stream, and carry the
//! alpha channel as a DeviceGray soft mask when the source has one. Uniform
//! treatment keeps placement independent of the upload format.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::GenericImageView;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

#[derive(Debug, thiserror::Error)]
pub enum ImageEmbedError {
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image compression failed: {0}")]
    Compress(#[from] std::io::Error),
}

/// An image registered in the document, ready to be referenced from a
/// content stream.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedImage {
    pub object_id: ObjectId,
    pub width: u32,
    pub height: u32,
}

impl EmbeddedImage {
    /// Scale to fit inside a `max_w` × `max_h` box, preserving aspect ratio.
    pub fn fit(&self, max_w: f32, max_h: f32) -> (f32, f32) {
        let ratio = (max_w / self.width as f32).min(max_h / self.height as f32);
        (self.width as f32 * ratio, self.height as f32 * ratio)
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decode raw upload bytes and add them to the document as an image XObject.
pub fn embed_image(doc: &mut Document, bytes: &[u8]) -> Result<EmbeddedImage, ImageEmbedError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    let rgba = img.to_rgba8();

    let mut rgb_buf = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha_buf = Vec::with_capacity((width * height) as usize);
    let mut has_alpha = false;

    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb_buf.extend_from_slice(&[r, g, b]);
        alpha_buf.push(a);
        if a != 255 {
            has_alpha = true;
        }
    }

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };

    // Fully opaque images skip the soft mask; signature PNGs drawn on a
    // transparent canvas keep theirs.
    if has_alpha {
        let smask_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(&alpha_buf)?,
        ));
        image_dict.set("SMask", Object::Reference(smask_id));
    }

    let object_id = doc.add_object(Stream::new(image_dict, deflate(&rgb_buf)?));

    Ok(EmbeddedImage {
        object_id,
        width,
        height,
    })
}
