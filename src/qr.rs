//! QR code generation for the document footer.
//!
//! Encoding is deterministic for identical input and style, so the same
//! report always produces the same footer image.

use image::ImageEncoder;
use qrcode::QrCode;

/// Style options passed through to the rasterizer unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct QrStyle {
    /// RGB of the dark modules.
    pub dark: [u8; 3],
    /// RGB of the light modules and quiet zone.
    pub light: [u8; 3],
    /// Quiet-zone width in modules.
    pub margin: u32,
    /// Pixels per module.
    pub scale: u32,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            dark: [0, 0, 0],
            light: [255, 255, 255],
            margin: 2,
            scale: 6,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("QR image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Encode `text` into a PNG image using the given style.
pub fn encode(text: &str, style: &QrStyle) -> Result<Vec<u8>, QrError> {
    let code = QrCode::new(text.as_bytes())?;
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let scale = style.scale.max(1);
    let size = (modules + 2 * style.margin) * scale;
    let mut img = image::RgbImage::from_pixel(size, size, image::Rgb(style.light));

    for (i, color) in colors.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let mx = (i as u32 % modules + style.margin) * scale;
        let my = (i as u32 / modules + style.margin) * scale;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(mx + dx, my + dy, image::Rgb(style.dark));
            }
        }
    }

    let mut out = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut out);
    encoder.write_image(img.as_raw(), size, size, image::ColorType::Rgb8)?;

    Ok(out)
}
