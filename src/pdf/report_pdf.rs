//! Fixed document layout for a service report.
//!
//! Single deterministic pass: header block, labeled text fields, photo grid,
//! signatures, QR footer. Image problems degrade to omissions; only PDF
//! object assembly itself can fail.

use super::composer::{FontKind, PageComposer, MARGIN, PAGE_WIDTH};
use super::images::{embed_image, EmbeddedImage};
use super::{AssetImage, RenderError, RenderedReport, SkippedAsset};
use crate::qr::{self, QrStyle};
use crate::report::models::Report;

/// Photo cell size in the grid, points.
const PHOTO_W: f32 = 160.0;
const PHOTO_H: f32 = 120.0;
const PHOTO_GAP: f32 = 12.0;

/// Signature box size, points.
const SIGNATURE_W: f32 = 150.0;
const SIGNATURE_H: f32 = 60.0;

/// QR footprint in the bottom-right corner of the final page, points.
const QR_SIZE: f32 = 80.0;

pub struct RenderOptions<'a> {
    pub app_name: &'a str,
    pub view_url: &'a str,
    pub pdf_url: &'a str,
    pub qr_style: QrStyle,
}

/// Asset byte sources resolved by the orchestration layer before rendering.
#[derive(Debug, Default)]
pub struct ReportAssets {
    pub fotos: Vec<AssetImage>,
    pub firma_tecnico: Option<AssetImage>,
    pub firma_cliente: Option<AssetImage>,
}

/// Compose the full document for one report.
pub fn render_report_pdf(
    report: &Report,
    assets: ReportAssets,
    opts: &RenderOptions<'_>,
) -> Result<RenderedReport, RenderError> {
    let mut composer = PageComposer::new();
    let mut skipped: Vec<SkippedAsset> = Vec::new();

    // Header block.
    composer.text_line(FontKind::Bold, 18.0, opts.app_name);
    composer.text_line(
        FontKind::Bold,
        12.0,
        &format!("Informe de servicio N° {}", report.numero),
    );
    composer.text_line(
        FontKind::Regular,
        10.0,
        &format!("Fecha: {}", report.created_at.format("%d/%m/%Y %H:%M")),
    );
    composer.text_line(FontKind::Regular, 10.0, &format!("Técnico: {}", report.tecnico));
    composer.text_line(FontKind::Regular, 10.0, &format!("Teléfono: {}", report.telefono));
    composer.text_line(FontKind::Regular, 10.0, &format!("Cliente: {}", report.cliente));
    composer.separator();

    // Labeled fields in fixed order.
    for (label, value) in [
        ("Tipo de equipo", &report.tipo_equipo),
        ("Tipo de servicio", &report.tipo_servicio),
        ("Diagnóstico", &report.diagnostico),
        ("Trabajo realizado", &report.trabajo_realizado),
        ("Observaciones", &report.observaciones),
    ] {
        composer.labeled_paragraph(label, value, 10.0);
    }

    // Photo grid. Zero photos skips the whole section.
    let mut loaded_photos: Vec<EmbeddedImage> = Vec::new();
    for foto in assets.fotos {
        match foto {
            AssetImage::Loaded { name, bytes } => {
                match embed_image(composer.document_mut(), &bytes) {
                    Ok(embedded) => loaded_photos.push(embedded),
                    Err(e) => skipped.push(SkippedAsset {
                        name,
                        reason: e.to_string(),
                    }),
                }
            }
            AssetImage::Skipped { name, reason } => {
                skipped.push(SkippedAsset { name, reason });
            }
        }
    }

    if !loaded_photos.is_empty() {
        composer.separator();
        composer.text_line(FontKind::Bold, 12.0, "Fotos");
        composer.advance(6.0);

        let mut x = MARGIN;
        composer.ensure_space(PHOTO_H + PHOTO_GAP);
        composer.advance(PHOTO_H);
        for embedded in loaded_photos {
            if x + PHOTO_W > PAGE_WIDTH - MARGIN {
                // Wrap to the next row, paginating when the row would cross
                // the bottom margin.
                x = MARGIN;
                composer.ensure_space(PHOTO_H + PHOTO_GAP);
                composer.advance(PHOTO_H + PHOTO_GAP);
            }
            let (w, h) = embedded.fit(PHOTO_W, PHOTO_H);
            composer.place_image(embedded, x, composer.cursor_y(), w, h);
            x += PHOTO_W + PHOTO_GAP;
        }
        composer.advance(PHOTO_GAP);
    }

    // Signatures: technician fixed left, client fixed right, captioned,
    // independently optional.
    let firma_tecnico = resolve_signature(&mut composer, assets.firma_tecnico, &mut skipped);
    let firma_cliente = resolve_signature(&mut composer, assets.firma_cliente, &mut skipped);

    if firma_tecnico.is_some() || firma_cliente.is_some() {
        composer.separator();
        composer.ensure_space(SIGNATURE_H + 30.0);
        composer.advance(SIGNATURE_H);
        let y = composer.cursor_y();
        let right_x = PAGE_WIDTH - MARGIN - SIGNATURE_W;

        if let Some(embedded) = firma_tecnico {
            let (w, h) = embedded.fit(SIGNATURE_W, SIGNATURE_H);
            composer.place_image(embedded, MARGIN, y, w, h);
            composer.text_at(FontKind::Regular, 9.0, MARGIN, y - 12.0, "Firma del técnico");
        }
        if let Some(embedded) = firma_cliente {
            let (w, h) = embedded.fit(SIGNATURE_W, SIGNATURE_H);
            composer.place_image(embedded, right_x, y, w, h);
            composer.text_at(FontKind::Regular, 9.0, right_x, y - 12.0, "Firma del cliente");
        }
        composer.advance(20.0);
    }

    // QR footer, attempted last; failure never aborts the document.
    let qr_payload = format!("{}|{}", opts.view_url, opts.pdf_url);
    match qr::encode(&qr_payload, &opts.qr_style) {
        Ok(png) => match embed_image(composer.document_mut(), &png) {
            Ok(embedded) => {
                let x = PAGE_WIDTH - MARGIN - QR_SIZE;
                composer.place_image(embedded, x, MARGIN, QR_SIZE, QR_SIZE);
                composer.text_at(FontKind::Regular, 8.0, x, MARGIN - 10.0, "Ver informe en línea");
            }
            Err(e) => {
                log::warn!("QR image could not be embedded: {}", e);
                skipped.push(SkippedAsset {
                    name: "qr".to_string(),
                    reason: e.to_string(),
                });
            }
        },
        Err(e) => {
            log::warn!("QR generation failed: {}", e);
            skipped.push(SkippedAsset {
                name: "qr".to_string(),
                reason: e.to_string(),
            });
        }
    }

    let bytes = composer.finish()?;
    Ok(RenderedReport { bytes, skipped })
}

fn resolve_signature(
    composer: &mut PageComposer,
    asset: Option<AssetImage>,
    skipped: &mut Vec<SkippedAsset>,
) -> Option<EmbeddedImage> {
    match asset? {
        AssetImage::Loaded { name, bytes } => match embed_image(composer.document_mut(), &bytes) {
            Ok(embedded) => Some(embedded),
            Err(e) => {
                skipped.push(SkippedAsset {
                    name,
                    reason: e.to_string(),
                });
                None
            }
        },
        AssetImage::Skipped { name, reason } => {
            skipped.push(SkippedAsset { name, reason });
            None
        }
    }
}
