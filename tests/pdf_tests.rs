#[cfg(test)]
mod pdf_tests {
    use chrono::Utc;
    use image::ImageEncoder;
    use informes_server::pdf::{render_report_pdf, AssetImage, RenderOptions, ReportAssets};
    use informes_server::qr::QrStyle;
    use informes_server::report::models::{Report, ReportStatus};
    use uuid::Uuid;

    fn sample_report() -> Report {
        let now = Utc::now();
        Report {
            id: Uuid::new_v4(),
            numero: "INF-2025-0042".to_string(),
            tecnico: "Carlos Mendoza".to_string(),
            cliente: "Ferretería El Tornillo".to_string(),
            telefono: "0991234567".to_string(),
            tipo_equipo: "Compresor industrial".to_string(),
            tipo_servicio: "Mantenimiento preventivo".to_string(),
            diagnostico: "Filtro de aire saturado, presión de salida por debajo del rango nominal"
                .to_string(),
            trabajo_realizado: "Cambio de filtro, limpieza general y calibración del presostato"
                .to_string(),
            observaciones: String::new(),
            status: ReportStatus::Pending,
            firma_tecnico: None,
            firma_cliente: None,
            fotos: vec![],
            anexos: vec![],
            pdf: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn options() -> RenderOptions<'static> {
        RenderOptions {
            app_name: "Informes de Servicio",
            view_url: "http://localhost:8080/informes/x",
            pdf_url: "http://localhost:8080/uploads/informes/x/informe.pdf",
            qr_style: QrStyle::default(),
        }
    }

    fn png_photo() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(8, 6, image::Rgb([180, 40, 40]));
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(img.as_raw(), 8, 6, image::ColorType::Rgb8)
            .expect("png encoding should succeed");
        out
    }

    fn transparent_signature() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(10, 4, image::Rgba([0, 0, 0, 0]));
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(img.as_raw(), 10, 4, image::ColorType::Rgba8)
            .expect("png encoding should succeed");
        out
    }

    #[test]
    fn test_zero_photos_renders_without_error() {
        let rendered = render_report_pdf(&sample_report(), ReportAssets::default(), &options())
            .expect("render should succeed");

        assert!(rendered.bytes.starts_with(b"%PDF"));
        // Only assets can be skipped, and there were none.
        assert!(rendered.skipped.is_empty());
    }

    #[test]
    fn test_photos_and_signatures_are_embedded() {
        let assets = ReportAssets {
            fotos: vec![
                AssetImage::Loaded {
                    name: "fotos/00.png".to_string(),
                    bytes: png_photo(),
                },
                AssetImage::Loaded {
                    name: "fotos/01.png".to_string(),
                    bytes: png_photo(),
                },
            ],
            firma_tecnico: Some(AssetImage::Loaded {
                name: "firma_tecnico.png".to_string(),
                bytes: transparent_signature(),
            }),
            firma_cliente: None,
        };

        let rendered =
            render_report_pdf(&sample_report(), assets, &options()).expect("render should succeed");

        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert!(rendered.skipped.is_empty());
        // With images the document grows well past the text-only baseline.
        let baseline = render_report_pdf(&sample_report(), ReportAssets::default(), &options())
            .unwrap()
            .bytes;
        assert!(rendered.bytes.len() > baseline.len());
    }

    #[test]
    fn test_unresolvable_photo_is_skipped_not_fatal() {
        let assets = ReportAssets {
            fotos: vec![
                AssetImage::Skipped {
                    name: "fotos/00_missing.jpg".to_string(),
                    reason: "storage request failed with status 404".to_string(),
                },
                AssetImage::Loaded {
                    name: "fotos/01.png".to_string(),
                    bytes: png_photo(),
                },
            ],
            ..Default::default()
        };

        let rendered =
            render_report_pdf(&sample_report(), assets, &options()).expect("render should succeed");

        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.skipped.len(), 1);
        assert_eq!(rendered.skipped[0].name, "fotos/00_missing.jpg");
        assert!(rendered.skipped[0].reason.contains("404"));
    }

    #[test]
    fn test_undecodable_photo_is_skipped_not_fatal() {
        let assets = ReportAssets {
            fotos: vec![AssetImage::Loaded {
                name: "fotos/00_corrupt.jpg".to_string(),
                bytes: b"this is not an image".to_vec(),
            }],
            ..Default::default()
        };

        let rendered =
            render_report_pdf(&sample_report(), assets, &options()).expect("render should succeed");

        assert_eq!(rendered.skipped.len(), 1);
        assert_eq!(rendered.skipped[0].name, "fotos/00_corrupt.jpg");
    }

    #[test]
    fn test_many_photos_paginate_into_more_pages() {
        let one_photo = ReportAssets {
            fotos: vec![AssetImage::Loaded {
                name: "f".to_string(),
                bytes: png_photo(),
            }],
            ..Default::default()
        };
        let many_photos = ReportAssets {
            fotos: (0..24)
                .map(|i| AssetImage::Loaded {
                    name: format!("f{}", i),
                    bytes: png_photo(),
                })
                .collect(),
            ..Default::default()
        };

        let small = render_report_pdf(&sample_report(), one_photo, &options()).unwrap();
        let large = render_report_pdf(&sample_report(), many_photos, &options()).unwrap();

        assert!(page_count(&large.bytes) > page_count(&small.bytes));
    }

    #[test]
    fn test_long_text_fields_render_as_wrapped_paragraphs() {
        let mut report = sample_report();
        report.observaciones = "Revisión completa del equipo. ".repeat(120);

        let rendered = render_report_pdf(&report, ReportAssets::default(), &options())
            .expect("render should succeed");

        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert!(page_count(&rendered.bytes) >= 2);
    }

    fn page_count(bytes: &[u8]) -> usize {
        let doc = lopdf::Document::load_mem(bytes).expect("generated PDF should parse");
        doc.get_pages().len()
    }
}
