#[cfg(test)]
mod qr_tests {
    use informes_server::qr::{encode, QrStyle};

    #[test]
    fn test_encode_produces_png() {
        let png = encode("http://localhost/informes/x", &QrStyle::default())
            .expect("encoding should succeed");

        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let style = QrStyle::default();
        let a = encode("http://localhost/a|http://localhost/b", &style).unwrap();
        let b = encode("http://localhost/a|http://localhost/b", &style).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_style_options_pass_through_to_image() {
        let style = QrStyle {
            dark: [10, 20, 30],
            light: [240, 240, 240],
            margin: 4,
            scale: 3,
        };
        let png = encode("payload", &style).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgb8();

        // Square, sized in whole modules, quiet zone painted in the light color.
        assert_eq!(img.width(), img.height());
        assert_eq!(img.width() % style.scale, 0);
        assert_eq!(img.get_pixel(0, 0).0, style.light);
    }

    #[test]
    fn test_roundtrip_decodes_pipe_joined_urls() {
        let view_url = "http://localhost:8080/informes/f1e2d3c4";
        let pdf_url = "http://localhost:8080/uploads/informes/f1e2d3c4/informe.pdf";
        let payload = format!("{}|{}", view_url, pdf_url);

        let png = encode(&payload, &QrStyle::default()).unwrap();
        let luma = image::load_from_memory(&png).unwrap().to_luma8();

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            luma.width() as usize,
            luma.height() as usize,
            |x, y| luma.get_pixel(x as u32, y as u32).0[0],
        );
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1);

        let (_meta, content) = grids[0].decode().expect("QR should decode");
        assert_eq!(content, payload);
    }
}
