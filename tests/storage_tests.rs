#[cfg(test)]
mod storage_tests {
    use informes_server::config::SupabaseConfig;
    use informes_server::storage::{content_type_for, AssetStore, LocalStorage, SupabaseStorage};

    #[tokio::test]
    async fn test_local_storage_store_then_fetch_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:8080");

        let stored = storage
            .store("informes/abc/fotos/00_test.jpg", b"fake jpeg", "image/jpeg")
            .await
            .expect("store should succeed");

        assert_eq!(stored.reference, "informes/abc/fotos/00_test.jpg");
        let fetched = storage.fetch(&stored.reference).await.expect("fetch should succeed");
        assert_eq!(fetched, b"fake jpeg");
    }

    #[tokio::test]
    async fn test_local_storage_store_is_idempotent_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:8080");

        storage.store("a/b.txt", b"first", "text/plain").await.unwrap();
        storage.store("a/b.txt", b"second", "text/plain").await.unwrap();

        let fetched = storage.fetch("a/b.txt").await.unwrap();
        assert_eq!(fetched, b"second");
    }

    #[tokio::test]
    async fn test_local_storage_fetch_missing_reference_fails() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:8080");

        assert!(storage.fetch("never/stored.png").await.is_err());
    }

    #[test]
    fn test_local_storage_public_url() {
        let storage = LocalStorage::new("/tmp/public", "http://example.com/");
        assert_eq!(
            storage.public_url("informes/x/informe.pdf"),
            "http://example.com/uploads/informes/x/informe.pdf"
        );
    }

    #[tokio::test]
    async fn test_local_storage_reference_cannot_escape_uploads_tree() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:8080");

        storage.store("../escape.txt", b"x", "text/plain").await.unwrap();

        // The file must land inside the uploads tree, not beside it.
        assert!(!dir.path().join("escape.txt").exists());
        assert!(dir.path().join("uploads").join("escape.txt").exists());
    }

    #[test]
    fn test_supabase_storage_public_url() {
        let config = SupabaseConfig {
            supabase_url: "https://test.supabase.co".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            bucket_name: "informes-bucket".to_string(),
        };
        let storage = SupabaseStorage::new(config, reqwest::Client::new());

        assert_eq!(
            storage.public_url("informes/x/foto.jpg"),
            "https://test.supabase.co/storage/v1/object/public/informes-bucket/informes/x/foto.jpg"
        );
    }

    #[test]
    fn test_supabase_config_debug_format() {
        let config = SupabaseConfig {
            supabase_url: "https://test.supabase.co".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            bucket_name: "my-bucket".to_string(),
        };
        let debug_str = format!("{:?}", config);

        assert!(debug_str.contains("SupabaseConfig"));
        assert!(debug_str.contains("test.supabase.co"));
    }

    #[test]
    fn test_content_type_guessing() {
        assert_eq!(content_type_for("foto.jpg"), "image/jpeg");
        assert_eq!(content_type_for("firma.png"), "image/png");
        assert_eq!(content_type_for("informe.pdf"), "application/pdf");
        assert_eq!(content_type_for("misterio"), "application/octet-stream");
    }
}
