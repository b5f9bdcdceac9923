#[cfg(test)]
mod repository_tests {
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use informes_server::db::{ReportRepository, SqliteRepository};
    use informes_server::report::models::{Report, ReportFilters, ReportStatus};
    use uuid::Uuid;

    async fn memory_repository() -> SqliteRepository {
        SqliteRepository::connect("sqlite::memory:")
            .await
            .expect("in-memory repository should connect")
    }

    fn sample_report(numero: &str, tecnico: &str, tipo_servicio: &str) -> Report {
        let now = Utc::now();
        Report {
            id: Uuid::new_v4(),
            numero: numero.to_string(),
            tecnico: tecnico.to_string(),
            cliente: "Cliente SA".to_string(),
            telefono: "0991234567".to_string(),
            tipo_equipo: "Compresor".to_string(),
            tipo_servicio: tipo_servicio.to_string(),
            diagnostico: "Filtro saturado".to_string(),
            trabajo_realizado: "Cambio de filtro".to_string(),
            observaciones: String::new(),
            status: ReportStatus::Pending,
            firma_tecnico: None,
            firma_cliente: None,
            fotos: vec!["http://localhost/uploads/a.jpg".to_string()],
            anexos: vec![],
            pdf: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_then_get_roundtrip() {
        let repo = memory_repository().await;
        let report = sample_report("INF-1", "Carlos", "Mantenimiento");

        repo.insert(&report).await.expect("insert should succeed");
        let fetched = repo
            .get(&report.id)
            .await
            .expect("get should succeed")
            .expect("record should exist");

        assert_eq!(fetched.id, report.id);
        assert_eq!(fetched.numero, "INF-1");
        assert_eq!(fetched.tecnico, "Carlos");
        assert_eq!(fetched.status, ReportStatus::Pending);
        assert_eq!(fetched.fotos, report.fotos);
        assert!(fetched.pdf.is_none());
    }

    #[tokio::test]
    async fn test_get_unknown_id_returns_none() {
        let repo = memory_repository().await;

        let fetched = repo.get(&Uuid::new_v4()).await.expect("get should succeed");
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_attach_pdf_sets_reference_and_submits() {
        let repo = memory_repository().await;
        let report = sample_report("INF-2", "Carlos", "Reparación");
        repo.insert(&report).await.unwrap();

        repo.attach_pdf(&report.id, "http://localhost/uploads/informe.pdf", Utc::now())
            .await
            .expect("attach_pdf should succeed");

        let fetched = repo.get(&report.id).await.unwrap().unwrap();
        assert_eq!(fetched.pdf.as_deref(), Some("http://localhost/uploads/informe.pdf"));
        assert_eq!(fetched.status, ReportStatus::Submitted);
        assert!(fetched.updated_at >= fetched.created_at);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let repo = memory_repository().await;

        let mut older = sample_report("INF-OLD", "Ana", "Mantenimiento");
        older.created_at = Utc::now() - Duration::hours(2);
        older.updated_at = older.created_at;
        let newer = sample_report("INF-NEW", "Ana", "Mantenimiento");

        repo.insert(&older).await.unwrap();
        repo.insert(&newer).await.unwrap();

        let listed = repo.list(&ReportFilters::default()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].numero, "INF-NEW");
        assert_eq!(listed[1].numero, "INF-OLD");
    }

    #[tokio::test]
    async fn test_list_filters_by_tecnico_exact_match() {
        let repo = memory_repository().await;
        repo.insert(&sample_report("INF-1", "Carlos", "Mantenimiento")).await.unwrap();
        repo.insert(&sample_report("INF-2", "Carlos Andrés", "Mantenimiento")).await.unwrap();
        repo.insert(&sample_report("INF-3", "Ana", "Reparación")).await.unwrap();

        let filters = ReportFilters {
            tecnico: Some("Carlos".to_string()),
            ..Default::default()
        };
        let listed = repo.list(&filters).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].numero, "INF-1");
    }

    #[tokio::test]
    async fn test_list_combines_tecnico_and_status_filters() {
        let repo = memory_repository().await;
        let submitted = sample_report("INF-1", "Carlos", "Mantenimiento");
        let pending = sample_report("INF-2", "Carlos", "Mantenimiento");
        let other = sample_report("INF-3", "Ana", "Mantenimiento");

        repo.insert(&submitted).await.unwrap();
        repo.insert(&pending).await.unwrap();
        repo.insert(&other).await.unwrap();
        repo.attach_pdf(&submitted.id, "ref.pdf", Utc::now()).await.unwrap();
        repo.attach_pdf(&other.id, "ref.pdf", Utc::now()).await.unwrap();

        let filters = ReportFilters {
            tecnico: Some("Carlos".to_string()),
            status: Some(ReportStatus::Submitted),
            ..Default::default()
        };
        let listed = repo.list(&filters).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, submitted.id);
    }

    #[tokio::test]
    async fn test_list_filters_by_date_window() {
        let repo = memory_repository().await;

        let mut inside = sample_report("INF-IN", "Ana", "Mantenimiento");
        inside.created_at = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        inside.updated_at = inside.created_at;
        let mut outside = sample_report("INF-OUT", "Ana", "Mantenimiento");
        outside.created_at = Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap();
        outside.updated_at = outside.created_at;

        repo.insert(&inside).await.unwrap();
        repo.insert(&outside).await.unwrap();

        let filters = ReportFilters {
            desde: Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
            hasta: Some(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
            ..Default::default()
        };
        let listed = repo.list(&filters).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].numero, "INF-IN");
    }

    #[tokio::test]
    async fn test_stats_group_by_service_type_and_tecnico() {
        let repo = memory_repository().await;
        repo.insert(&sample_report("INF-1", "Carlos", "Mantenimiento")).await.unwrap();
        repo.insert(&sample_report("INF-2", "Carlos", "Mantenimiento")).await.unwrap();
        repo.insert(&sample_report("INF-3", "Ana", "Reparación")).await.unwrap();

        let (por_tipo_servicio, por_tecnico) = repo.stats().await.unwrap();

        let mantenimiento = por_tipo_servicio
            .iter()
            .find(|b| b.label == "Mantenimiento")
            .expect("bucket should exist");
        assert_eq!(mantenimiento.total, 2);

        let carlos = por_tecnico.iter().find(|b| b.label == "Carlos").unwrap();
        assert_eq!(carlos.total, 2);
        let ana = por_tecnico.iter().find(|b| b.label == "Ana").unwrap();
        assert_eq!(ana.total, 1);
    }
}
