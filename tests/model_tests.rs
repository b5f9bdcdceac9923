#[cfg(test)]
mod model_tests {
    use informes_server::report::models::{ReportStatus, StatusParseError};
    use informes_server::report::multipart_parser::ParsedReportSubmission;
    use informes_server::report::validation::{validate_submission, ValidationError};

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReportStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&ReportStatus::Submitted).unwrap(),
            "\"submitted\""
        );
    }

    #[test]
    fn test_status_as_str_matches_try_from() {
        for status in [ReportStatus::Pending, ReportStatus::Submitted] {
            let parsed = ReportStatus::try_from(status.as_str().to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_try_from_rejects_unknown_value() {
        let err: StatusParseError = ReportStatus::try_from("archived".to_string()).unwrap_err();
        assert!(err.to_string().contains("archived"));
    }

    #[test]
    fn test_validation_accepts_complete_submission() {
        let mut submission = ParsedReportSubmission::default();
        submission.numero = "INF-1".to_string();
        submission.tecnico = "Carlos".to_string();
        submission.cliente = "Cliente SA".to_string();

        let errors = validate_submission(&submission);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validation_reports_each_missing_field() {
        let submission = ParsedReportSubmission::default();

        let errors = validate_submission(&submission);
        assert_eq!(errors.len(), 3);

        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["numero", "tecnico", "cliente"]);
    }

    #[test]
    fn test_validation_treats_whitespace_as_empty() {
        let mut submission = ParsedReportSubmission::default();
        submission.numero = "   ".to_string();
        submission.tecnico = "Carlos".to_string();
        submission.cliente = "Cliente SA".to_string();

        let errors = validate_submission(&submission);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "numero");
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError::empty_field("numero");
        assert_eq!(format!("{}", error), "[numero] numero es obligatorio");
    }

    #[test]
    fn test_optional_fields_do_not_block_submission() {
        let mut submission = ParsedReportSubmission::default();
        submission.numero = "INF-1".to_string();
        submission.tecnico = "Carlos".to_string();
        submission.cliente = "Cliente SA".to_string();
        // No phone, no signatures, no files: still valid.
        assert!(submission.telefono.is_empty());
        assert!(submission.firma_tecnico.is_none());
        assert!(submission.fotos.is_empty());

        let errors = validate_submission(&submission);
        assert!(errors.is_empty());
    }
}
