//! Input validation for report submissions.
//!
//! One canonical policy: `numero`, `tecnico` and `cliente` are required,
//! everything else (remaining text fields, signatures, files) is optional.

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use crate::report::multipart_parser::ParsedReportSubmission;

/// A single field failure, serialized into the 400 response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationError {
    #[schema(example = "numero")]
    pub field: String,
    #[schema(example = "numero es obligatorio")]
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn empty_field(field: &str) -> Self {
        Self::new(field, format!("{} es obligatorio", field))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors for a submission.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

/// Apply the canonical policy to a parsed submission.
pub fn validate_submission(submission: &ParsedReportSubmission) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for (field, value) in [
        ("numero", &submission.numero),
        ("tecnico", &submission.tecnico),
        ("cliente", &submission.cliente),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::empty_field(field));
        }
    }

    errors
}
