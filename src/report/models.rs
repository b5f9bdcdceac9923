use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of a report: inserted as `Pending`, flipped to `Submitted` by
/// the same statement that attaches the rendered document reference.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Submitted,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Submitted => "submitted",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown report status '{0}'")]
pub struct StatusParseError(String);

impl TryFrom<String> for ReportStatus {
    type Error = StatusParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(ReportStatus::Pending),
            "submitted" => Ok(ReportStatus::Submitted),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema, sqlx::FromRow)]
pub struct Report {
    #[schema(example = "f1e2d3c4-b5a6-7890-1234-567890abcdef")]
    pub id: Uuid,
    #[schema(example = "INF-2025-0042")]
    pub numero: String,
    #[schema(example = "Carlos Mendoza")]
    pub tecnico: String,
    #[schema(example = "Ferretería El Tornillo")]
    pub cliente: String,
    #[schema(example = "0991234567")]
    pub telefono: String,
    #[schema(example = "Compresor industrial")]
    pub tipo_equipo: String,
    #[schema(example = "Mantenimiento preventivo")]
    pub tipo_servicio: String,
    #[schema(example = "Filtro de aire saturado")]
    pub diagnostico: String,
    #[schema(example = "Cambio de filtro y limpieza general")]
    pub trabajo_realizado: String,
    #[schema(example = "Se recomienda revisión en 6 meses")]
    pub observaciones: String,
    #[sqlx(try_from = "String")]
    pub status: ReportStatus,
    /// Reference to the stored technician signature image, if drawn.
    pub firma_tecnico: Option<String>,
    /// Reference to the stored client signature image, if drawn.
    pub firma_cliente: Option<String>,
    /// Ordered photo references.
    #[sqlx(json)]
    pub fotos: Vec<String>,
    /// Ordered attachment references.
    #[sqlx(json)]
    pub anexos: Vec<String>,
    /// Document reference; null until rendering completes.
    pub pdf: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query filters for the list endpoint, combined with AND.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReportFilters {
    #[schema(example = "Carlos Mendoza")]
    pub tecnico: Option<String>,
    pub status: Option<ReportStatus>,
    /// Creation-date lower bound (inclusive).
    #[schema(example = "2025-01-01")]
    pub desde: Option<NaiveDate>,
    /// Creation-date upper bound (inclusive).
    #[schema(example = "2025-12-31")]
    pub hasta: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateReportResponse {
    pub ok: bool,
    pub id: Uuid,
    #[schema(example = "https://example.com/uploads/informes/…/informe.pdf")]
    pub pdf_url: String,
    #[schema(example = "https://example.com/informes/…")]
    pub view_url: String,
}

/// One bucket of the aggregate counts.
#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema, sqlx::FromRow)]
pub struct CountBucket {
    pub label: String,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub por_tipo_servicio: Vec<CountBucket>,
    pub por_tecnico: Vec<CountBucket>,
}
