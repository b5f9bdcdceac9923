use actix_multipart::Multipart;
use actix_web::{
    web::{self, Path, Query},
    HttpResponse, Responder,
};
use chrono::Utc;
use log::{debug, error, info, warn};
use sanitize_filename::sanitize;
use uuid::Uuid;

use crate::db::AppState;
use crate::notifier::report_email_html;
use crate::pdf::{render_report_pdf, AssetImage, RenderOptions, ReportAssets};
use crate::qr::QrStyle;
use crate::report::models::{
    CreateReportResponse, Report, ReportFilters, ReportStatus, StatsResponse,
};
use crate::report::multipart_parser::{decode_data_url, MultipartParser, ParsedReportSubmission};
use crate::report::validation::validate_submission;
use crate::storage::{content_type_for, StorageError, StoredAsset};
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Informes",
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

/// Multipart shape of a submission, for the OpenAPI document only.
#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
pub struct CreateReportRequest {
    pub numero: String,
    pub tecnico: String,
    pub cliente: String,
    pub telefono: Option<String>,
    pub tipo_equipo: Option<String>,
    pub tipo_servicio: Option<String>,
    pub diagnostico: Option<String>,
    pub trabajo_realizado: Option<String>,
    pub observaciones: Option<String>,
    /// Base64 data-URL drawn on the client canvas.
    pub firma_tecnico: Option<String>,
    /// Base64 data-URL drawn on the client canvas.
    pub firma_cliente: Option<String>,
    #[schema(value_type = Option<Vec<String>>, format = Binary)]
    pub fotos: Option<Vec<String>>,
    #[schema(value_type = Option<Vec<String>>, format = Binary)]
    pub anexos: Option<Vec<String>>,
}

#[utoipa::path(
    context_path = "/api",
    tag = "Informes",
    post,
    path = "/informes",
    request_body(content = inline(CreateReportRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Report created and rendered", body = CreateReportResponse),
        (status = 400, description = "Missing required fields"),
        (status = 500, description = "Storage, persistence or rendering failure", body = ErrorResponse)
    )
)]
pub async fn create_report(payload: Multipart, data: web::Data<AppState>) -> impl Responder {
    info!("Executing create_report handler");

    let submission = match MultipartParser::parse_report_multipart(payload).await {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("Failed to parse report multipart: {}", e);
            return HttpResponse::from(e);
        }
    };

    let errors = validate_submission(&submission);
    if !errors.is_empty() {
        debug!("Submission rejected with {} validation errors", errors.len());
        return HttpResponse::BadRequest().json(serde_json::json!({
            "ok": false,
            "errors": errors.errors(),
        }));
    }

    let id = Uuid::new_v4();
    let now = Utc::now();

    // Assets first: any storage failure here aborts before a record exists.
    let firma_tecnico = match store_signature(&data, &id, "firma_tecnico", &submission).await {
        Ok(stored) => stored,
        Err(response) => return response,
    };
    let firma_cliente = match store_signature(&data, &id, "firma_cliente", &submission).await {
        Ok(stored) => stored,
        Err(response) => return response,
    };

    let fotos = match store_files(&data, &id, "fotos", &submission.fotos).await {
        Ok(stored) => stored,
        Err(response) => return response,
    };
    let anexos = match store_files(&data, &id, "anexos", &submission.anexos).await {
        Ok(stored) => stored,
        Err(response) => return response,
    };

    let report = Report {
        id,
        numero: submission.numero.clone(),
        tecnico: submission.tecnico.clone(),
        cliente: submission.cliente.clone(),
        telefono: submission.telefono.clone(),
        tipo_equipo: submission.tipo_equipo.clone(),
        tipo_servicio: submission.tipo_servicio.clone(),
        diagnostico: submission.diagnostico.clone(),
        trabajo_realizado: submission.trabajo_realizado.clone(),
        observaciones: submission.observaciones.clone(),
        status: ReportStatus::Pending,
        firma_tecnico: firma_tecnico.as_ref().map(|s| s.url.clone()),
        firma_cliente: firma_cliente.as_ref().map(|s| s.url.clone()),
        fotos: fotos.iter().map(|s| s.url.clone()).collect(),
        anexos: anexos.iter().map(|s| s.url.clone()).collect(),
        pdf: None,
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = data.repository.insert(&report).await {
        error!("Failed to insert report {}: {}", id, e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::internal_error(&format!("Failed to save report: {}", e)));
    }
    info!("Report {} stored as draft", id);

    // Fetch assets back by reference; failures degrade to omissions.
    let assets = ReportAssets {
        fotos: fetch_images(&data, &fotos).await,
        firma_tecnico: match &firma_tecnico {
            Some(stored) => Some(fetch_image(&data, stored).await),
            None => None,
        },
        firma_cliente: match &firma_cliente {
            Some(stored) => Some(fetch_image(&data, stored).await),
            None => None,
        },
    };

    let pdf_reference = format!("informes/{}/informe_{}.pdf", id, sanitize(&report.numero));
    let pdf_url = data.storage.public_url(&pdf_reference);
    let view_url = data.config.view_url(&id);

    let rendered = match render_report_pdf(
        &report,
        assets,
        &RenderOptions {
            app_name: &data.config.app_name,
            view_url: &view_url,
            pdf_url: &pdf_url,
            qr_style: QrStyle::default(),
        },
    ) {
        Ok(rendered) => rendered,
        Err(e) => {
            // The draft stays behind with a null document reference.
            error!("Failed to render PDF for report {}: {}", id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("Failed to render PDF: {}", e)));
        }
    };
    for skip in &rendered.skipped {
        warn!("Report {}: asset '{}' omitted from PDF: {}", id, skip.name, skip.reason);
    }

    let stored_pdf = match data
        .storage
        .store(&pdf_reference, &rendered.bytes, "application/pdf")
        .await
    {
        Ok(stored) => stored,
        Err(e) => {
            error!("Failed to store PDF for report {}: {}", id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("Failed to store PDF: {}", e)));
        }
    };

    if let Err(e) = data.repository.attach_pdf(&id, &stored_pdf.url, Utc::now()).await {
        error!("Failed to attach PDF reference to report {}: {}", id, e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::internal_error(&format!("Failed to update report: {}", e)));
    }
    info!("Report {} rendered and submitted", id);

    // Notification runs after the response-determining work; failures are
    // logged and swallowed.
    if let (Some(mailer), Some(recipient)) = (&data.mailer, &data.config.notify_email) {
        let subject = format!("{}: nuevo informe {}", data.config.app_name, report.numero);
        let html = report_email_html(&data.config.app_name, &report.numero, &stored_pdf.url, &view_url);
        let attachment = Some((
            format!("informe_{}.pdf", sanitize(&report.numero)),
            rendered.bytes,
        ));
        if let Err(e) = mailer.send(recipient, &subject, html, attachment).await {
            warn!("Notification email for report {} failed: {}", id, e);
        }
    }

    HttpResponse::Ok().json(CreateReportResponse {
        ok: true,
        id,
        pdf_url: stored_pdf.url,
        view_url,
    })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Informes",
    get,
    path = "/informes",
    params(
        ("tecnico" = Option<String>, Query, description = "Exact submitter match"),
        ("status" = Option<String>, Query, description = "pending or submitted"),
        ("desde" = Option<String>, Query, description = "Creation date lower bound (YYYY-MM-DD)"),
        ("hasta" = Option<String>, Query, description = "Creation date upper bound (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Reports, newest first", body = [Report])
    )
)]
pub async fn list_reports(
    filters: Query<ReportFilters>,
    data: web::Data<AppState>,
) -> impl Responder {
    match data.repository.list(&filters).await {
        Ok(reports) => HttpResponse::Ok().json(reports),
        Err(e) => {
            error!("Failed to list reports: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to list reports"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Informes",
    get,
    path = "/informes/{id}",
    params(
        ("id" = Uuid, Path, description = "Report identifier")
    ),
    responses(
        (status = 200, description = "Report found", body = Report),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
pub async fn get_report_by_id(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    match data.repository.get(&id).await {
        Ok(Some(report)) => HttpResponse::Ok().json(report),
        Ok(None) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found("Informe not found"))
        }
        Err(e) => {
            error!("Failed to fetch report {}: {}", id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to fetch report"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Informes",
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Counts by service type and by submitter", body = StatsResponse)
    )
)]
pub async fn get_stats(data: web::Data<AppState>) -> impl Responder {
    match data.repository.stats().await {
        Ok((por_tipo_servicio, por_tecnico)) => HttpResponse::Ok().json(StatsResponse {
            por_tipo_servicio,
            por_tecnico,
        }),
        Err(e) => {
            error!("Failed to compute stats: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to compute stats"))
        }
    }
}

/// Decode and persist one signature data-URL, if the submission carries it.
async fn store_signature(
    data: &web::Data<AppState>,
    id: &Uuid,
    field: &str,
    submission: &ParsedReportSubmission,
) -> Result<Option<StoredAsset>, HttpResponse> {
    let data_url = match field {
        "firma_tecnico" => submission.firma_tecnico.as_deref(),
        _ => submission.firma_cliente.as_deref(),
    };
    let Some(data_url) = data_url else {
        return Ok(None);
    };

    let bytes = decode_data_url(data_url).map_err(HttpResponse::from)?;
    let reference = format!("informes/{}/{}.png", id, field);
    let stored = data
        .storage
        .store(&reference, &bytes, "image/png")
        .await
        .map_err(|e| storage_failure(field, e))?;

    Ok(Some(stored))
}

/// Persist one uploaded file list under `informes/{id}/{kind}/`.
async fn store_files(
    data: &web::Data<AppState>,
    id: &Uuid,
    kind: &str,
    files: &[(Vec<u8>, String)],
) -> Result<Vec<StoredAsset>, HttpResponse> {
    let mut stored_files = Vec::with_capacity(files.len());

    for (index, (bytes, filename)) in files.iter().enumerate() {
        let reference = format!("informes/{}/{}/{:02}_{}", id, kind, index, sanitize(filename));
        let stored = data
            .storage
            .store(&reference, bytes, &content_type_for(filename))
            .await
            .map_err(|e| storage_failure(kind, e))?;
        stored_files.push(stored);
    }

    Ok(stored_files)
}

fn storage_failure(what: &str, error: StorageError) -> HttpResponse {
    error!("Failed to store {}: {}", what, error);
    HttpResponse::InternalServerError()
        .json(ErrorResponse::internal_error(&format!("Failed to store {}: {}", what, error)))
}

/// Resolve stored assets back into render inputs, best effort per asset.
async fn fetch_images(data: &web::Data<AppState>, stored: &[StoredAsset]) -> Vec<AssetImage> {
    let mut images = Vec::with_capacity(stored.len());
    for asset in stored {
        images.push(fetch_image(data, asset).await);
    }
    images
}

async fn fetch_image(data: &web::Data<AppState>, stored: &StoredAsset) -> AssetImage {
    match data.storage.fetch(&stored.reference).await {
        Ok(bytes) => AssetImage::Loaded {
            name: stored.reference.clone(),
            bytes,
        },
        Err(e) => {
            warn!("Asset {} could not be fetched for rendering: {}", stored.reference, e);
            AssetImage::Skipped {
                name: stored.reference.clone(),
                reason: e.to_string(),
            }
        }
    }
}
