use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures::TryStreamExt;
use sanitize_filename::sanitize;

use crate::ErrorResponse;

/// Everything a client can put on the wire in one submission: the report
/// metadata as plain text fields, both signatures as base64 data-URLs, and
/// any number of repeated `fotos` / `anexos` file fields.
#[derive(Debug, Default)]
pub struct ParsedReportSubmission {
    pub numero: String,
    pub tecnico: String,
    pub cliente: String,
    pub telefono: String,
    pub tipo_equipo: String,
    pub tipo_servicio: String,
    pub diagnostico: String,
    pub trabajo_realizado: String,
    pub observaciones: String,
    pub firma_tecnico: Option<String>,
    pub firma_cliente: Option<String>,
    /// (bytes, original filename) pairs, in upload order.
    pub fotos: Vec<(Vec<u8>, String)>,
    pub anexos: Vec<(Vec<u8>, String)>,
}

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
    #[error("Invalid signature data-URL: {0}")]
    DataUrlError(String),
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::Utf8Error(_) | MultipartParseError::DataUrlError(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!("{}", error)))
            }
            _ => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("{}", error))),
        }
    }
}

pub struct MultipartParser;

impl MultipartParser {
    pub async fn parse_report_multipart(
        mut multipart: Multipart,
    ) -> Result<ParsedReportSubmission, MultipartParseError> {
        let mut parsed = ParsedReportSubmission::default();

        while let Some(mut field) = multipart
            .try_next()
            .await
            .map_err(|e| MultipartParseError::FieldError(e.to_string()))?
        {
            let content_disposition = field.content_disposition().ok_or_else(|| {
                MultipartParseError::FieldError("Content disposition not found".to_string())
            })?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
                .to_string();
            let maybe_filename = content_disposition.get_filename().map(|s| s.to_string());

            let mut buffer = Vec::new();
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|e| MultipartParseError::IoError(e.to_string()))?
            {
                buffer.extend_from_slice(&chunk);
            }

            // Repeated file fields arrive as `fotos` or `fotos[]` depending
            // on the client; both spell the same thing.
            match name.trim_end_matches("[]") {
                "fotos" => {
                    let filename = match maybe_filename {
                        Some(fname) => sanitize(&fname),
                        None => format!("foto_{}.jpg", parsed.fotos.len()),
                    };
                    parsed.fotos.push((buffer, filename));
                }
                "anexos" => {
                    let filename = match maybe_filename {
                        Some(fname) => sanitize(&fname),
                        None => format!("anexo_{}.dat", parsed.anexos.len()),
                    };
                    parsed.anexos.push((buffer, filename));
                }
                text_field => {
                    let value = String::from_utf8(buffer)
                        .map_err(|e| MultipartParseError::Utf8Error(e.to_string()))?;
                    match text_field {
                        "numero" => parsed.numero = value,
                        "tecnico" => parsed.tecnico = value,
                        "cliente" => parsed.cliente = value,
                        "telefono" => parsed.telefono = value,
                        "tipo_equipo" => parsed.tipo_equipo = value,
                        "tipo_servicio" => parsed.tipo_servicio = value,
                        "diagnostico" => parsed.diagnostico = value,
                        "trabajo_realizado" => parsed.trabajo_realizado = value,
                        "observaciones" => parsed.observaciones = value,
                        "firma_tecnico" => {
                            parsed.firma_tecnico = Some(value).filter(|v| !v.is_empty())
                        }
                        "firma_cliente" => {
                            parsed.firma_cliente = Some(value).filter(|v| !v.is_empty())
                        }
                        _ => continue,
                    }
                }
            }
        }

        Ok(parsed)
    }
}

/// Decode a `data:image/png;base64,…` data-URL into raw image bytes.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, MultipartParseError> {
    use base64::Engine;

    let payload = data_url
        .split_once(',')
        .map(|(_, rest)| rest)
        .unwrap_or(data_url);

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| MultipartParseError::DataUrlError(e.to_string()))
}
