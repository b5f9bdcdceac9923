use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod db;
pub mod notifier;
pub mod pdf;
pub mod qr;
pub mod report;
pub mod storage;

pub use crate::db::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::report::handlers::health,
        crate::report::handlers::create_report,
        crate::report::handlers::list_reports,
        crate::report::handlers::get_report_by_id,
        crate::report::handlers::get_stats,
    ),
    components(
        schemas(
            report::models::Report,
            report::models::ReportStatus,
            report::models::CreateReportResponse,
            report::handlers::CreateReportRequest,
            report::models::CountBucket,
            report::models::StatsResponse,
            report::validation::ValidationError,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Informes", description = "Service-report submission, listing and stats endpoints.")
    )
)]
struct ApiDoc;

/// Register the API routes; shared between the server and the tests.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(web::resource("/health").route(web::get().to(report::handlers::health)))
            .service(
                web::resource("/informes")
                    .route(web::get().to(report::handlers::list_reports))
                    .route(web::post().to(report::handlers::create_report)),
            )
            .service(
                web::resource("/informes/{id}")
                    .route(web::get().to(report::handlers::get_report_by_id)),
            )
            .service(
                web::resource("/reports")
                    .route(web::get().to(report::handlers::list_reports))
                    .route(web::post().to(report::handlers::create_report)),
            )
            .service(
                web::resource("/reports/{id}")
                    .route(web::get().to(report::handlers::get_report_by_id)),
            )
            .service(web::resource("/stats").route(web::get().to(report::handlers::get_stats))),
    );
}

pub async fn run() -> std::io::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    dotenvy::dotenv().ok();
    let config = crate::config::AppConfig::from_env();
    let port = config.port;

    // The local storage variant serves its uploads tree itself; the bucket
    // variant resolves public bucket URLs instead.
    let uploads_dir = match &config.supabase {
        Some(_) => None,
        None => Some(std::path::Path::new(&config.public_dir).join("uploads")),
    };
    if let Some(dir) = &uploads_dir {
        std::fs::create_dir_all(dir)?;
    }

    let app_state = match AppState::new_with_config(config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to initialize application state. Check DATABASE_URL and storage settings in .env. Error: {}",
                e
            );
            std::process::exit(1);
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("informes_server")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus metrics middleware");

    log::info!("Starting server at http://0.0.0.0:{}", port);

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let uploads_dir = uploads_dir.clone();
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .configure(configure_api)
            .configure(move |cfg| {
                if let Some(dir) = uploads_dir {
                    cfg.service(actix_files::Files::new("/uploads", dir));
                }
            })
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
