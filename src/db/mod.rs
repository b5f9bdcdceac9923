//! Persistence layer: the repository contract, its two backends, and the
//! shared application state injected into every handler.
//!
//! - `sqlite` - embedded relational file (also `:memory:` in tests)
//! - `postgres` - hosted relational backend

mod postgres;
mod sqlite;

pub use postgres::PostgresRepository;
pub use sqlite::SqliteRepository;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::notifier::Mailer;
use crate::report::models::{CountBucket, Report, ReportFilters};
use crate::storage::{AssetStore, LocalStorage, SupabaseStorage};

/// Persistence contract for report records.
///
/// `attach_pdf` is the only mutation after insert: it stores the document
/// reference and flips the status from pending to submitted in the same
/// statement. There is no delete.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn insert(&self, report: &Report) -> Result<(), sqlx::Error>;

    async fn get(&self, id: &Uuid) -> Result<Option<Report>, sqlx::Error>;

    /// Filtered listing, newest first.
    async fn list(&self, filters: &ReportFilters) -> Result<Vec<Report>, sqlx::Error>;

    async fn attach_pdf(
        &self,
        id: &Uuid,
        reference: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error>;

    /// Record counts grouped by service type and by technician.
    async fn stats(&self) -> Result<(Vec<CountBucket>, Vec<CountBucket>), sqlx::Error>;
}

/// Inclusive day bounds for the creation-date filters.
pub(crate) fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
}

pub(crate) fn day_end(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(23, 59, 59).expect("end of day is valid"))
}

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ReportRepository>,
    pub storage: Arc<dyn AssetStore>,
    pub http_client: reqwest::Client,
    pub mailer: Option<Mailer>,
    pub config: AppConfig,
}

impl AppState {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::new_with_config(AppConfig::from_env()).await
    }

    pub async fn new_with_config(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let http_client = reqwest::Client::builder()
            .user_agent("informes-server/0.3")
            .build()
            .expect("Failed to create reqwest client");

        let repository: Arc<dyn ReportRepository> = if config.database_url.starts_with("postgres")
        {
            Arc::new(PostgresRepository::connect(&config.database_url).await?)
        } else {
            Arc::new(SqliteRepository::connect(&config.database_url).await?)
        };

        let storage: Arc<dyn AssetStore> = match &config.supabase {
            Some(supabase) => Arc::new(SupabaseStorage::new(
                supabase.clone(),
                http_client.clone(),
            )),
            None => Arc::new(LocalStorage::new(&config.public_dir, &config.public_base_url)),
        };

        let mailer = match &config.smtp {
            Some(smtp) => Some(Mailer::from_config(smtp)?),
            None => None,
        };
        if mailer.is_none() {
            log::info!("SMTP not configured; email notifications are disabled");
        }

        Ok(AppState {
            repository,
            storage,
            http_client,
            mailer,
            config,
        })
    }

    /// Assemble state from pre-built parts; used by the integration tests.
    pub fn new_with_parts(
        repository: Arc<dyn ReportRepository>,
        storage: Arc<dyn AssetStore>,
        mailer: Option<Mailer>,
        config: AppConfig,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent("informes-server/0.3")
            .build()
            .expect("Failed to create reqwest client");

        AppState {
            repository,
            storage,
            http_client,
            mailer,
            config,
        }
    }
}
