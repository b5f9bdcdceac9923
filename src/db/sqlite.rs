//! Embedded repository backend: a single SQLite file (or `:memory:`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{day_end, day_start, ReportRepository};
use crate::report::models::{CountBucket, Report, ReportFilters};

const COLUMNS: &str = "id, numero, tecnico, cliente, telefono, tipo_equipo, tipo_servicio, \
                       diagnostico, trabajo_realizado, observaciones, status, firma_tecnico, \
                       firma_cliente, fotos, anexos, pdf, created_at, updated_at";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS informes (
    id                TEXT PRIMARY KEY,
    numero            TEXT NOT NULL,
    tecnico           TEXT NOT NULL,
    cliente           TEXT NOT NULL,
    telefono          TEXT NOT NULL DEFAULT '',
    tipo_equipo       TEXT NOT NULL DEFAULT '',
    tipo_servicio     TEXT NOT NULL DEFAULT '',
    diagnostico       TEXT NOT NULL DEFAULT '',
    trabajo_realizado TEXT NOT NULL DEFAULT '',
    observaciones     TEXT NOT NULL DEFAULT '',
    status            TEXT NOT NULL,
    firma_tecnico     TEXT,
    firma_cliente     TEXT,
    fotos             TEXT NOT NULL,
    anexos            TEXT NOT NULL,
    pdf               TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
)
"#;

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect and make sure the schema exists. The `mode=rwc` query flag in
    /// the default URL lets SQLite create the file on first run.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        if let Some(path) = database_url
            .strip_prefix("sqlite://")
            .map(|rest| rest.split('?').next().unwrap_or(rest))
            .filter(|p| !p.is_empty() && !p.starts_with(':'))
        {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).ok();
                }
            }
        }

        // An in-memory database exists per connection; the pool must not
        // fan out across several of them.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        log::info!("SQLite repository ready at {}", database_url);

        Ok(Self { pool })
    }
}

#[async_trait]
impl ReportRepository for SqliteRepository {
    async fn insert(&self, report: &Report) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO informes (id, numero, tecnico, cliente, telefono, tipo_equipo, \
             tipo_servicio, diagnostico, trabajo_realizado, observaciones, status, \
             firma_tecnico, firma_cliente, fotos, anexos, pdf, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(report.id)
        .bind(&report.numero)
        .bind(&report.tecnico)
        .bind(&report.cliente)
        .bind(&report.telefono)
        .bind(&report.tipo_equipo)
        .bind(&report.tipo_servicio)
        .bind(&report.diagnostico)
        .bind(&report.trabajo_realizado)
        .bind(&report.observaciones)
        .bind(report.status.as_str())
        .bind(report.firma_tecnico.as_deref())
        .bind(report.firma_cliente.as_deref())
        .bind(sqlx::types::Json(&report.fotos))
        .bind(sqlx::types::Json(&report.anexos))
        .bind(report.pdf.as_deref())
        .bind(report.created_at)
        .bind(report.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Report>, sqlx::Error> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM informes WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list(&self, filters: &ReportFilters) -> Result<Vec<Report>, sqlx::Error> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM informes WHERE 1=1", COLUMNS));

        if let Some(tecnico) = &filters.tecnico {
            qb.push(" AND tecnico = ").push_bind(tecnico);
        }
        if let Some(status) = &filters.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(desde) = filters.desde {
            qb.push(" AND created_at >= ").push_bind(day_start(desde));
        }
        if let Some(hasta) = filters.hasta {
            qb.push(" AND created_at <= ").push_bind(day_end(hasta));
        }
        qb.push(" ORDER BY created_at DESC");

        qb.build_query_as::<Report>().fetch_all(&self.pool).await
    }

    async fn attach_pdf(
        &self,
        id: &Uuid,
        reference: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE informes SET pdf = ?, status = 'submitted', updated_at = ? WHERE id = ?")
            .bind(reference)
            .bind(updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn stats(&self) -> Result<(Vec<CountBucket>, Vec<CountBucket>), sqlx::Error> {
        let por_tipo_servicio = sqlx::query_as::<_, CountBucket>(
            "SELECT tipo_servicio AS label, COUNT(*) AS total FROM informes \
             GROUP BY tipo_servicio ORDER BY total DESC, label ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let por_tecnico = sqlx::query_as::<_, CountBucket>(
            "SELECT tecnico AS label, COUNT(*) AS total FROM informes \
             GROUP BY tecnico ORDER BY total DESC, label ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok((por_tipo_servicio, por_tecnico))
    }
}
