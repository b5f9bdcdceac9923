//! Hosted repository backend: PostgreSQL over a connection pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{day_end, day_start, ReportRepository};
use crate::report::models::{CountBucket, Report, ReportFilters};

const COLUMNS: &str = "id, numero, tecnico, cliente, telefono, tipo_equipo, tipo_servicio, \
                       diagnostico, trabajo_realizado, observaciones, status, firma_tecnico, \
                       firma_cliente, fotos, anexos, pdf, created_at, updated_at";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS informes (
    id                UUID PRIMARY KEY,
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
    fotos             JSONB NOT NULL,
    anexos            JSONB NOT NULL,
    pdf               TEXT,
    created_at        TIMESTAMPTZ NOT NULL,
    updated_at        TIMESTAMPTZ NOT NULL
)
"#;

pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(database_url)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        log::info!("Postgres repository ready");

        Ok(Self { pool })
    }
}

#[async_trait]
impl ReportRepository for PostgresRepository {
    async fn insert(&self, report: &Report) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO informes (id, numero, tecnico, cliente, telefono, tipo_equipo, \
             tipo_servicio, diagnostico, trabajo_realizado, observaciones, status, \
             firma_tecnico, firma_cliente, fotos, anexos, pdf, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
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
            "SELECT {} FROM informes WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list(&self, filters: &ReportFilters) -> Result<Vec<Report>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> =
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
        sqlx::query(
            "UPDATE informes SET pdf = $1, status = 'submitted', updated_at = $2 WHERE id = $3",
        )
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
