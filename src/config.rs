//! Environment-driven configuration.
//!
//! Every component reads its own block of variables; missing optional blocks
//! (SMTP, Supabase) disable the component instead of failing startup.

use std::env;

/// Top-level application configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub public_base_url: String,
    pub app_name: String,
    pub database_url: String,
    pub public_dir: String,
    pub notify_email: Option<String>,
    pub supabase: Option<SupabaseConfig>,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub bucket_name: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        AppConfig {
            port,
            public_base_url,
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "Informes de Servicio".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data/informes.db?mode=rwc".to_string()),
            public_dir: env::var("PUBLIC_DIR").unwrap_or_else(|_| "./public".to_string()),
            notify_email: env::var("NOTIFY_EMAIL").ok().filter(|v| !v.is_empty()),
            supabase: SupabaseConfig::from_env(),
            smtp: SmtpConfig::from_env(),
        }
    }

    /// Public URL of the online view for a report.
    pub fn view_url(&self, id: &uuid::Uuid) -> String {
        format!("{}/informes/{}", self.public_base_url.trim_end_matches('/'), id)
    }
}

impl SupabaseConfig {
    /// Present only when the bucket variant is configured.
    pub fn from_env() -> Option<Self> {
        let supabase_url = env::var("SUPABASE_URL").ok().filter(|v| !v.is_empty())?;
        let supabase_anon_key = env::var("SUPABASE_ANON_KEY").ok()?;
        let bucket_name =
            env::var("SUPABASE_BUCKET").unwrap_or_else(|_| "informes-bucket".to_string());

        Some(SupabaseConfig {
            supabase_url,
            supabase_anon_key,
            bucket_name,
        })
    }
}

impl SmtpConfig {
    /// Absent credentials disable the notifier entirely.
    pub fn from_env() -> Option<Self> {
        let host = env::var("SMTP_HOST").ok().filter(|v| !v.is_empty())?;
        let user = env::var("SMTP_USER").ok()?;
        let pass = env::var("SMTP_PASS").ok()?;
        let port = env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(587);

        Some(SmtpConfig { host, port, user, pass })
    }
}
