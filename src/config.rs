use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub auditor_base_url: String,
    pub audit_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://loan_records.db".to_string()),
            auditor_base_url: std::env::var("AUDITOR_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8001".to_string()),
            audit_timeout_secs: std::env::var("AUDIT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("AUDIT_TIMEOUT_SECS must be a valid number"))?,
        };

        if config.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL cannot be empty");
        }
        if !config.database_url.starts_with("sqlite:") {
            anyhow::bail!("DATABASE_URL must start with sqlite:");
        }
        if !config.auditor_base_url.starts_with("http://")
            && !config.auditor_base_url.starts_with("https://")
        {
            anyhow::bail!("AUDITOR_BASE_URL must start with http:// or https://");
        }
        if config.audit_timeout_secs == 0 {
            anyhow::bail!("AUDIT_TIMEOUT_SECS must be greater than 0");
        }

        tracing::debug!("Database URL: {}", config.database_url);
        tracing::debug!("Auditor base URL: {}", config.auditor_base_url);
        tracing::debug!("Audit timeout: {}s", config.audit_timeout_secs);
        tracing::debug!("Server port: {}", config.port);

        Ok(config)
    }

    /// Per-call deadline for the remote audit request.
    pub fn audit_timeout(&self) -> Duration {
        Duration::from_secs(self.audit_timeout_secs)
    }
}
