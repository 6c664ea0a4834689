use crate::{env_or_default, ConfigError};
use std::env;

/// Postgres connection settings
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
}

impl DatabaseConfig {
    pub fn new(url: String) -> Self {
        Self { url }
    }

    /// Resolve the connection URL from the environment.
    ///
    /// `DATABASE_URL` wins. Otherwise, when `PGDATABASE` is set, the URL is
    /// assembled from `PGHOST`, `PGPORT`, `PGUSER`, `PGPASSWORD` and
    /// `PGDATABASE`. Returns `Ok(None)` when neither is present, in which case
    /// the service runs on the in-memory store.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        if let Ok(url) = env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                return Ok(Some(Self::new(url)));
            }
        }

        let database = match env::var("PGDATABASE") {
            Ok(db) if !db.trim().is_empty() => db,
            _ => return Ok(None),
        };

        let host = env_or_default("PGHOST", "localhost");
        let port: u16 = env_or_default("PGPORT", "5432").parse().map_err(|e| {
            ConfigError::ParseError {
                key: "PGPORT".to_string(),
                details: format!("{}", e),
            }
        })?;
        let user = env_or_default("PGUSER", "postgres");
        let credentials = match env::var("PGPASSWORD") {
            Ok(password) if !password.is_empty() => format!("{}:{}", user, password),
            _ => user,
        };

        Ok(Some(Self::new(format!(
            "postgres://{}@{}:{}/{}",
            credentials, host, port, database
        ))))
    }
}
