use core_config::{
    app_info, database::DatabaseConfig, env_or_default, server::ServerConfig, AppInfo, FromEnv,
};
use std::path::PathBuf;

// Re-export Environment for use in other modules
pub use core_config::Environment;

pub const DEFAULT_TEMPLATES_DIR: &str = "templates";
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    /// `None` selects the in-memory email store
    pub database: Option<DatabaseConfig>,
    pub server: ServerConfig,
    pub environment: Environment,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = DatabaseConfig::from_env()?; // Optional
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8000

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            templates_dir: env_or_default("TEMPLATES_DIR", DEFAULT_TEMPLATES_DIR).into(),
            static_dir: env_or_default("STATIC_DIR", DEFAULT_STATIC_DIR).into(),
        })
    }
}
