//! Application state management.
//!
//! The state is built once in `main` and handed to the routers:
//! - Configuration
//! - Optional PostgreSQL connection pool (in-memory store when absent)
//! - Delivery backend and template renderer shared by the email service

use core_config::FromEnv;
use domain_emails::{EmailSender, LogSender, SmtpConfig, SmtpSender, TemplateRenderer};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::{Config, Environment};

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: Config,
    /// PostgreSQL connection pool, `None` when running on the in-memory store
    pub db: Option<DatabaseConnection>,
    pub sender: Arc<dyn EmailSender>,
    pub templates: Arc<dyn TemplateRenderer>,
}

/// SMTP in production, log-only everywhere else.
pub fn sender_for(environment: &Environment) -> eyre::Result<Arc<dyn EmailSender>> {
    if environment.is_production() {
        let smtp = SmtpConfig::from_env()?;
        Ok(Arc::new(SmtpSender::new(&smtp)?))
    } else {
        tracing::info!("Development environment: emails are logged, not delivered");
        Ok(Arc::new(LogSender::new()))
    }
}
