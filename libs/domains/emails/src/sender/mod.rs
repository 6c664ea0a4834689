//! Delivery backends
//!
//! - [`SmtpSender`]: real delivery over SMTP (lettre)
//! - [`LogSender`]: writes the message to the log and reports success
//! - [`MockSender`]: captures messages for tests

pub mod log;
pub mod mock;
pub mod smtp;

pub use log::LogSender;
pub use mock::MockSender;
pub use smtp::SmtpSender;

use async_trait::async_trait;
use core_config::{env_or_default, env_parse_or, ConfigError, FromEnv};
use std::fmt;

use crate::models::OutgoingEmail;

/// Transmits a fully resolved message.
///
/// `Ok(false)` means the backend refused the message; `Err` is a transport
/// failure. Callers treat both as a failed delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> eyre::Result<bool>;

    fn name(&self) -> &'static str;
}

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_FROM_NAME: &str = "Mailer";

/// Connection security, derived from the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Upgrade a plain connection (submission port 587)
    StartTls,
    /// TLS from the first byte (port 465)
    ImplicitTls,
    /// No encryption, for local catchers like Mailpit
    Plain,
}

impl SmtpSecurity {
    pub fn from_port(port: u16) -> Self {
        match port {
            587 => SmtpSecurity::StartTls,
            465 => SmtpSecurity::ImplicitTls,
            _ => SmtpSecurity::Plain,
        }
    }
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub from_name: String,
    pub security: SmtpSecurity,
}

impl SmtpConfig {
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("security", &self.security)
            .finish()
    }
}

impl FromEnv for SmtpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = env_parse_or("SMTP_PORT", DEFAULT_SMTP_PORT)?;
        let username = std::env::var("SMTP_USER")
            .or_else(|_| std::env::var("SMTP_USERNAME"))
            .unwrap_or_default();
        let from_address = std::env::var("EMAIL_FROM_ADDRESS")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| username.clone());

        Ok(Self {
            host: env_or_default("SMTP_HOST", DEFAULT_SMTP_HOST),
            port,
            username,
            password: env_or_default("SMTP_PASSWORD", ""),
            from_address,
            from_name: env_or_default("EMAIL_FROM_NAME", DEFAULT_FROM_NAME),
            security: SmtpSecurity::from_port(port),
        })
    }
}
