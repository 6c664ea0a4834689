//! Emails Domain
//!
//! Transactional email sending with a persisted record of every attempt.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌──────────────────┐
//! │   Service   │ ──▶ │ Content resolver │ ──▶ TemplateRenderer
//! └──┬───────┬──┘     └──────────────────┘
//!    │       │
//!    │  ┌────▼────────┐
//!    │  │ EmailSender │  ← SMTP / log / mock
//!    │  └─────────────┘
//! ┌──▼──────────┐
//! │ Repository  │  ← Postgres / in-memory
//! └─────────────┘
//! ```
//!
//! A send resolves content, stores a `pending` record, hands the message to
//! the sender and stores the outcome (`sent` or `failed`).
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_emails::{
//!     handlers, EmailService, InMemoryEmailRepository, InMemoryTemplateRenderer, LogSender,
//! };
//! use std::sync::Arc;
//!
//! let service = EmailService::new(InMemoryEmailRepository::new(), Arc::new(LogSender::new()))
//!     .with_templates(Arc::new(InMemoryTemplateRenderer::with_defaults()));
//!
//! let router = handlers::router(service);
//! ```

pub mod content;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod sender;
pub mod service;
pub mod templates;

// Re-export commonly used types
pub use error::{EmailError, EmailResult};
pub use models::{
    DeleteEmailResponse, EmailListQuery, EmailListResponse, EmailRecord, EmailStatus,
    NewEmailRecord, OutgoingEmail, SendEmailRequest, TemplateListResponse, UpdateEmail,
};
pub use postgres::PgEmailRepository;
pub use repository::{EmailRepository, InMemoryEmailRepository};
pub use sender::{EmailSender, LogSender, MockSender, SmtpConfig, SmtpSecurity, SmtpSender};
pub use service::EmailService;
pub use templates::{
    FileTemplateRenderer, InMemoryTemplateRenderer, TemplateError, TemplateRenderer,
};
