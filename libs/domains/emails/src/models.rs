use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Largest offset Postgres accepts (a signed 64-bit bind).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Delivery status of an email record
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "email_status")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmailStatus {
    /// Stored, delivery not attempted yet
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl EmailStatus {
    /// `sent` and `failed` have no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EmailStatus::Pending)
    }
}

/// A persisted email send attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    pub id: Uuid,
    pub recipient: String,
    pub subject: String,
    /// Plain-text body
    pub body: Option<String>,
    /// Resolved HTML body
    pub html_body: Option<String>,
    pub status: EmailStatus,
    /// Set only when `status` is `failed`
    pub error_message: Option<String>,
    /// Set only when `status` is `sent`
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmailRecord {
    /// Builds a fresh `pending` record with a time-ordered id.
    pub fn pending(input: NewEmailRecord) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            recipient: input.recipient,
            subject: input.subject,
            body: input.body,
            html_body: input.html_body,
            status: EmailStatus::Pending,
            error_message: None,
            sent_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Manual correction: copies the supplied fields as-is.
    pub fn apply_update(&mut self, update: UpdateEmail) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(error_message) = update.error_message {
            self.error_message = Some(error_message);
        }
        self.updated_at = Utc::now();
    }

    /// Delivery outcome: `sent_at` tracks `sent`, `error_message` tracks `failed`.
    pub fn apply_status(&mut self, status: EmailStatus, error_message: Option<String>) {
        let now = Utc::now();
        self.status = status;
        self.sent_at = (status == EmailStatus::Sent).then_some(now);
        if status != EmailStatus::Failed {
            self.error_message = None;
        } else if error_message.is_some() {
            self.error_message = error_message;
        }
        self.updated_at = now;
    }
}

/// Data the store needs to create a record. Status is always `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmailRecord {
    pub recipient: String,
    pub subject: String,
    pub body: Option<String>,
    pub html_body: Option<String>,
}

/// Request to send an email
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    #[validate(email)]
    #[schema(example = "user@example.com")]
    pub recipient: String,
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Welcome aboard")]
    pub subject: String,
    /// Plain-text body
    #[serde(default)]
    pub body: Option<String>,
    /// Caller-supplied HTML, used verbatim
    #[serde(default, alias = "html_body")]
    pub html_body: Option<String>,
    /// Template to render when no HTML is supplied
    #[serde(default, alias = "template_name")]
    #[schema(example = "welcome")]
    pub template_name: Option<String>,
    /// Values exposed to the template
    #[serde(default, alias = "template_data")]
    #[schema(value_type = Option<Object>)]
    pub template_data: Option<HashMap<String, Value>>,
}

/// Manual correction of a record's status fields
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmail {
    pub status: Option<EmailStatus>,
    #[serde(default, alias = "error_message")]
    #[validate(length(max = 2000))]
    pub error_message: Option<String>,
}

/// Pagination parameters for listing emails
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct EmailListQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    #[param(default = 1, minimum = 1)]
    pub page: u64,
    /// Records per page
    #[serde(default = "default_page_size", alias = "page_size")]
    #[validate(range(min = 1, max = 100))]
    #[param(default = 10, minimum = 1, maximum = 100)]
    pub page_size: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for EmailListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of email records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailListResponse {
    pub emails: Vec<EmailRecord>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteEmailResponse {
    pub id: Uuid,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TemplateListResponse {
    pub templates: Vec<String>,
}

/// A fully resolved message handed to a delivery backend
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub html_body: Option<String>,
}
