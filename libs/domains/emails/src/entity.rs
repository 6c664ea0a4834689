use crate::models::{EmailRecord, EmailStatus, NewEmailRecord};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM Entity for the emails table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "emails")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub recipient: String,
    pub subject: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub body: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub html_body: Option<String>,
    pub status: EmailStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
    pub sent_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for EmailRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            recipient: model.recipient,
            subject: model.subject,
            body: model.body,
            html_body: model.html_body,
            status: model.status,
            error_message: model.error_message,
            sent_at: model.sent_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<EmailRecord> for Model {
    fn from(record: EmailRecord) -> Self {
        Self {
            id: record.id,
            recipient: record.recipient,
            subject: record.subject,
            body: record.body,
            html_body: record.html_body,
            status: record.status,
            error_message: record.error_message,
            sent_at: record.sent_at.map(Into::into),
            created_at: record.created_at.into(),
            updated_at: record.updated_at.into(),
        }
    }
}

// New records always start out pending
impl From<NewEmailRecord> for ActiveModel {
    fn from(input: NewEmailRecord) -> Self {
        let record = EmailRecord::pending(input);
        ActiveModel {
            id: Set(record.id),
            recipient: Set(record.recipient),
            subject: Set(record.subject),
            body: Set(record.body),
            html_body: Set(record.html_body),
            status: Set(EmailStatus::Pending),
            error_message: Set(None),
            sent_at: Set(None),
            created_at: Set(record.created_at.into()),
            updated_at: Set(record.updated_at.into()),
        }
    }
}
