use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryOrder,
    QuerySelect, Select,
};
use uuid::Uuid;

use crate::{
    entity,
    error::EmailResult,
    models::{EmailRecord, EmailStatus, MAX_OFFSET, NewEmailRecord, UpdateEmail},
    repository::EmailRepository,
};

pub struct PgEmailRepository {
    db: DatabaseConnection,
}

impl PgEmailRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn list_query(skip: u64, limit: u64) -> Select<entity::Entity> {
        entity::Entity::find()
            .order_by_asc(entity::Column::CreatedAt)
            .order_by_asc(entity::Column::Id)
            .offset(skip.min(MAX_OFFSET))
            .limit(limit)
    }

    /// Writes the mutable columns of `record` over `model`.
    ///
    /// A row deleted concurrently is reported as `None`.
    async fn save(
        &self,
        model: entity::Model,
        record: EmailRecord,
    ) -> EmailResult<Option<EmailRecord>> {
        let mut active: entity::ActiveModel = model.into();
        active.status = Set(record.status);
        active.error_message = Set(record.error_message);
        active.sent_at = Set(record.sent_at.map(Into::into));
        active.updated_at = Set(record.updated_at.into());

        match active.update(&self.db).await {
            Ok(updated) => Ok(Some(updated.into())),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl EmailRepository for PgEmailRepository {
    async fn create(&self, input: NewEmailRecord) -> EmailResult<EmailRecord> {
        let active_model: entity::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(email_id = %model.id, "Created email record");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> EmailResult<Option<EmailRecord>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn get_all(&self, skip: u64, limit: u64) -> EmailResult<Vec<EmailRecord>> {
        let models = Self::list_query(skip, limit).all(&self.db).await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, input: UpdateEmail) -> EmailResult<Option<EmailRecord>> {
        let Some(model) = entity::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut record: EmailRecord = model.clone().into();
        record.apply_update(input);

        let updated = self.save(model, record).await?;
        if updated.is_some() {
            tracing::info!(email_id = %id, "Updated email record");
        }
        Ok(updated)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: EmailStatus,
        error_message: Option<String>,
    ) -> EmailResult<Option<EmailRecord>> {
        let Some(model) = entity::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut record: EmailRecord = model.clone().into();
        record.apply_status(status, error_message);

        let updated = self.save(model, record).await?;
        if updated.is_some() {
            tracing::info!(email_id = %id, status = %status, "Updated email status");
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> EmailResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(email_id = %id, "Deleted email record");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count(&self) -> EmailResult<u64> {
        let count = entity::Entity::find().count(&self.db).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmailError;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};
    use std::collections::BTreeMap;

    fn model(status: EmailStatus) -> entity::Model {
        let now = Utc::now();
        entity::Model {
            id: Uuid::now_v7(),
            recipient: "user@example.com".to_string(),
            subject: "Hello".to_string(),
            body: Some("hi".to_string()),
            html_body: Some("<html><body><p>hi</p></body></html>".to_string()),
            status,
            error_message: None,
            sent_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_create_returns_inserted_row() {
        let row = model(EmailStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();
        let repo = PgEmailRepository::new(db);

        let record = repo
            .create(NewEmailRecord {
                recipient: row.recipient.clone(),
                subject: row.subject.clone(),
                body: row.body.clone(),
                html_body: row.html_body.clone(),
            })
            .await
            .unwrap();

        assert_eq!(record.id, row.id);
        assert_eq!(record.status, EmailStatus::Pending);
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgEmailRepository::new(db);

        assert!(repo.get_by_id(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[test]
    fn test_list_query_is_ordered_and_paged() {
        let sql = PgEmailRepository::list_query(10, 10)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"ORDER BY "emails"."created_at" ASC, "emails"."id" ASC"#));
        assert!(sql.contains("LIMIT 10"));
        assert!(sql.contains("OFFSET 10"));
    }

    #[test]
    fn test_list_query_offset_fits_signed_bind() {
        let statement = PgEmailRepository::list_query(u64::MAX - 115, 100)
            .build(DatabaseBackend::Postgres);

        assert!(
            statement
                .to_string()
                .contains(&format!("OFFSET {}", i64::MAX))
        );
    }

    #[tokio::test]
    async fn test_get_all_past_the_end_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgEmailRepository::new(db);

        let records = repo.get_all(u64::MAX, 100).await.unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_update_status_writes_returned_row() {
        let row = model(EmailStatus::Pending);
        let mut sent = row.clone();
        sent.status = EmailStatus::Sent;
        sent.sent_at = Some(Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()], vec![sent.clone()]])
            .into_connection();
        let repo = PgEmailRepository::new(db);

        let record = repo
            .update_status(row.id, EmailStatus::Sent, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.status, EmailStatus::Sent);
        assert!(record.sent_at.is_some());
    }

    #[tokio::test]
    async fn test_update_status_missing_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgEmailRepository::new(db);

        let result = repo
            .update_status(Uuid::now_v7(), EmailStatus::Failed, Some("x".into()))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repo = PgEmailRepository::new(db);

        assert!(repo.delete(Uuid::now_v7()).await.unwrap());
        assert!(!repo.delete(Uuid::now_v7()).await.unwrap());
    }

    #[tokio::test]
    async fn test_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([(
                "num_items",
                sea_orm::Value::BigInt(Some(25)),
            )])]])
            .into_connection();
        let repo = PgEmailRepository::new(db);

        assert_eq!(repo.count().await.unwrap(), 25);
    }

    #[tokio::test]
    async fn test_query_errors_map_to_database_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let repo = PgEmailRepository::new(db);

        let err = repo.get_by_id(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, EmailError::Database(msg) if msg.contains("connection reset")));
    }
}
