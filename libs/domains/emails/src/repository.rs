use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::EmailResult;
use crate::models::{EmailRecord, EmailStatus, NewEmailRecord, UpdateEmail};

/// Persistence contract for email records.
///
/// Missing ids are reported as `None`/`false`, never as errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailRepository: Send + Sync {
    /// Store a new record. The status is always `pending`.
    async fn create(&self, input: NewEmailRecord) -> EmailResult<EmailRecord>;

    async fn get_by_id(&self, id: Uuid) -> EmailResult<Option<EmailRecord>>;

    /// Records in a stable order, sliced by `skip`/`limit`.
    async fn get_all(&self, skip: u64, limit: u64) -> EmailResult<Vec<EmailRecord>>;

    /// Apply the supplied fields directly.
    async fn update(&self, id: Uuid, input: UpdateEmail) -> EmailResult<Option<EmailRecord>>;

    /// Record a delivery outcome. Sets `sent_at` iff `status` is `sent`.
    async fn update_status(
        &self,
        id: Uuid,
        status: EmailStatus,
        error_message: Option<String>,
    ) -> EmailResult<Option<EmailRecord>>;

    async fn delete(&self, id: Uuid) -> EmailResult<bool>;

    async fn count(&self) -> EmailResult<u64>;
}

/// Process-local store used when no database is configured.
///
/// Records are kept in insertion order.
#[derive(Default)]
pub struct InMemoryEmailRepository {
    records: RwLock<Vec<EmailRecord>>,
}

impl InMemoryEmailRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmailRepository for InMemoryEmailRepository {
    async fn create(&self, input: NewEmailRecord) -> EmailResult<EmailRecord> {
        let record = EmailRecord::pending(input);
        self.records.write().await.push(record.clone());

        tracing::info!(email_id = %record.id, "Created email record");
        Ok(record)
    }

    async fn get_by_id(&self, id: Uuid) -> EmailResult<Option<EmailRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn get_all(&self, skip: u64, limit: u64) -> EmailResult<Vec<EmailRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, input: UpdateEmail) -> EmailResult<Option<EmailRecord>> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        record.apply_update(input);
        tracing::info!(email_id = %id, "Updated email record");
        Ok(Some(record.clone()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: EmailStatus,
        error_message: Option<String>,
    ) -> EmailResult<Option<EmailRecord>> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        record.apply_status(status, error_message);
        tracing::info!(email_id = %id, status = %status, "Updated email status");
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: Uuid) -> EmailResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);

        let deleted = records.len() < before;
        if deleted {
            tracing::info!(email_id = %id, "Deleted email record");
        }
        Ok(deleted)
    }

    async fn count(&self) -> EmailResult<u64> {
        Ok(self.records.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record(n: usize) -> NewEmailRecord {
        NewEmailRecord {
            recipient: format!("user{}@example.com", n),
            subject: format!("Subject {}", n),
            body: Some("hi".to_string()),
            html_body: None,
        }
    }

    #[tokio::test]
    async fn test_create_is_always_pending() {
        let repo = InMemoryEmailRepository::new();
        let record = repo.create(new_record(1)).await.unwrap();

        assert_eq!(record.status, EmailStatus::Pending);
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.get_by_id(record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_missing_ids_are_absent_not_errors() {
        let repo = InMemoryEmailRepository::new();
        let id = Uuid::now_v7();

        assert!(repo.get_by_id(id).await.unwrap().is_none());
        assert!(repo.update(id, UpdateEmail::default()).await.unwrap().is_none());
        assert!(
            repo.update_status(id, EmailStatus::Sent, None)
                .await
                .unwrap()
                .is_none()
        );
        assert!(!repo.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_all_preserves_insertion_order() {
        let repo = InMemoryEmailRepository::new();
        for n in 0..25 {
            repo.create(new_record(n)).await.unwrap();
        }

        let page = repo.get_all(10, 10).await.unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].recipient, "user10@example.com");
        assert_eq!(page[9].recipient, "user19@example.com");

        let tail = repo.get_all(20, 10).await.unwrap();
        assert_eq!(tail.len(), 5);

        assert!(repo.get_all(30, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_sent_and_failed() {
        let repo = InMemoryEmailRepository::new();
        let record = repo.create(new_record(1)).await.unwrap();

        let failed = repo
            .update_status(record.id, EmailStatus::Failed, Some("boom".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(failed.error_message.as_deref(), Some("boom"));
        assert!(failed.sent_at.is_none());

        let sent = repo
            .update_status(record.id, EmailStatus::Sent, None)
            .await
            .unwrap()
            .unwrap();
        assert!(sent.sent_at.is_some());
        assert!(sent.error_message.is_none());
        assert!(sent.updated_at >= record.updated_at);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let repo = InMemoryEmailRepository::new();
        let record = repo.create(new_record(1)).await.unwrap();

        assert!(repo.delete(record.id).await.unwrap());
        assert!(repo.get_by_id(record.id).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
