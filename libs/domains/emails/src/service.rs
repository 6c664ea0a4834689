use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::content::resolve_content;
use crate::error::{EmailError, EmailResult};
use crate::models::{
    EmailListResponse, EmailRecord, EmailStatus, MAX_OFFSET, MAX_PAGE_SIZE, NewEmailRecord,
    OutgoingEmail, SendEmailRequest, UpdateEmail,
};
use crate::repository::EmailRepository;
use crate::sender::EmailSender;
use crate::templates::TemplateRenderer;

/// Recorded when the backend refuses a message without raising an error.
pub const DELIVERY_FAILED_MESSAGE: &str = "Failed to send email";

/// Send orchestration plus the record lifecycle operations
pub struct EmailService<R: EmailRepository> {
    repository: Arc<R>,
    sender: Arc<dyn EmailSender>,
    templates: Option<Arc<dyn TemplateRenderer>>,
}

impl<R: EmailRepository> EmailService<R> {
    pub fn new(repository: R, sender: Arc<dyn EmailSender>) -> Self {
        Self {
            repository: Arc::new(repository),
            sender,
            templates: None,
        }
    }

    pub fn with_templates(mut self, templates: Arc<dyn TemplateRenderer>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Resolve content, store a pending record, deliver, then record the outcome.
    ///
    /// Delivery failures end in a `failed` record, not an error. The returned
    /// record is the store's copy after the status update.
    #[instrument(skip(self, request), fields(recipient = %request.recipient))]
    pub async fn send_email(&self, request: SendEmailRequest) -> EmailResult<EmailRecord> {
        request.validate()?;

        let content = resolve_content(&request, self.templates.as_ref()).await?;

        let record = self
            .repository
            .create(NewEmailRecord {
                recipient: request.recipient,
                subject: request.subject,
                body: Some(content.body.clone()),
                html_body: Some(content.html_body.clone()),
            })
            .await?;

        let outgoing = OutgoingEmail {
            recipient: record.recipient.clone(),
            subject: record.subject.clone(),
            body: content.body,
            html_body: Some(content.html_body),
        };

        let (status, error_message) = match self.sender.send(&outgoing).await {
            Ok(true) => (EmailStatus::Sent, None),
            Ok(false) => {
                tracing::warn!(email_id = %record.id, "Delivery backend refused email");
                (EmailStatus::Failed, Some(DELIVERY_FAILED_MESSAGE.to_string()))
            }
            Err(err) => {
                let message = format!("{:#}", err);
                tracing::error!(
                    email_id = %record.id,
                    sender = self.sender.name(),
                    error = %message,
                    "Email delivery failed"
                );
                (EmailStatus::Failed, Some(message))
            }
        };

        self.repository
            .update_status(record.id, status, error_message)
            .await?
            .ok_or_else(|| {
                tracing::error!(email_id = %record.id, "Email record vanished before its status was stored");
                EmailError::Internal(format!(
                    "Email {} was removed before its delivery status could be stored",
                    record.id
                ))
            })
    }

    #[instrument(skip(self), fields(email_id = %id))]
    pub async fn get_email(&self, id: Uuid) -> EmailResult<EmailRecord> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(EmailError::NotFound(id))
    }

    /// One page of records; `page` is 1-based.
    #[instrument(skip(self))]
    pub async fn get_all_emails(&self, page: u64, page_size: u64) -> EmailResult<EmailListResponse> {
        if page < 1 {
            return Err(EmailError::Validation("page must be at least 1".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(EmailError::Validation(format!(
                "pageSize must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        // Pages past the end come back empty instead of overflowing the offset
        let skip = (page - 1)
            .checked_mul(page_size)
            .map_or(MAX_OFFSET, |skip| skip.min(MAX_OFFSET));
        let emails = self.repository.get_all(skip, page_size).await?;
        let total = self.repository.count().await?;

        Ok(EmailListResponse {
            emails,
            total,
            page,
            page_size,
        })
    }

    /// Manual correction. Bypasses the delivery state machine.
    #[instrument(skip(self, input), fields(email_id = %id))]
    pub async fn update_email(&self, id: Uuid, input: UpdateEmail) -> EmailResult<EmailRecord> {
        input.validate()?;

        self.repository
            .update(id, input)
            .await?
            .ok_or(EmailError::NotFound(id))
    }

    #[instrument(skip(self), fields(email_id = %id))]
    pub async fn delete_email(&self, id: Uuid) -> EmailResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(EmailError::NotFound(id));
        }

        Ok(())
    }

    /// Template names known to the renderer; empty when none is configured.
    pub async fn list_templates(&self) -> EmailResult<Vec<String>> {
        let Some(templates) = self.templates.clone() else {
            return Ok(Vec::new());
        };

        tokio::task::spawn_blocking(move || templates.list_templates())
            .await
            .map_err(|e| EmailError::Internal(format!("Template task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{EMPTY_HTML, PLAIN_TEXT_FALLBACK};
    use crate::repository::MockEmailRepository;
    use crate::sender::MockEmailSender;
    use crate::templates::InMemoryTemplateRenderer;
    use mockall::predicate::{always, eq};
    use std::sync::Mutex;

    fn request(body: Option<&str>) -> SendEmailRequest {
        SendEmailRequest {
            recipient: "user@example.com".to_string(),
            subject: "Hello".to_string(),
            body: body.map(str::to_string),
            ..Default::default()
        }
    }

    /// Repository mock that stores the created record and applies status updates to it.
    fn recording_repo() -> (MockEmailRepository, Arc<Mutex<Option<EmailRecord>>>) {
        let stored = Arc::new(Mutex::new(None::<EmailRecord>));
        let mut repo = MockEmailRepository::new();

        let on_create = stored.clone();
        repo.expect_create().times(1).returning(move |input| {
            let record = EmailRecord::pending(input);
            *on_create.lock().unwrap() = Some(record.clone());
            Ok(record)
        });

        let on_update = stored.clone();
        repo.expect_update_status()
            .times(1)
            .returning(move |id, status, error_message| {
                let mut guard = on_update.lock().unwrap();
                let record = guard.as_mut().filter(|r| r.id == id).map(|r| {
                    r.apply_status(status, error_message);
                    r.clone()
                });
                Ok(record)
            });

        (repo, stored)
    }

    fn sender_returning(result: fn() -> eyre::Result<bool>) -> Arc<dyn EmailSender> {
        let mut sender = MockEmailSender::new();
        sender.expect_send().times(1).returning(move |_| result());
        sender.expect_name().return_const("mock");
        Arc::new(sender)
    }

    #[tokio::test]
    async fn test_send_success_marks_sent() {
        let (repo, stored) = recording_repo();
        let service = EmailService::new(repo, sender_returning(|| Ok(true)));

        let record = service.send_email(request(Some("hi"))).await.unwrap();

        assert_eq!(record.status, EmailStatus::Sent);
        assert!(record.sent_at.is_some());
        assert!(record.error_message.is_none());
        assert_eq!(record.body.as_deref(), Some("hi"));
        assert_eq!(
            record.html_body.as_deref(),
            Some("<html><body><p>hi</p></body></html>")
        );
        assert_eq!(stored.lock().unwrap().as_ref(), Some(&record));
    }

    #[tokio::test]
    async fn test_send_rejected_marks_failed() {
        let (repo, _) = recording_repo();
        let service = EmailService::new(repo, sender_returning(|| Ok(false)));

        let record = service.send_email(request(Some("hi"))).await.unwrap();

        assert_eq!(record.status, EmailStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some(DELIVERY_FAILED_MESSAGE));
        assert!(record.sent_at.is_none());
    }

    #[tokio::test]
    async fn test_send_transport_error_marks_failed_with_message() {
        let (repo, _) = recording_repo();
        let service = EmailService::new(repo, sender_returning(|| Err(eyre::eyre!("timeout"))));

        let record = service.send_email(request(Some("hi"))).await.unwrap();

        assert_eq!(record.status, EmailStatus::Failed);
        assert!(record.error_message.unwrap().contains("timeout"));
        assert!(record.sent_at.is_none());
    }

    #[tokio::test]
    async fn test_send_empty_request_uses_fallbacks() {
        let (repo, _) = recording_repo();

        let mut sender = MockEmailSender::new();
        sender
            .expect_send()
            .withf(|email| {
                email.body == PLAIN_TEXT_FALLBACK && email.html_body.as_deref() == Some(EMPTY_HTML)
            })
            .times(1)
            .returning(|_| Ok(true));
        sender.expect_name().return_const("mock");

        let service = EmailService::new(repo, Arc::new(sender));
        let record = service.send_email(request(None)).await.unwrap();

        assert_eq!(record.body.as_deref(), Some(PLAIN_TEXT_FALLBACK));
        assert_eq!(record.html_body.as_deref(), Some(EMPTY_HTML));
    }

    #[tokio::test]
    async fn test_send_html_wins_over_template() {
        let (repo, _) = recording_repo();
        let service = EmailService::new(repo, sender_returning(|| Ok(true)))
            .with_templates(Arc::new(InMemoryTemplateRenderer::with_defaults()));

        let req = SendEmailRequest {
            html_body: Some("<b>custom</b>".to_string()),
            template_name: Some("welcome".to_string()),
            ..request(None)
        };

        let record = service.send_email(req).await.unwrap();
        assert_eq!(record.html_body.as_deref(), Some("<b>custom</b>"));
    }

    #[tokio::test]
    async fn test_send_missing_template_falls_back() {
        let (repo, _) = recording_repo();
        let service = EmailService::new(repo, sender_returning(|| Ok(true)))
            .with_templates(Arc::new(InMemoryTemplateRenderer::with_defaults()));

        let req = SendEmailRequest {
            template_name: Some("missing".to_string()),
            ..request(Some("hi"))
        };

        let record = service.send_email(req).await.unwrap();
        assert_eq!(
            record.html_body.as_deref(),
            Some("<html><body><p>hi</p></body></html>")
        );
        assert_eq!(record.status, EmailStatus::Sent);
    }

    #[tokio::test]
    async fn test_send_invalid_request_touches_nothing() {
        let repo = MockEmailRepository::new();
        let sender = MockEmailSender::new();
        let service = EmailService::new(repo, Arc::new(sender));

        let req = SendEmailRequest {
            recipient: "not-an-email".to_string(),
            ..request(Some("hi"))
        };

        let err = service.send_email(req).await.unwrap_err();
        assert!(matches!(err, EmailError::Validation(_)));
    }

    #[tokio::test]
    async fn test_send_create_failure_skips_delivery() {
        let mut repo = MockEmailRepository::new();
        repo.expect_create()
            .returning(|_| Err(EmailError::Database("connection refused".to_string())));
        let mut sender = MockEmailSender::new();
        sender.expect_name().return_const("mock");

        let service = EmailService::new(repo, Arc::new(sender));
        let err = service.send_email(request(Some("hi"))).await.unwrap_err();

        assert!(matches!(err, EmailError::Database(_)));
    }

    #[tokio::test]
    async fn test_send_status_update_failure_is_fatal() {
        let mut repo = MockEmailRepository::new();
        repo.expect_create()
            .returning(|input| Ok(EmailRecord::pending(input)));
        repo.expect_update_status()
            .returning(|_, _, _| Err(EmailError::Database("write failed".to_string())));

        let service = EmailService::new(repo, sender_returning(|| Ok(true)));
        let err = service.send_email(request(Some("hi"))).await.unwrap_err();

        assert!(matches!(err, EmailError::Database(_)));
    }

    #[tokio::test]
    async fn test_send_record_vanished_is_internal_error() {
        let mut repo = MockEmailRepository::new();
        repo.expect_create()
            .returning(|input| Ok(EmailRecord::pending(input)));
        repo.expect_update_status()
            .with(always(), eq(EmailStatus::Sent), eq(None::<String>))
            .returning(|_, _, _| Ok(None));

        let service = EmailService::new(repo, sender_returning(|| Ok(true)));
        let err = service.send_email(request(Some("hi"))).await.unwrap_err();

        assert!(matches!(err, EmailError::Internal(_)));
    }

    #[tokio::test]
    async fn test_get_email_not_found() {
        let mut repo = MockEmailRepository::new();
        let id = Uuid::now_v7();
        repo.expect_get_by_id().with(eq(id)).returning(|_| Ok(None));

        let service = EmailService::new(repo, Arc::new(MockEmailSender::new()));
        let err = service.get_email(id).await.unwrap_err();

        assert!(matches!(err, EmailError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_get_all_emails_converts_page_to_skip() {
        let mut repo = MockEmailRepository::new();
        repo.expect_get_all()
            .with(eq(10u64), eq(10u64))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        repo.expect_count().times(1).returning(|| Ok(25));

        let service = EmailService::new(repo, Arc::new(MockEmailSender::new()));
        let page = service.get_all_emails(2, 10).await.unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.page, 2);
        assert_eq!(page.page_size, 10);
    }

    #[tokio::test]
    async fn test_get_all_emails_clamps_huge_page_offset() {
        let mut repo = MockEmailRepository::new();
        repo.expect_get_all()
            .withf(|skip, limit| *skip <= i64::MAX as u64 && *limit == 100)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        repo.expect_count().times(1).returning(|| Ok(25));

        let service = EmailService::new(repo, Arc::new(MockEmailSender::new()));
        let page = service.get_all_emails(u64::MAX / 100, 100).await.unwrap();

        assert!(page.emails.is_empty());
        assert_eq!(page.total, 25);
        assert_eq!(page.page, u64::MAX / 100);
    }

    #[tokio::test]
    async fn test_get_all_emails_rejects_bad_bounds_before_store() {
        let service = EmailService::new(
            MockEmailRepository::new(),
            Arc::new(MockEmailSender::new()),
        );

        for (page, page_size) in [(0, 10), (1, 0), (1, 101)] {
            let err = service.get_all_emails(page, page_size).await.unwrap_err();
            assert!(matches!(err, EmailError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_update_email_passes_fields_through() {
        let mut repo = MockEmailRepository::new();
        let record = EmailRecord::pending(NewEmailRecord {
            recipient: "user@example.com".to_string(),
            subject: "Hello".to_string(),
            body: None,
            html_body: None,
        });
        let id = record.id;
        let input = UpdateEmail {
            status: Some(EmailStatus::Failed),
            error_message: Some("bounced".to_string()),
        };

        repo.expect_update()
            .with(eq(id), eq(input.clone()))
            .returning(move |_, input| {
                let mut updated = record.clone();
                updated.apply_update(input);
                Ok(Some(updated))
            });

        let service = EmailService::new(repo, Arc::new(MockEmailSender::new()));
        let updated = service.update_email(id, input).await.unwrap();

        assert_eq!(updated.status, EmailStatus::Failed);
        assert_eq!(updated.error_message.as_deref(), Some("bounced"));
    }

    #[tokio::test]
    async fn test_delete_email_not_found() {
        let mut repo = MockEmailRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let service = EmailService::new(repo, Arc::new(MockEmailSender::new()));
        let err = service.delete_email(Uuid::now_v7()).await.unwrap_err();

        assert!(matches!(err, EmailError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_templates() {
        let service = EmailService::new(
            MockEmailRepository::new(),
            Arc::new(MockEmailSender::new()),
        );
        assert!(service.list_templates().await.unwrap().is_empty());

        let service = service.with_templates(Arc::new(InMemoryTemplateRenderer::with_defaults()));
        assert_eq!(service.list_templates().await.unwrap(), vec!["welcome"]);
    }
}
