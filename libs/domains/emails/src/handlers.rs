use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{
    AppError, UuidPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, DeliveryFailedResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::{
    error::EmailResult,
    models::{
        DeleteEmailResponse, EmailListQuery, EmailListResponse, EmailRecord, EmailStatus,
        SendEmailRequest, TemplateListResponse, UpdateEmail,
    },
    repository::EmailRepository,
    service::{DELIVERY_FAILED_MESSAGE, EmailService},
};

/// OpenAPI documentation for the Emails API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_emails,
        send_email,
        list_templates,
        get_email,
        update_email,
        delete_email
    ),
    components(
        schemas(
            EmailRecord,
            EmailStatus,
            SendEmailRequest,
            UpdateEmail,
            EmailListResponse,
            DeleteEmailResponse,
            TemplateListResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            DeliveryFailedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "emails", description = "Transactional email sending and records")
    )
)]
pub struct ApiDoc;

/// Create Axum router for email endpoints
pub fn router<R>(service: EmailService<R>) -> Router
where
    R: EmailRepository + 'static,
{
    let service = Arc::new(service);

    Router::new()
        .route("/", get(list_emails))
        .route("/send", post(send_email))
        .route("/templates", get(list_templates))
        .route(
            "/{id}",
            get(get_email).put(update_email).delete(delete_email),
        )
        .with_state(service)
}

/// List stored emails, oldest first
#[utoipa::path(
    get,
    path = "",
    tag = "emails",
    params(EmailListQuery),
    responses(
        (status = 200, description = "One page of email records", body = EmailListResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_emails<R>(
    State(service): State<Arc<EmailService<R>>>,
    ValidatedQuery(query): ValidatedQuery<EmailListQuery>,
) -> EmailResult<impl IntoResponse>
where
    R: EmailRepository,
{
    let page = service.get_all_emails(query.page, query.page_size).await?;
    Ok(Json(page))
}

/// Send an email and store the attempt
///
/// Returns the stored record. When delivery fails the record is still stored
/// (status `failed`) and returned in the error `details`.
#[utoipa::path(
    post,
    path = "/send",
    tag = "emails",
    request_body = SendEmailRequest,
    responses(
        (status = 201, description = "Email sent", body = EmailRecord),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = DeliveryFailedResponse)
    )
)]
async fn send_email<R>(
    State(service): State<Arc<EmailService<R>>>,
    ValidatedJson(input): ValidatedJson<SendEmailRequest>,
) -> Result<Response, AppError>
where
    R: EmailRepository,
{
    let record = service.send_email(input).await?;

    if record.status == EmailStatus::Failed {
        let message = record
            .error_message
            .clone()
            .unwrap_or_else(|| DELIVERY_FAILED_MESSAGE.to_string());
        return Err(AppError::DeliveryFailed {
            message,
            details: serde_json::to_value(&record)?,
        });
    }

    Ok((StatusCode::CREATED, Json(record)).into_response())
}

/// List available template names
#[utoipa::path(
    get,
    path = "/templates",
    tag = "emails",
    responses(
        (status = 200, description = "Template names", body = TemplateListResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_templates<R>(
    State(service): State<Arc<EmailService<R>>>,
) -> EmailResult<impl IntoResponse>
where
    R: EmailRepository,
{
    let templates = service.list_templates().await?;
    Ok(Json(TemplateListResponse { templates }))
}

/// Get an email record by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "emails",
    params(
        ("id" = Uuid, Path, description = "Email ID")
    ),
    responses(
        (status = 200, description = "Email found", body = EmailRecord),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_email<R>(
    State(service): State<Arc<EmailService<R>>>,
    UuidPath(id): UuidPath,
) -> EmailResult<impl IntoResponse>
where
    R: EmailRepository,
{
    let record = service.get_email(id).await?;
    Ok(Json(record))
}

/// Manually correct an email's status or error message
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "emails",
    params(
        ("id" = Uuid, Path, description = "Email ID")
    ),
    request_body = UpdateEmail,
    responses(
        (status = 200, description = "Email updated", body = EmailRecord),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_email<R>(
    State(service): State<Arc<EmailService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateEmail>,
) -> EmailResult<impl IntoResponse>
where
    R: EmailRepository,
{
    let record = service.update_email(id, input).await?;
    Ok(Json(record))
}

/// Delete an email record
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "emails",
    params(
        ("id" = Uuid, Path, description = "Email ID")
    ),
    responses(
        (status = 200, description = "Email deleted", body = DeleteEmailResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_email<R>(
    State(service): State<Arc<EmailService<R>>>,
    UuidPath(id): UuidPath,
) -> EmailResult<impl IntoResponse>
where
    R: EmailRepository,
{
    service.delete_email(id).await?;
    Ok(Json(DeleteEmailResponse { id, deleted: true }))
}
