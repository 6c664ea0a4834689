use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Mailer API",
        version = "0.1.0",
        description = "Transactional email sending with delivery status tracking"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/emails", api = domain_emails::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;
