//! Turns a send request into the final plain-text and HTML bodies.
//!
//! Precedence is fixed: caller HTML, then template, then the plain body
//! wrapped in a minimal envelope, then an empty envelope. A missing template
//! falls back to the plain-body envelope; any other render failure is an error.
//! Empty strings count as absent.

use handlebars::html_escape;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::{EmailError, EmailResult};
use crate::models::SendEmailRequest;
use crate::templates::{TemplateError, TemplateRenderer};

/// Plain part used when the request carries no plain body.
pub const PLAIN_TEXT_FALLBACK: &str = "Please view this email in an HTML-compatible email client.";

pub const EMPTY_HTML: &str = "<html><body></body></html>";

/// Wraps escaped plain text in a minimal HTML document.
pub fn html_envelope(body: &str) -> String {
    format!("<html><body><p>{}</p></body></html>", html_escape(body))
}

/// Bodies stored on the record and handed to the delivery backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContent {
    pub body: String,
    pub html_body: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn plain_html(body: Option<&str>) -> String {
    body.map(html_envelope)
        .unwrap_or_else(|| EMPTY_HTML.to_string())
}

fn template_context(request: &SendEmailRequest) -> Value {
    let data: Map<String, Value> = request
        .template_data
        .clone()
        .map(|data| data.into_iter().collect())
        .unwrap_or_default();
    Value::Object(data)
}

/// Renders off the async runtime; file-backed renderers block on I/O.
///
/// Returns `Ok(None)` when the template does not exist.
async fn render_template(
    renderer: Arc<dyn TemplateRenderer>,
    name: String,
    context: Value,
) -> EmailResult<Option<String>> {
    let rendered = tokio::task::spawn_blocking(move || renderer.render(&name, &context))
        .await
        .map_err(|e| EmailError::Internal(format!("Template task failed: {}", e)))?;

    match rendered {
        Ok(html) => Ok(Some(html)),
        Err(TemplateError::NotFound(name)) => {
            tracing::warn!(template = %name, "Template not found, falling back to plain body");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn resolve_content(
    request: &SendEmailRequest,
    renderer: Option<&Arc<dyn TemplateRenderer>>,
) -> EmailResult<ResolvedContent> {
    let body = non_empty(&request.body);

    let html_body = match (non_empty(&request.html_body), non_empty(&request.template_name)) {
        (Some(html), _) => html.to_string(),
        (None, Some(name)) => {
            let rendered = match renderer {
                Some(renderer) => {
                    render_template(renderer.clone(), name.to_string(), template_context(request))
                        .await?
                }
                None => {
                    tracing::warn!(template = %name, "No template renderer configured");
                    None
                }
            };
            rendered.unwrap_or_else(|| plain_html(body))
        }
        (None, None) => plain_html(body),
    };

    Ok(ResolvedContent {
        body: body.unwrap_or(PLAIN_TEXT_FALLBACK).to_string(),
        html_body,
    })
}
