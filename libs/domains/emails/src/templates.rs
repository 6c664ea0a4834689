//! Email template rendering with Handlebars.
//!
//! - [`FileTemplateRenderer`] loads templates from a directory on every render
//! - [`InMemoryTemplateRenderer`] holds registered template strings
//!
//! Both escape interpolated values as HTML (`{{value}}`); use `{{{value}}}`
//! for trusted markup.

use handlebars::Handlebars;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions tried, in order, after the bare template name.
const TEMPLATE_EXTENSIONS: [&str; 2] = ["html.hbs", "html"];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    Render(String),
}

/// Renders named templates to HTML.
///
/// Rendering may block on file I/O; async callers should run it on a
/// blocking thread.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, name: &str, context: &Value) -> Result<String, TemplateError>;

    /// Names accepted by [`render`](Self::render), sorted.
    fn list_templates(&self) -> Vec<String>;
}

fn new_registry() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(false);
    handlebars
}

/// Templates must be plain file names inside the template directory.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

/// Handlebars renderer backed by a directory of template files.
///
/// A template named `welcome` resolves to the first existing file among
/// `welcome`, `welcome.html.hbs` and `welcome.html`.
pub struct FileTemplateRenderer {
    dir: PathBuf,
    handlebars: Handlebars<'static>,
}

impl FileTemplateRenderer {
    /// Uses `dir` as the template root, creating it when missing.
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        tracing::info!(templates_dir = %dir.display(), "Template directory ready");
        Ok(Self {
            dir,
            handlebars: new_registry(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_source(&self, name: &str) -> Result<String, TemplateError> {
        if !is_safe_name(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }

        let candidates = std::iter::once(name.to_string()).chain(
            TEMPLATE_EXTENSIONS
                .iter()
                .map(|ext| format!("{}.{}", name, ext)),
        );

        for candidate in candidates {
            let path = self.dir.join(&candidate);
            if !path.is_file() {
                continue;
            }
            return std::fs::read_to_string(&path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => TemplateError::NotFound(name.to_string()),
                _ => TemplateError::Render(format!("{}: {}", path.display(), e)),
            });
        }

        Err(TemplateError::NotFound(name.to_string()))
    }
}

impl TemplateRenderer for FileTemplateRenderer {
    fn render(&self, name: &str, context: &Value) -> Result<String, TemplateError> {
        let source = self.read_source(name)?;
        self.handlebars
            .render_template(&source, context)
            .map_err(|e| TemplateError::Render(e.to_string()))
    }

    fn list_templates(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(templates_dir = %self.dir.display(), error = %e, "Cannot list templates");
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .map(|file_name| {
                TEMPLATE_EXTENSIONS
                    .iter()
                    .find_map(|ext| file_name.strip_suffix(&format!(".{}", ext)))
                    .map(str::to_string)
                    .unwrap_or(file_name)
            })
            .collect();

        names.sort();
        names.dedup();
        names
    }
}

pub const WELCOME_TEMPLATE: &str = r#"<html>
<body>
  <h1>Welcome, {{name}}!</h1>
  <p>Thanks for signing up{{#if product}} for {{product}}{{/if}}.</p>
</body>
</html>"#;

/// Handlebars renderer over templates registered in memory.
pub struct InMemoryTemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl InMemoryTemplateRenderer {
    pub fn new() -> Self {
        Self {
            handlebars: new_registry(),
        }
    }

    /// Registry preloaded with a `welcome` template.
    pub fn with_defaults() -> Self {
        let mut renderer = Self::new();
        renderer
            .handlebars
            .register_template_string("welcome", WELCOME_TEMPLATE)
            .map_err(|e| tracing::error!(error = %e, "Invalid built-in template"))
            .ok();
        renderer
    }

    pub fn register(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        self.handlebars
            .register_template_string(name, source)
            .map_err(|e| TemplateError::Render(e.to_string()))
    }
}

impl Default for InMemoryTemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for InMemoryTemplateRenderer {
    fn render(&self, name: &str, context: &Value) -> Result<String, TemplateError> {
        if !self.handlebars.has_template(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        self.handlebars
            .render(name, context)
            .map_err(|e| TemplateError::Render(e.to_string()))
    }

    fn list_templates(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlebars.get_templates().keys().cloned().collect();
        names.sort();
        names
    }
}
