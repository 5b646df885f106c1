// src/content/render.rs

use std::sync::OnceLock;

use serde::Serialize;

use super::policy::ContentPolicy;
use super::sanitize::Sanitizer;

/// Sanitized markup ready for a read-only viewer.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedContent {
    pub html: String,
}

impl RenderedContent {
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

/// Read-only presentation surface for rich-text content.
///
/// Renders with the same policy the editable surface validates against, so a
/// document saved from the editor and rendered here is format-stable. The
/// viewer accepts no edit commands; rendering is sanitize-then-wrap.
pub struct ContentRenderer {
    sanitizer: Sanitizer,
    container_class: &'static str,
}

impl ContentRenderer {
    pub fn new(policy: &ContentPolicy) -> Self {
        Self {
            sanitizer: Sanitizer::from_policy(policy),
            container_class: "content-view",
        }
    }

    /// Sanitizes the markup and wraps it in the viewer container.
    /// Empty or fully-stripped input renders to the empty document.
    pub fn render(&self, markup: &str) -> RenderedContent {
        let clean = self.sanitizer.clean(markup);
        if clean.is_empty() {
            return RenderedContent {
                html: String::new(),
            };
        }
        RenderedContent {
            html: format!(r#"<div class="{}">{}</div>"#, self.container_class, clean),
        }
    }
}

/// Process-wide renderer over the default policy.
pub fn shared() -> &'static ContentRenderer {
    static SHARED: OnceLock<ContentRenderer> = OnceLock::new();
    SHARED.get_or_init(|| ContentRenderer::new(&ContentPolicy::default()))
}
