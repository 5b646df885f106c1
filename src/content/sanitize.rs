// src/content/sanitize.rs

use std::sync::OnceLock;

use ammonia::{Builder, UrlRelative};

use super::policy::ContentPolicy;

/// Allow-list HTML sanitizer compiled from a [`ContentPolicy`].
///
/// This preserves safe markup (like <b>, <p>) while stripping dangerous tags
/// (like <script>, <iframe>) and malicious attributes (like onclick).
///
/// Note:
/// 1. Disallowed container tags such as <script> are removed together with
///    their entire content.
/// 2. If the goal is to display raw code, callers should escape instead of
///    sanitize; sanitization here is a fail-safe against stored XSS.
/// 3. Cleaning is pure and total: same input and policy always yield the same
///    output, and no input (including the empty string) can make it fail.
pub struct Sanitizer {
    builder: Builder<'static>,
}

impl Sanitizer {
    pub fn from_policy(policy: &ContentPolicy) -> Self {
        let mut builder = Builder::default();
        builder
            .tags(policy.allowed_tags.clone())
            .clean_content_tags(policy.strip_content_tags.clone())
            .generic_attributes(policy.generic_attributes.clone())
            .tag_attributes(policy.url_attributes.clone())
            .url_schemes(policy.url_schemes.clone())
            .url_relative(if policy.allow_relative_urls {
                UrlRelative::PassThrough
            } else {
                UrlRelative::Deny
            })
            .link_rel(Some(policy.link_rel))
            .set_tag_attribute_value("a", "target", policy.link_target);
        Self { builder }
    }

    /// Cleans a markup fragment down to the allow-listed subset.
    pub fn clean(&self, input: &str) -> String {
        self.builder.clean(input).to_string()
    }
}

/// Process-wide sanitizer built from the default policy. Immutable after
/// first use, so concurrent cleans never interfere.
pub fn shared() -> &'static Sanitizer {
    static SHARED: OnceLock<Sanitizer> = OnceLock::new();
    SHARED.get_or_init(|| Sanitizer::from_policy(&ContentPolicy::default()))
}

/// Cleans rich-text content with the shared default policy.
///
/// Used on the write path (before storage) and by the read-only renderer, so
/// content round-trips between edit and view modes without reformatting.
pub fn clean_html(input: &str) -> String {
    shared().clean(input)
}
