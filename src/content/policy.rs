// src/content/policy.rs

use std::collections::{HashMap, HashSet};

use regex::Regex;

/// Allow-list policy for user-authored rich-text content.
///
/// Everything not explicitly permitted here is removed during sanitization.
/// The policy is a plain data structure so it can be unit-tested without any
/// rendering surface attached.
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    /// Tags kept in the output. Disallowed tags are unwrapped (children kept)
    /// unless listed in `strip_content_tags`.
    pub allowed_tags: HashSet<&'static str>,

    /// Tags removed together with their entire content and descendants.
    pub strip_content_tags: HashSet<&'static str>,

    /// Attributes permitted on any allowed tag.
    pub generic_attributes: HashSet<&'static str>,

    /// URL-valued attributes, permitted per tag so that scheme filtering
    /// applies to them (`a href`, `img src`).
    pub url_attributes: HashMap<&'static str, HashSet<&'static str>>,

    /// URI schemes accepted in `href`/`src` values.
    pub url_schemes: HashSet<&'static str>,

    /// Whether scheme-less (relative) references are kept. Intentionally
    /// permissive: relative paths into the application must survive.
    pub allow_relative_urls: bool,

    /// `target` value forced onto every link.
    pub link_target: &'static str,

    /// `rel` value forced onto every link.
    pub link_rel: &'static str,

    permitted_uri: Regex,
}

/// Accepts the allowed schemes, any relative reference, and nothing that
/// smuggles a scheme like `javascript:` in front of the first colon.
///
/// This is the policy-level statement of the rule the sanitizer enforces
/// through `url_schemes` + `url_relative` in `content::sanitize`; keep the
/// two in sync when the scheme list changes.
const PERMITTED_URI_PATTERN: &str =
    r"(?i)^(?:(?:(?:f|ht)tps?|mailto|tel|callto|cid|xmpp|data):|[^a-z]|[a-z+.\-]+(?:[^a-z+.\-:]|$))";

impl Default for ContentPolicy {
    fn default() -> Self {
        let allowed_tags = HashSet::from([
            "p", "h1", "h2", "h3", "h4", "h5", "h6", "strong", "em", "u", "s", "code", "pre",
            "ul", "ol", "li", "blockquote", "a", "img", "br", "hr", "table", "thead", "tbody",
            "tr", "th", "td", "span", "div",
        ]);

        let strip_content_tags = HashSet::from([
            "script", "style", "iframe", "object", "embed", "form", "input", "button",
        ]);

        let generic_attributes = HashSet::from(["alt", "title", "class", "id", "style"]);

        let url_attributes = HashMap::from([
            ("a", HashSet::from(["href"])),
            ("img", HashSet::from(["src"])),
        ]);

        let url_schemes = HashSet::from([
            "http", "https", "ftp", "mailto", "tel", "callto", "cid", "xmpp", "data",
        ]);

        Self {
            allowed_tags,
            strip_content_tags,
            generic_attributes,
            url_attributes,
            url_schemes,
            allow_relative_urls: true,
            link_target: "_blank",
            link_rel: "noopener noreferrer",
            permitted_uri: Regex::new(PERMITTED_URI_PATTERN).expect("valid URI pattern"),
        }
    }
}

impl ContentPolicy {
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.contains(tag)
    }

    /// Whether the tag is removed together with its descendants.
    pub fn strips_content_of(&self, tag: &str) -> bool {
        self.strip_content_tags.contains(tag)
    }

    pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
        self.generic_attributes.contains(attribute)
            || self
                .url_attributes
                .get(tag)
                .is_some_and(|attrs| attrs.contains(attribute))
    }

    /// Checks a URI value against the permitted-scheme pattern. Scheme-less
    /// strings pass when relative URLs are allowed.
    pub fn permits_uri(&self, value: &str) -> bool {
        if !self.allow_relative_urls && !value.contains(':') {
            return false;
        }
        self.permitted_uri.is_match(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_covers_rich_text_tags() {
        let policy = ContentPolicy::default();
        for tag in ["p", "h1", "h6", "table", "td", "img", "a", "div"] {
            assert!(policy.allows_tag(tag), "{tag} should be allowed");
        }
        assert!(!policy.allows_tag("script"));
        assert!(policy.strips_content_of("script"));
        assert!(policy.strips_content_of("iframe"));
    }

    #[test]
    fn event_handlers_are_never_allowed() {
        let policy = ContentPolicy::default();
        assert!(!policy.allows_attribute("a", "onclick"));
        assert!(!policy.allows_attribute("img", "onerror"));
        assert!(policy.allows_attribute("a", "href"));
        assert!(policy.allows_attribute("img", "src"));
        assert!(policy.allows_attribute("p", "class"));
        // href is URL-filtered, so it is only meaningful on anchors.
        assert!(!policy.allows_attribute("td", "href"));
    }

    #[test]
    fn uri_pattern_accepts_allowed_schemes_and_relative_paths() {
        let policy = ContentPolicy::default();
        assert!(policy.permits_uri("https://example.com"));
        assert!(policy.permits_uri("http://example.com/a?b=c"));
        assert!(policy.permits_uri("ftp://files.example.com"));
        assert!(policy.permits_uri("mailto:security@example.com"));
        assert!(policy.permits_uri("tel:+15551234567"));
        assert!(policy.permits_uri("/reports/2024"));
        assert!(policy.permits_uri("../assets/logo.png"));
        assert!(policy.permits_uri("#section-2"));
    }

    #[test]
    fn uri_pattern_rejects_script_schemes() {
        let policy = ContentPolicy::default();
        assert!(!policy.permits_uri("javascript:alert(1)"));
        assert!(!policy.permits_uri("vbscript:msgbox(1)"));
        assert!(!policy.permits_uri("JaVaScRiPt:alert(1)"));
    }
}
