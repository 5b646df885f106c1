// src/content/mod.rs

pub mod policy;
pub mod render;
pub mod sanitize;

pub use policy::ContentPolicy;
pub use render::{ContentRenderer, RenderedContent};
pub use sanitize::{Sanitizer, clean_html};
