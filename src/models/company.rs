// src/models/company.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'companies' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Company {
    pub id: String,

    pub name: String,

    /// URL-safe identifier derived from the name. Unique.
    pub slug: String,

    pub contact_email: Option<String>,

    pub address: String,

    pub notes: String,

    pub is_active: bool,

    pub created_at: String,
    pub updated_at: String,
}

/// DTO for creating a company.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 2000))]
    pub address: Option<String>,
    #[validate(length(max = 20000))]
    pub notes: Option<String>,
}

/// DTO for updating a company. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 2000))]
    pub address: Option<String>,
    #[validate(length(max = 20000))]
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

/// Derives a URL-safe slug from a company name.
/// May return an empty string for names with no alphanumerics; callers
/// fall back to a generated identifier in that case.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Acme Corp"), "acme-corp");
        assert_eq!(slugify("  Acme   Corp  "), "acme-corp");
        assert_eq!(slugify("ACME & Sons, Ltd."), "acme-sons-ltd");
        assert_eq!(slugify("株式会社"), "");
    }
}
