// src/models/vulnerability.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use url::Url;
use validator::Validate;

/// Finding severity taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
    Unclassified,
}

/// Finding lifecycle taxonomy, including the retest states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VulnerabilityStatus {
    Open,
    InProgress,
    Resolved,
    AcceptedRisk,
    FalsePositive,
    RetestPending,
    RetestFailed,
}

/// Represents the 'vulnerabilities' table in the database.
/// Findings always belong to a project.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,

    pub project_id: String,

    pub title: String,

    pub severity: Severity,

    pub status: VulnerabilityStatus,

    pub cvss_base_score: Option<f64>,

    pub cvss_vector: String,

    /// Rich-text finding write-up (description, impact, reproduction,
    /// remediation). Sanitized before storage and again at render time.
    pub details: String,

    /// Reference URLs or citations.
    /// Stored as a JSON array in the database.
    /// `sqlx::types::Json` handles automatic serialization/deserialization.
    #[serde(rename = "references")]
    pub refs: Json<Vec<String>>,

    pub created_at: String,
    pub updated_at: String,
}

/// DTO for creating a vulnerability under a project.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVulnerabilityRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub severity: Severity,
    pub status: Option<VulnerabilityStatus>,
    #[validate(range(min = 0.0, max = 10.0))]
    pub cvss_base_score: Option<f64>,
    #[validate(length(max = 100))]
    pub cvss_vector: Option<String>,
    #[validate(length(max = 200000))]
    pub details: Option<String>,
    #[serde(rename = "references")]
    #[validate(custom(function = validate_reference_urls))]
    pub refs: Option<Vec<String>>,
}

/// DTO for updating a vulnerability. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVulnerabilityRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<VulnerabilityStatus>,
    #[validate(range(min = 0.0, max = 10.0))]
    pub cvss_base_score: Option<f64>,
    #[validate(length(max = 100))]
    pub cvss_vector: Option<String>,
    #[validate(length(max = 200000))]
    pub details: Option<String>,
    #[serde(rename = "references")]
    #[validate(custom(function = validate_reference_urls))]
    pub refs: Option<Vec<String>>,
}

/// Validates a collection of reference URLs, ensuring each meets length and
/// format requirements.
fn validate_reference_urls(urls: &[String]) -> Result<(), validator::ValidationError> {
    for url in urls {
        if url.len() > 500 {
            return Err(validator::ValidationError::new("url_too_long"));
        }
        if Url::parse(url).is_err() {
            return Err(validator::ValidationError::new("invalid_url"));
        }
    }
    Ok(())
}
