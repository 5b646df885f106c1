// src/models/project.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Lifecycle of an engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Draft,
    InReview,
    Final,
    Archived,
}

/// Represents the 'projects' table in the database.
/// A project is one engagement for a company.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: String,

    pub company_id: String,

    pub title: String,

    /// Free-form engagement taxonomy (e.g., "Web Application Pentest").
    pub engagement_type: String,

    pub summary: String,

    pub scope_description: String,

    /// ISO dates (YYYY-MM-DD).
    pub start_date: String,
    pub end_date: String,

    pub status: ProjectStatus,

    pub created_at: String,
    pub updated_at: String,
}

/// DTO for creating a project.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 64))]
    pub company_id: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub engagement_type: String,
    #[validate(length(max = 20000))]
    pub summary: Option<String>,
    #[validate(length(max = 20000))]
    pub scope_description: Option<String>,
    #[validate(custom(function = validate_iso_date))]
    pub start_date: String,
    #[validate(custom(function = validate_iso_date))]
    pub end_date: String,
    pub status: Option<ProjectStatus>,
}

/// DTO for updating a project. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub engagement_type: Option<String>,
    #[validate(length(max = 20000))]
    pub summary: Option<String>,
    #[validate(length(max = 20000))]
    pub scope_description: Option<String>,
    #[validate(custom(function = validate_iso_date))]
    pub start_date: Option<String>,
    #[validate(custom(function = validate_iso_date))]
    pub end_date: Option<String>,
    pub status: Option<ProjectStatus>,
}

/// Validates that a string is a correctly formatted ISO date.
fn validate_iso_date(value: &str) -> Result<(), validator::ValidationError> {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err(validator::ValidationError::new("invalid_date"));
    }
    Ok(())
}
