// src/handlers/vulnerability.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    content::{self, clean_html},
    error::AppError,
    models::vulnerability::{
        CreateVulnerabilityRequest, Severity, UpdateVulnerabilityRequest, Vulnerability,
        VulnerabilityStatus,
    },
    utils::time::now_rfc3339,
};

/// Query parameters for listing vulnerabilities.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub severity: Option<Severity>,
    pub status: Option<VulnerabilityStatus>,
    pub q: Option<String>,
}

async fn project_exists(pool: &SqlitePool, project_id: &str) -> Result<(), AppError> {
    sqlx::query("SELECT id FROM projects WHERE id = ?1")
        .bind(project_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Project not found".to_string()))?;
    Ok(())
}

/// Lists the vulnerabilities of a project, with optional severity/status
/// filters and a title search.
pub async fn list_vulnerabilities(
    State(pool): State<SqlitePool>,
    Path(project_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    project_exists(&pool, &project_id).await?;

    let search_pattern = params.q.map(|k| format!("%{}%", k));

    let vulnerabilities = sqlx::query_as::<_, Vulnerability>(
        r#"
        SELECT id, project_id, title, severity, status, cvss_base_score, cvss_vector,
               details, refs, created_at, updated_at
        FROM vulnerabilities
        WHERE project_id = ?1
          AND (?2 IS NULL OR severity = ?2)
          AND (?3 IS NULL OR status = ?3)
          AND (?4 IS NULL OR title LIKE ?4)
        ORDER BY created_at DESC
        "#,
    )
    .bind(&project_id)
    .bind(params.severity)
    .bind(params.status)
    .bind(search_pattern)
    .fetch_all(&pool)
    .await?;

    Ok(Json(vulnerabilities))
}

async fn fetch_vulnerability(
    pool: &SqlitePool,
    project_id: &str,
    vuln_id: &str,
) -> Result<Vulnerability, AppError> {
    sqlx::query_as::<_, Vulnerability>(
        r#"
        SELECT id, project_id, title, severity, status, cvss_base_score, cvss_vector,
               details, refs, created_at, updated_at
        FROM vulnerabilities
        WHERE id = ?1 AND project_id = ?2
        "#,
    )
    .bind(vuln_id)
    .bind(project_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Vulnerability not found".to_string()))
}

/// Retrieves a single vulnerability, keyed by project and vulnerability ID.
pub async fn get_vulnerability(
    State(pool): State<SqlitePool>,
    Path((project_id, vuln_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let vulnerability = fetch_vulnerability(&pool, &project_id, &vuln_id).await?;
    Ok(Json(vulnerability))
}

/// Creates a vulnerability under a project.
///
/// The rich-text details are cleaned with the shared allow-list sanitizer
/// before storage, as a fail-safe against stored XSS.
pub async fn create_vulnerability(
    State(pool): State<SqlitePool>,
    Path(project_id): Path<String>,
    Json(payload): Json<CreateVulnerabilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    project_exists(&pool, &project_id).await?;

    let id = uuid::Uuid::new_v4().to_string();
    let status = payload.status.unwrap_or(VulnerabilityStatus::Open);
    let details = clean_html(payload.details.as_deref().unwrap_or(""));
    let refs = SqlJson(payload.refs.unwrap_or_default());
    let now = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO vulnerabilities (id, project_id, title, severity, status,
                                     cvss_base_score, cvss_vector, details, refs,
                                     created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
        "#,
    )
    .bind(&id)
    .bind(&project_id)
    .bind(&payload.title)
    .bind(payload.severity)
    .bind(status)
    .bind(payload.cvss_base_score)
    .bind(payload.cvss_vector.as_deref().unwrap_or(""))
    .bind(&details)
    .bind(&refs)
    .bind(&now)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create vulnerability: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let vulnerability = Vulnerability {
        id,
        project_id,
        title: payload.title,
        severity: payload.severity,
        status,
        cvss_base_score: payload.cvss_base_score,
        cvss_vector: payload.cvss_vector.unwrap_or_default(),
        details,
        refs,
        created_at: now.clone(),
        updated_at: now,
    };

    Ok((StatusCode::CREATED, Json(vulnerability)))
}

/// Updates a vulnerability, keyed by project and vulnerability ID.
/// Rich-text details are re-sanitized when present.
pub async fn update_vulnerability(
    State(pool): State<SqlitePool>,
    Path((project_id, vuln_id)): Path<(String, String)>,
    Json(payload): Json<UpdateVulnerabilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // An empty payload still bumps updated_at, so unknown ids 404 below.
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE vulnerabilities SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title);
    }

    if let Some(severity) = payload.severity {
        separated.push("severity = ");
        separated.push_bind_unseparated(severity);
    }

    if let Some(status) = payload.status {
        separated.push("status = ");
        separated.push_bind_unseparated(status);
    }

    if let Some(cvss_base_score) = payload.cvss_base_score {
        separated.push("cvss_base_score = ");
        separated.push_bind_unseparated(cvss_base_score);
    }

    if let Some(cvss_vector) = payload.cvss_vector {
        separated.push("cvss_vector = ");
        separated.push_bind_unseparated(cvss_vector);
    }

    if let Some(details) = payload.details {
        separated.push("details = ");
        separated.push_bind_unseparated(clean_html(&details));
    }

    if let Some(refs) = payload.refs {
        separated.push("refs = ");
        separated.push_bind_unseparated(SqlJson(refs));
    }

    separated.push("updated_at = ");
    separated.push_bind_unseparated(now_rfc3339());

    builder.push(" WHERE id = ");
    builder.push_bind(&vuln_id);
    builder.push(" AND project_id = ");
    builder.push_bind(&project_id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update vulnerability: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Vulnerability not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a vulnerability, keyed by project and vulnerability ID.
pub async fn delete_vulnerability(
    State(pool): State<SqlitePool>,
    Path((project_id, vuln_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM vulnerabilities WHERE id = ?1 AND project_id = ?2")
        .bind(&vuln_id)
        .bind(&project_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete vulnerability: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Vulnerability not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the read-only rendering of the vulnerability details.
///
/// Content is sanitized again at render time, so documents stored before a
/// policy tightening still come out clean.
pub async fn render_vulnerability(
    State(pool): State<SqlitePool>,
    Path((project_id, vuln_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let vulnerability = fetch_vulnerability(&pool, &project_id, &vuln_id).await?;
    let rendered = content::render::shared().render(&vulnerability.details);
    Ok(Json(rendered))
}
