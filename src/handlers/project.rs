// src/handlers/project.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    models::project::{CreateProjectRequest, Project, ProjectStatus, UpdateProjectRequest},
    utils::time::now_rfc3339,
};

/// Query parameters for listing projects.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub company: Option<String>,
    pub status: Option<ProjectStatus>,
    pub q: Option<String>,
}

/// Lists projects, optionally filtered by company, status and search keyword.
pub async fn list_projects(
    State(pool): State<SqlitePool>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let search_pattern = params.q.map(|k| format!("%{}%", k));

    let projects = sqlx::query_as::<_, Project>(
        r#"
        SELECT id, company_id, title, engagement_type, summary, scope_description,
               start_date, end_date, status, created_at, updated_at
        FROM projects
        WHERE (?1 IS NULL OR company_id = ?1)
          AND (?2 IS NULL OR status = ?2)
          AND (?3 IS NULL OR title LIKE ?3)
        ORDER BY created_at DESC
        "#,
    )
    .bind(params.company)
    .bind(params.status)
    .bind(search_pattern)
    .fetch_all(&pool)
    .await?;

    Ok(Json(projects))
}

/// Retrieves a single project by ID.
pub async fn get_project(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let project = sqlx::query_as::<_, Project>(
        r#"
        SELECT id, company_id, title, engagement_type, summary, scope_description,
               start_date, end_date, status, created_at, updated_at
        FROM projects
        WHERE id = ?1
        "#,
    )
    .bind(&id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// Creates a new project for a company.
pub async fn create_project(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    sqlx::query("SELECT id FROM companies WHERE id = ?1")
        .bind(&payload.company_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Company not found".to_string()))?;

    let id = uuid::Uuid::new_v4().to_string();
    let status = payload.status.unwrap_or(ProjectStatus::Draft);
    let now = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO projects (id, company_id, title, engagement_type, summary,
                              scope_description, start_date, end_date, status,
                              created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
        "#,
    )
    .bind(&id)
    .bind(&payload.company_id)
    .bind(&payload.title)
    .bind(&payload.engagement_type)
    .bind(payload.summary.as_deref().unwrap_or(""))
    .bind(payload.scope_description.as_deref().unwrap_or(""))
    .bind(&payload.start_date)
    .bind(&payload.end_date)
    .bind(status)
    .bind(&now)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create project: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let project = Project {
        id,
        company_id: payload.company_id,
        title: payload.title,
        engagement_type: payload.engagement_type,
        summary: payload.summary.unwrap_or_default(),
        scope_description: payload.scope_description.unwrap_or_default(),
        start_date: payload.start_date,
        end_date: payload.end_date,
        status,
        created_at: now.clone(),
        updated_at: now,
    };

    Ok((StatusCode::CREATED, Json(project)))
}

/// Updates a project by ID. Only provided fields change.
pub async fn update_project(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // An empty payload still bumps updated_at, so unknown ids 404 below.
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE projects SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title);
    }

    if let Some(engagement_type) = payload.engagement_type {
        separated.push("engagement_type = ");
        separated.push_bind_unseparated(engagement_type);
    }

    if let Some(summary) = payload.summary {
        separated.push("summary = ");
        separated.push_bind_unseparated(summary);
    }

    if let Some(scope_description) = payload.scope_description {
        separated.push("scope_description = ");
        separated.push_bind_unseparated(scope_description);
    }

    if let Some(start_date) = payload.start_date {
        separated.push("start_date = ");
        separated.push_bind_unseparated(start_date);
    }

    if let Some(end_date) = payload.end_date {
        separated.push("end_date = ");
        separated.push_bind_unseparated(end_date);
    }

    if let Some(status) = payload.status {
        separated.push("status = ");
        separated.push_bind_unseparated(status);
    }

    separated.push("updated_at = ");
    separated.push_bind_unseparated(now_rfc3339());

    builder.push(" WHERE id = ");
    builder.push_bind(&id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update project: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Project not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a project by ID. Its vulnerabilities cascade.
pub async fn delete_project(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?1")
        .bind(&id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete project: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Project not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
