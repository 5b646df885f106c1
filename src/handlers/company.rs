// src/handlers/company.rs

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
    error::{AppError, conflict_or_internal},
    models::company::{Company, CreateCompanyRequest, UpdateCompanyRequest, slugify},
    utils::time::now_rfc3339,
};

/// Query parameters for listing companies.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
}

/// Lists all companies, optionally filtered by a search keyword.
pub async fn list_companies(
    State(pool): State<SqlitePool>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let search_pattern = params.q.map(|k| format!("%{}%", k));

    let companies = sqlx::query_as::<_, Company>(
        r#"
        SELECT id, name, slug, contact_email, address, notes, is_active, created_at, updated_at
        FROM companies
        WHERE (?1 IS NULL OR name LIKE ?1 OR slug LIKE ?1)
        ORDER BY created_at DESC
        "#,
    )
    .bind(search_pattern)
    .fetch_all(&pool)
    .await?;

    Ok(Json(companies))
}

/// Retrieves a single company by ID.
pub async fn get_company(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let company = sqlx::query_as::<_, Company>(
        r#"
        SELECT id, name, slug, contact_email, address, notes, is_active, created_at, updated_at
        FROM companies
        WHERE id = ?1
        "#,
    )
    .bind(&id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Company not found".to_string()))?;

    Ok(Json(company))
}

/// Creates a new company. The slug is derived from the name.
pub async fn create_company(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let mut slug = slugify(&payload.name);
    if slug.is_empty() {
        slug = id.clone();
    }
    let now = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO companies (id, name, slug, contact_email, address, notes, is_active, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)
        "#,
    )
    .bind(&id)
    .bind(&payload.name)
    .bind(&slug)
    .bind(&payload.contact_email)
    .bind(payload.address.as_deref().unwrap_or(""))
    .bind(payload.notes.as_deref().unwrap_or(""))
    .bind(&now)
    .execute(&pool)
    .await
    .map_err(|e| conflict_or_internal(e, &format!("Company '{}' already exists", payload.name)))?;

    let company = Company {
        id,
        name: payload.name,
        slug,
        contact_email: payload.contact_email,
        address: payload.address.unwrap_or_default(),
        notes: payload.notes.unwrap_or_default(),
        is_active: true,
        created_at: now.clone(),
        updated_at: now,
    };

    Ok((StatusCode::CREATED, Json(company)))
}

/// Updates a company by ID. Only provided fields change.
pub async fn update_company(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // Even an empty payload touches updated_at, so unknown ids still 404
    // through the rows_affected check below.
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE companies SET ");
    let mut separated = builder.separated(", ");

    if let Some(name) = &payload.name {
        separated.push("name = ");
        separated.push_bind_unseparated(name.clone());
        let mut slug = slugify(name);
        if slug.is_empty() {
            slug = id.clone();
        }
        separated.push("slug = ");
        separated.push_bind_unseparated(slug);
    }

    if let Some(contact_email) = payload.contact_email {
        separated.push("contact_email = ");
        separated.push_bind_unseparated(contact_email);
    }

    if let Some(address) = payload.address {
        separated.push("address = ");
        separated.push_bind_unseparated(address);
    }

    if let Some(notes) = payload.notes {
        separated.push("notes = ");
        separated.push_bind_unseparated(notes);
    }

    if let Some(is_active) = payload.is_active {
        separated.push("is_active = ");
        separated.push_bind_unseparated(is_active);
    }

    separated.push("updated_at = ");
    separated.push_bind_unseparated(now_rfc3339());

    builder.push(" WHERE id = ");
    builder.push_bind(&id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        conflict_or_internal(e, "A company with the same name already exists")
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Company not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a company by ID. Assets, projects and findings cascade.
pub async fn delete_company(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM companies WHERE id = ?1")
        .bind(&id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete company: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Company not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
