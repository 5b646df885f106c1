// src/handlers/asset.rs

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
    models::asset::{Asset, CreateAssetRequest, UpdateAssetRequest},
    utils::time::now_rfc3339,
};

/// Query parameters for listing assets.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
}

async fn company_exists(pool: &SqlitePool, company_id: &str) -> Result<(), AppError> {
    sqlx::query("SELECT id FROM companies WHERE id = ?1")
        .bind(company_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Company not found".to_string()))?;
    Ok(())
}

/// Lists the assets of a company, optionally filtered by a search keyword.
pub async fn list_assets(
    State(pool): State<SqlitePool>,
    Path(company_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    company_exists(&pool, &company_id).await?;

    let search_pattern = params.q.map(|k| format!("%{}%", k));

    let assets = sqlx::query_as::<_, Asset>(
        r#"
        SELECT id, company_id, name, asset_type, identifier, description, is_active,
               created_at, updated_at
        FROM assets
        WHERE company_id = ?1
          AND (?2 IS NULL OR name LIKE ?2 OR identifier LIKE ?2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(&company_id)
    .bind(search_pattern)
    .fetch_all(&pool)
    .await?;

    Ok(Json(assets))
}

/// Retrieves a single asset, keyed by company and asset ID.
pub async fn get_asset(
    State(pool): State<SqlitePool>,
    Path((company_id, asset_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let asset = sqlx::query_as::<_, Asset>(
        r#"
        SELECT id, company_id, name, asset_type, identifier, description, is_active,
               created_at, updated_at
        FROM assets
        WHERE id = ?1 AND company_id = ?2
        "#,
    )
    .bind(&asset_id)
    .bind(&company_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Asset not found".to_string()))?;

    Ok(Json(asset))
}

/// Creates an asset under a company.
pub async fn create_asset(
    State(pool): State<SqlitePool>,
    Path(company_id): Path<String>,
    Json(payload): Json<CreateAssetRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    company_exists(&pool, &company_id).await?;

    let id = uuid::Uuid::new_v4().to_string();
    let now = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO assets (id, company_id, name, asset_type, identifier, description,
                            is_active, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)
        "#,
    )
    .bind(&id)
    .bind(&company_id)
    .bind(&payload.name)
    .bind(payload.asset_type)
    .bind(&payload.identifier)
    .bind(payload.description.as_deref().unwrap_or(""))
    .bind(&now)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create asset: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let asset = Asset {
        id,
        company_id,
        name: payload.name,
        asset_type: payload.asset_type,
        identifier: payload.identifier,
        description: payload.description.unwrap_or_default(),
        is_active: true,
        created_at: now.clone(),
        updated_at: now,
    };

    Ok((StatusCode::CREATED, Json(asset)))
}

/// Updates an asset, keyed by company and asset ID.
pub async fn update_asset(
    State(pool): State<SqlitePool>,
    Path((company_id, asset_id)): Path<(String, String)>,
    Json(payload): Json<UpdateAssetRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // An empty payload still bumps updated_at, so unknown ids 404 below.
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE assets SET ");
    let mut separated = builder.separated(", ");

    if let Some(name) = payload.name {
        separated.push("name = ");
        separated.push_bind_unseparated(name);
    }

    if let Some(asset_type) = payload.asset_type {
        separated.push("asset_type = ");
        separated.push_bind_unseparated(asset_type);
    }

    if let Some(identifier) = payload.identifier {
        separated.push("identifier = ");
        separated.push_bind_unseparated(identifier);
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(description);
    }

    if let Some(is_active) = payload.is_active {
        separated.push("is_active = ");
        separated.push_bind_unseparated(is_active);
    }

    separated.push("updated_at = ");
    separated.push_bind_unseparated(now_rfc3339());

    builder.push(" WHERE id = ");
    builder.push_bind(&asset_id);
    builder.push(" AND company_id = ");
    builder.push_bind(&company_id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update asset: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Asset not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes an asset, keyed by company and asset ID.
pub async fn delete_asset(
    State(pool): State<SqlitePool>,
    Path((company_id, asset_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM assets WHERE id = ?1 AND company_id = ?2")
        .bind(&asset_id)
        .bind(&company_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete asset: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Asset not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
