// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, conflict_or_internal},
    models::user::{LoginRequest, RegisterRequest, User},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
        time::now_rfc3339,
    },
};

/// Registers a new user with the CLIENT role.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // Default the username to the email local part, like the web client does.
    let username = match payload.username {
        Some(u) => u,
        None => payload
            .email
            .split('@')
            .next()
            .unwrap_or(payload.email.as_str())
            .to_string(),
    };

    let hashed_password = hash_password(&payload.password)?;
    let id = uuid::Uuid::new_v4().to_string();
    let created_at = now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, username, name, password, role, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, 'CLIENT', ?6)
        "#,
    )
    .bind(&id)
    .bind(&payload.email)
    .bind(&username)
    .bind(&payload.name)
    .bind(&hashed_password)
    .bind(&created_at)
    .execute(&pool)
    .await
    .map_err(|e| conflict_or_internal(e, "Email or username already registered"))?;

    let user = User {
        id,
        email: payload.email,
        username,
        name: payload.name,
        password: hashed_password,
        role: "CLIENT".to_string(),
        created_at,
    };

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
///
/// Verifies the email and password against the database.
/// If valid, signs a JWT token with the user's ID and role.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, name, password, role, created_at
        FROM users
        WHERE email = ?1
        "#,
    )
    .bind(&payload.email)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = user.ok_or(AppError::AuthError("Invalid email or password".to_string()))?;

    let is_valid = verify_password(&payload.password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid email or password".to_string()));
    }

    let token = sign_jwt(
        &user.id,
        &user.role,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "user": user,
    })))
}
