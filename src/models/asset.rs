// src/models/asset.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Kind of asset under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    WebApp,
    Server,
    Api,
    MobileApp,
    NetworkDevice,
    Other,
}

/// Represents the 'assets' table in the database.
/// Assets always belong to a company.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,

    pub company_id: String,

    pub name: String,

    #[serde(rename = "type")]
    pub asset_type: AssetType,

    /// Hostname, URL, IP range or similar locator.
    pub identifier: String,

    pub description: String,

    pub is_active: bool,

    pub created_at: String,
    pub updated_at: String,
}

/// DTO for creating an asset under a company.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssetRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[validate(length(min = 1, max = 255))]
    pub identifier: String,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
}

/// DTO for updating an asset. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAssetRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: Option<AssetType>,
    #[validate(length(min = 1, max = 255))]
    pub identifier: Option<String>,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
