// tests/api_tests.rs

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use vulnsphere::{config::Config, routes, state::AppState, utils::hash::hash_password};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345") and the pool for
/// direct seeding.
async fn spawn_app() -> (String, SqlitePool) {
    // A single-connection in-memory SQLite database keeps every test isolated.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        admin_email: None,
        admin_password: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

/// Registers a fresh user and logs in, returning the bearer token.
async fn register_and_login(client: &reqwest::Client, address: &str) -> String {
    let unique = &uuid::Uuid::new_v4().to_string()[..8];
    let email = format!("tester_{}@example.com", unique);
    let password = "password123";

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "name": "Test User",
            "password": password
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);

    let login_resp = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Login failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login json");

    login_resp["token"]
        .as_str()
        .expect("Token not found")
        .to_string()
}

#[tokio::test]
async fn health_check_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_fails_validation() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: not an email, password too short
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "not-an-email",
            "name": "x",
            "password": "short"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["detail"].is_string(), "error body must carry a detail");
}

#[tokio::test]
async fn protected_routes_require_token() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/companies", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["detail"].is_string(), "401 body must carry a detail");

    // A garbage token is also rejected with a detail body
    let response = client
        .get(format!("{}/api/companies", address))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Invalid token");
}

#[tokio::test]
async fn empty_update_of_missing_company_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    // A no-op payload against an unknown id must not report success
    let response = client
        .put(format!(
            "{}/api/companies/{}",
            address,
            uuid::Uuid::new_v4()
        ))
        .bearer_auth(&token)
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Company not found");
}

#[tokio::test]
async fn company_crud_flow() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    // Create
    let response = client
        .post(format!("{}/api/companies", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "Acme Corp",
            "contact_email": "security@acme.example"
        }))
        .send()
        .await
        .expect("Create failed");
    assert_eq!(response.status().as_u16(), 201);
    let company: serde_json::Value = response.json().await.unwrap();
    assert_eq!(company["slug"], "acme-corp");
    let company_id = company["id"].as_str().unwrap().to_string();

    // Duplicate name -> 409 with detail
    let response = client
        .post(format!("{}/api/companies", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "name": "Acme Corp" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("Acme Corp"));

    // Update
    let response = client
        .put(format!("{}/api/companies/{}", address, company_id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "notes": "priority customer", "is_active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let fetched: serde_json::Value = client
        .get(format!("{}/api/companies/{}", address, company_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["notes"], "priority customer");
    assert_eq!(fetched["is_active"], false);

    // Delete, then delete again -> 404 with detail
    let response = client
        .delete(format!("{}/api/companies/{}", address, company_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client
        .delete(format!("{}/api/companies/{}", address, company_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Company not found");
}

#[tokio::test]
async fn vulnerability_flow_sanitizes_details() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    // Company and project to hang the finding on
    let company: serde_json::Value = client
        .post(format!("{}/api/companies", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "name": "Target Org" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let company_id = company["id"].as_str().unwrap();

    let project: serde_json::Value = client
        .post(format!("{}/api/projects", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "company_id": company_id,
            "title": "Q3 Web Pentest",
            "engagement_type": "Web Application Pentest",
            "start_date": "2026-07-01",
            "end_date": "2026-07-21"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let project_id = project["id"].as_str().unwrap();
    assert_eq!(project["status"], "DRAFT");

    // Create a finding whose details try to smuggle XSS
    let response = client
        .post(format!(
            "{}/api/projects/{}/vulnerabilities",
            address, project_id
        ))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Stored XSS in comment field",
            "severity": "HIGH",
            "details": "<h2>Impact</h2><p onclick=\"evil()\">Account takeover</p><script>alert(1)</script>",
            "references": ["https://owasp.org/www-community/attacks/xss/"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let vuln: serde_json::Value = response.json().await.unwrap();
    let vuln_id = vuln["id"].as_str().unwrap();
    assert_eq!(vuln["status"], "OPEN");
    assert_eq!(vuln["severity"], "HIGH");

    // Stored details were cleaned on the write path
    let details = vuln["details"].as_str().unwrap();
    assert!(details.contains("<h2>Impact</h2>"));
    assert!(!details.contains("script"));
    assert!(!details.contains("onclick"));

    // Read-only rendering is wrapped and clean
    let rendered: serde_json::Value = client
        .get(format!(
            "{}/api/projects/{}/vulnerabilities/{}/render",
            address, project_id, vuln_id
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let html = rendered["html"].as_str().unwrap();
    assert!(html.starts_with("<div class=\"content-view\">"));
    assert!(html.contains("Account takeover"));
    assert!(!html.contains("script"));

    // Invalid reference URL is rejected
    let response = client
        .put(format!(
            "{}/api/projects/{}/vulnerabilities/{}",
            address, project_id, vuln_id
        ))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "references": ["not a url"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Delete keyed by parent + resource id
    let response = client
        .delete(format!(
            "{}/api/projects/{}/vulnerabilities/{}",
            address, project_id, vuln_id
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client
        .delete(format!(
            "{}/api/projects/{}/vulnerabilities/{}",
            address, project_id, vuln_id
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Vulnerability not found");
}

#[tokio::test]
async fn asset_crud_under_company() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let company: serde_json::Value = client
        .post(format!("{}/api/companies", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "name": "Asset Owner" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let company_id = company["id"].as_str().unwrap();

    let response = client
        .post(format!("{}/api/companies/{}/assets", address, company_id))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "Customer Portal",
            "type": "WEB_APP",
            "identifier": "https://portal.example.com"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let asset: serde_json::Value = response.json().await.unwrap();
    assert_eq!(asset["type"], "WEB_APP");
    let asset_id = asset["id"].as_str().unwrap();

    let assets: serde_json::Value = client
        .get(format!("{}/api/companies/{}/assets", address, company_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(assets.as_array().unwrap().len(), 1);

    let response = client
        .delete(format!(
            "{}/api/companies/{}/assets/{}",
            address, company_id, asset_id
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
}

#[tokio::test]
async fn content_preview_sanitizes() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address).await;

    let rendered: serde_json::Value = client
        .post(format!("{}/api/content/preview", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "markup": "<p>ok</p><iframe src=\"https://evil.example\"></iframe>"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let html = rendered["html"].as_str().unwrap();
    assert!(html.contains("<p>ok</p>"));
    assert!(!html.contains("iframe"));
}

#[tokio::test]
async fn admin_user_management() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    // Seed an admin directly
    let admin_id = uuid::Uuid::new_v4().to_string();
    let hashed = hash_password("admin-password-1").unwrap();
    sqlx::query(
        "INSERT INTO users (id, email, username, name, password, role, created_at)
         VALUES (?1, 'admin@example.com', 'admin', 'Admin', ?2, 'ADMIN', '2026-01-01T00:00:00Z')",
    )
    .bind(&admin_id)
    .bind(&hashed)
    .execute(&pool)
    .await
    .unwrap();

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": "admin@example.com",
            "password": "admin-password-1"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let admin_token = login["token"].as_str().unwrap();

    // A non-admin may not touch user management
    let client_token = register_and_login(&client, &address).await;
    let response = client
        .get(format!("{}/api/admin/users", address))
        .bearer_auth(&client_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Admin access required");

    // Admin creates a tester
    let response = client
        .post(format!("{}/api/admin/users", address))
        .bearer_auth(admin_token)
        .json(&serde_json::json!({
            "email": "tester@example.com",
            "username": "tester",
            "name": "Tester",
            "password": "tester-password",
            "role": "TESTER"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let created: serde_json::Value = response.json().await.unwrap();
    assert_eq!(created["email"], "tester@example.com");
    assert_eq!(created["role"], "TESTER");
    assert!(created.get("password").is_none(), "password must not leak");
    let tester_id = created["id"].as_str().unwrap();

    // Unknown role is rejected
    let response = client
        .post(format!("{}/api/admin/users", address))
        .bearer_auth(admin_token)
        .json(&serde_json::json!({
            "email": "other@example.com",
            "username": "other",
            "name": "Other",
            "password": "other-password",
            "role": "SUPERUSER"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Self-deletion is rejected
    let response = client
        .delete(format!("{}/api/admin/users/{}", address, admin_id))
        .bearer_auth(admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Deleting the tester works
    let response = client
        .delete(format!("{}/api/admin/users/{}", address, tester_id))
        .bearer_auth(admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
}
