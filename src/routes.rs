// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, asset, auth, company, content, project, vulnerability},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, content, companies, projects, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let content_routes = Router::new().route("/preview", post(content::preview));

    let company_routes = Router::new()
        .route(
            "/",
            get(company::list_companies).post(company::create_company),
        )
        .route(
            "/{company_id}",
            get(company::get_company)
                .put(company::update_company)
                .delete(company::delete_company),
        )
        .route(
            "/{company_id}/assets",
            get(asset::list_assets).post(asset::create_asset),
        )
        .route(
            "/{company_id}/assets/{asset_id}",
            get(asset::get_asset)
                .put(asset::update_asset)
                .delete(asset::delete_asset),
        );

    let project_routes = Router::new()
        .route("/", get(project::list_projects).post(project::create_project))
        .route(
            "/{project_id}",
            get(project::get_project)
                .put(project::update_project)
                .delete(project::delete_project),
        )
        .route(
            "/{project_id}/vulnerabilities",
            get(vulnerability::list_vulnerabilities).post(vulnerability::create_vulnerability),
        )
        .route(
            "/{project_id}/vulnerabilities/{vuln_id}",
            get(vulnerability::get_vulnerability)
                .put(vulnerability::update_vulnerability)
                .delete(vulnerability::delete_vulnerability),
        )
        .route(
            "/{project_id}/vulnerabilities/{vuln_id}/render",
            get(vulnerability::render_vulnerability),
        );

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            axum::routing::put(admin::update_user).delete(admin::delete_user),
        )
        // Double middleware protection: Auth first, then Admin check.
        // route_layer keeps the router's fallback out of the auth stack so
        // unmatched paths still 404.
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let protected = Router::new()
        .nest("/api/content", content_routes)
        .nest("/api/companies", company_routes)
        .nest("/api/projects", project_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/admin", admin_routes)
        .merge(protected)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
