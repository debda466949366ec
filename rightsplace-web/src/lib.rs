use axum::extract::DefaultBodyLimit;
use axum::routing::{get, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use rightsplace_shared::clients::db::DbPool;
use rightsplace_shared::clients::minio::MinioClient;
use rightsplace_shared::middleware::{metrics_middleware, HasSessionKeys, SessionKeys};

pub mod config;
pub mod domain;
pub mod forms;
pub mod models;
pub mod pages;
pub mod routes;
pub mod schema;
pub mod services;
pub mod session;

use crate::config::AppConfig;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub storage: MinioClient,
    pub metrics: PrometheusHandle,
}

impl HasSessionKeys for AppState {
    fn session_keys(&self) -> SessionKeys {
        SessionKeys::new(self.config.jwt_secret.clone())
    }
}

fn admin_router() -> Router<Arc<AppState>> {
    use routes::admin_routes as admin;

    Router::new()
        .route("/profiles", get(admin::list_profiles))
        .route("/profiles/:id", get(admin::get_profile).delete(admin::delete_profile))
        .route("/profiles/:id/verification", put(admin::set_verification))
        .route("/reports", get(admin::list_reports))
        .route("/reports/:id", get(admin::get_report).delete(admin::delete_report))
        .route("/reports/:id/status", put(admin::update_report_status))
        .route("/evidence", get(admin::list_evidence))
        .route("/evidence/:id", put(admin::update_evidence).delete(admin::delete_evidence))
        .route("/evidence/:id/download", get(admin::download_evidence))
        .route("/cases", get(admin::list_cases).post(admin::create_case))
        .route("/cases/:id", put(admin::update_case).delete(admin::delete_case))
        .route("/partners/eligible", get(admin::eligible_partners))
        .route("/stats", get(admin::get_stats))
        .route("/audit-log", get(admin::get_audit_log))
}

pub fn router(state: Arc<AppState>) -> Router {
    use routes::{auth_routes, health, page_routes, report_routes};

    let body_limit = state.config.max_request_bytes();

    Router::new()
        .route("/", get(page_routes::index))
        .route("/report/create/", get(report_routes::create_form).post(report_routes::create))
        .route("/report/anonymous/", get(report_routes::anonymous_form).post(report_routes::anonymous))
        .route("/login/", get(auth_routes::login_form).post(auth_routes::login))
        .route("/register/", get(auth_routes::register_form).post(auth_routes::register))
        .route("/logout/", get(auth_routes::logout).post(auth_routes::logout))
        .route("/cases/assigned/", get(page_routes::assigned_cases))
        .route("/my-reports/", get(report_routes::my_reports))
        .route("/partners/verified/", get(page_routes::verified_partners))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .nest("/admin", admin_router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
