use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;

use rightsplace_shared::types::api::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

fn database_check(state: &AppState) -> HealthCheck {
    let result = state
        .db
        .get()
        .map_err(|e| e.to_string())
        .and_then(|mut conn| {
            diesel::sql_query("SELECT 1")
                .execute(&mut conn)
                .map_err(|e| e.to_string())
        });

    match result {
        Ok(_) => HealthCheck {
            name: "database".into(),
            status: HealthStatus::Healthy,
            message: None,
        },
        Err(message) => HealthCheck {
            name: "database".into(),
            status: HealthStatus::Unhealthy,
            message: Some(message),
        },
    }
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse::healthy("rightsplace-web", env!("CARGO_PKG_VERSION"))
        .with_checks(vec![database_check(&state)]);

    let status = if response.status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(response))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}
