//! HTTP routes for the module-formation API
//!
//! `POST /api/execute` accepts the same JSON requests as the skill
//! dispatcher. The `GET` endpoints are read-only views over the registry.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response as HttpResponse},
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::registry::FormationInsights;
use crate::skill::{self, Response, SkillInfo};

use super::graph::{self, GraphData};
use super::server::AppState;

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/execute", post(execute))
        .route("/api/modules", get(get_modules))
        .route("/api/insights", get(get_insights))
        .route("/api/graph", get(get_graph))
        .route("/api/components/{id}", get(get_component))
        .route("/api/info", get(get_info))
        .route("/api/health", get(health_check))
}

/// POST /api/execute - Run one request against the shared registry
async fn execute(
    State(state): State<Arc<AppState>>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Response>) {
    let response = state.registry.execute_value(request);
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(response))
}

/// GET /api/modules - Returns every formed module
async fn get_modules(State(state): State<Arc<AppState>>) -> Json<Response> {
    Json(state.registry.execute(skill::Request::GetReadyModules))
}

/// GET /api/insights - Returns formation counters
async fn get_insights(State(state): State<Arc<AppState>>) -> Json<FormationInsights> {
    Json(state.registry.with(|r| r.get_formulation_insights()))
}

/// GET /api/graph - Returns the component dependency graph
async fn get_graph(State(state): State<Arc<AppState>>) -> Json<GraphData> {
    Json(state.registry.with(|r| graph::registry_to_graph(r)))
}

/// GET /api/components/{id} - Returns one component and its module
async fn get_component(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HttpResponse {
    let response = state.registry.execute(skill::Request::GetComponent {
        component_id: id.clone(),
    });

    if response.success {
        Json(response).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("Component '{}' not found", id)})),
        )
            .into_response()
    }
}

/// GET /api/info - Describes the skill
async fn get_info() -> Json<SkillInfo> {
    Json(skill::skill_info())
}

/// GET /api/health - Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
