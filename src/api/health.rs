//! 健康检查 API

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::config::env::constants::VERSION;
use crate::state::AppState;

/// 健康检查响应
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: String,
    uptime_secs: i64,
    projects: usize,
    active_runs: usize,
}

/// 创建健康检查路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/health", get(health_check))
}

/// 健康检查 - 返回状态、版本、运行时间等信息
///
/// GET /api/health
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: "sitetrack-server",
        version: VERSION,
        timestamp: Utc::now().to_rfc3339(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        projects: state.projects.count().await,
        active_runs: state.runs.active_count().await,
    })
}
