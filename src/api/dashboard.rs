//! 仪表盘 API

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::services::dashboard;
use crate::state::AppState;

/// 仪表盘查询参数
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(rename = "projectId")]
    pub project_id: String,
}

/// 创建仪表盘路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/dashboard", get(get_dashboard))
}

/// 项目进度汇总
///
/// GET /api/dashboard?projectId=
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    Json(dashboard::summarize(&state, &query.project_id).await)
}
