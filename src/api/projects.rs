//! 项目管理 API

use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::project::Project;
use crate::domain::zone::{Zone, ZoneKind};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 创建项目请求
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

/// 创建项目管理路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/projects", get(list_projects).post(create_project))
}

/// 列出所有项目
///
/// GET /api/projects
async fn list_projects(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.projects.list().await)
}

/// 创建项目
///
/// POST /api/projects
///
/// 同时创建项目的根分区（kind = site）
async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let project = state.projects.create(Project::new(name)).await;
    state
        .zones
        .create(Zone::new(project.id.clone(), name, ZoneKind::Site, None))
        .await;

    tracing::info!(project_id = %project.id, name = %project.name, "Project created");
    Ok(Json(project))
}
