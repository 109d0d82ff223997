//! 对比任务 API
//!
//! 提交任务、查询任务状态
//!
//! 注意：实际的流水线逻辑在 services/runs 模块中，
//! 此处 handler 仅负责请求解析和参数传递

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::env::constants::DEFAULT_VOXEL_SIZE;
use crate::domain::run::RunStatus;
use crate::error::{ApiError, ApiResult};
use crate::services;
use crate::state::AppState;

/// 任务列表查询参数
#[derive(Debug, Deserialize)]
pub struct RunListQuery {
    #[serde(rename = "projectId")]
    pub project_id: String,
}

/// 提交任务请求
#[derive(Debug, Deserialize)]
pub struct SubmitRunRequest {
    #[serde(rename = "projectId")]
    pub project_id: String,
    #[serde(rename = "t1ScanId", default)]
    pub t1_scan_id: String,
    #[serde(rename = "t2ScanId", default)]
    pub t2_scan_id: String,
    #[serde(rename = "voxelSize")]
    pub voxel_size: Option<f64>,
}

/// 提交任务响应
#[derive(Debug, Serialize)]
pub struct SubmitRunResponse {
    pub id: String,
    pub status: RunStatus,
}

/// 创建任务管理路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/runs", get(list_runs).post(submit_run))
        .route("/api/runs/:id", get(get_run))
}

/// 提交对比任务
///
/// POST /api/runs
///
/// 同步返回 queued 确认，处理在后台任务中完成
async fn submit_run(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRunRequest>,
) -> ApiResult<impl IntoResponse> {
    let voxel_size = request.voxel_size.unwrap_or(DEFAULT_VOXEL_SIZE);
    if voxel_size <= 0.0 {
        return Err(ApiError::bad_request("voxelSize must be positive"));
    }

    let run = services::runs::submit(
        &state,
        request.project_id,
        request.t1_scan_id,
        request.t2_scan_id,
        voxel_size,
    )
    .await?;

    Ok(Json(SubmitRunResponse {
        id: run.id,
        status: run.status,
    }))
}

/// 列出项目的任务（最新在前）
///
/// GET /api/runs?projectId=
async fn list_runs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RunListQuery>,
) -> impl IntoResponse {
    Json(state.runs.list(&query.project_id).await)
}

/// 查询单个任务
///
/// GET /api/runs/:id
async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let run = state
        .runs
        .get(&run_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Run '{}'", run_id)))?;
    Ok(Json(run))
}
