//! 分区管理 API
//!
//! 分区的增删改查；删除会级联到所有后代

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::zone::{Zone, ZoneKind};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 分区列表查询参数
#[derive(Debug, Deserialize)]
pub struct ZoneListQuery {
    #[serde(rename = "projectId")]
    pub project_id: String,
}

/// 创建分区请求
#[derive(Debug, Deserialize)]
pub struct CreateZoneRequest {
    #[serde(rename = "projectId")]
    pub project_id: String,
    pub name: String,
    pub kind: ZoneKind,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
}

/// 更新分区请求
#[derive(Debug, Deserialize)]
pub struct UpdateZoneRequest {
    pub name: Option<String>,
    #[serde(rename = "completionPct")]
    pub completion_pct: Option<f64>,
}

/// 级联删除响应
#[derive(Debug, Serialize)]
pub struct DeleteZoneResponse {
    pub ok: bool,
    pub removed: Vec<String>,
}

/// 创建分区管理路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/zones", get(list_zones).post(create_zone))
        .route("/api/zones/:id", patch(update_zone).delete(delete_zone))
}

/// 列出项目的分区
///
/// GET /api/zones?projectId=
async fn list_zones(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ZoneListQuery>,
) -> impl IntoResponse {
    Json(state.zones.list(&query.project_id).await)
}

/// 创建分区
///
/// POST /api/zones
async fn create_zone(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateZoneRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let zone = state
        .zones
        .create(Zone::new(
            request.project_id,
            name,
            request.kind,
            request.parent_id,
        ))
        .await;
    Ok(Json(zone))
}

/// 更新分区名称或完成度
///
/// PATCH /api/zones/:id
async fn update_zone(
    State(state): State<Arc<AppState>>,
    Path(zone_id): Path<String>,
    Json(request): Json<UpdateZoneRequest>,
) -> ApiResult<impl IntoResponse> {
    let zone = state
        .zones
        .update(&zone_id, request.name, request.completion_pct)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Zone '{}'", zone_id)))?;
    Ok(Json(zone))
}

/// 级联删除分区
///
/// DELETE /api/zones/:id
///
/// 返回被删除的全部分区 ID（含后代）
async fn delete_zone(
    State(state): State<Arc<AppState>>,
    Path(zone_id): Path<String>,
) -> impl IntoResponse {
    let removed = state.zones.delete_cascade(&zone_id).await;
    tracing::info!(zone_id = %zone_id, removed = removed.len(), "Zone deleted");
    Json(DeleteZoneResponse { ok: true, removed })
}
