//! 扫描管理 API
//!
//! 登记已存储的扫描文件元数据；文件本体的上传/存储由外部负责

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::scan::Scan;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 扫描列表查询参数
#[derive(Debug, Deserialize)]
pub struct ScanListQuery {
    #[serde(rename = "projectId")]
    pub project_id: String,
}

/// 登记扫描请求
#[derive(Debug, Deserialize)]
pub struct RegisterScanRequest {
    #[serde(rename = "projectId")]
    pub project_id: String,
    pub name: String,
    /// 已存储文件的路径
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// 用户声明的采集时间，缺省为当前时间
    #[serde(rename = "capturedAtISO")]
    pub captured_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// 删除扫描响应
#[derive(Debug, Serialize)]
pub struct DeleteScanResponse {
    pub ok: bool,
}

/// 创建扫描管理路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/scans", get(list_scans).post(register_scan))
        .route("/api/scans/:id", delete(delete_scan))
}

/// 列出项目的扫描
///
/// GET /api/scans?projectId=
async fn list_scans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScanListQuery>,
) -> impl IntoResponse {
    Json(state.scans.list(&query.project_id).await)
}

/// 登记扫描
///
/// POST /api/scans
///
/// 文件大小从磁盘读取，文件不可访问时记 0（元数据不阻塞登记）
async fn register_scan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterScanRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.file_path.is_empty() {
        return Err(ApiError::bad_request("filePath is required"));
    }

    let size_bytes = tokio::fs::metadata(&request.file_path)
        .await
        .map(|m| m.len())
        .unwrap_or(0);

    let scan = state
        .scans
        .create(Scan::new(
            request.project_id,
            request.name,
            request.file_path,
            size_bytes,
            request.captured_at.unwrap_or_else(Utc::now),
            request.notes,
        ))
        .await;

    tracing::info!(scan_id = %scan.id, project = %scan.project_id, size = size_bytes, "Scan registered");
    Ok(Json(scan))
}

/// 删除扫描并释放底层文件
///
/// DELETE /api/scans/:id
async fn delete_scan(
    State(state): State<Arc<AppState>>,
    Path(scan_id): Path<String>,
) -> impl IntoResponse {
    if let Some(scan) = state.scans.delete(&scan_id).await {
        // 文件删除尽力而为，失败不影响记录删除
        if let Err(e) = tokio::fs::remove_file(&scan.file_path).await {
            tracing::warn!(scan_id = %scan_id, error = %e, "Failed to remove scan file");
        }
    }
    Json(DeleteScanResponse { ok: true })
}
