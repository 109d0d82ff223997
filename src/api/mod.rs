//! API 模块
//!
//! HTTP handlers 和路由组装

pub mod dashboard;
pub mod events;
pub mod health;
pub mod projects;
pub mod runs;
pub mod scans;
pub mod zones;

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// 构建完整的 API 路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .merge(health::router())
        // Projects
        .merge(projects::router())
        // Zones
        .merge(zones::router())
        // Scans
        .merge(scans::router())
        // Runs
        .merge(runs::router())
        // Dashboard
        .merge(dashboard::router())
        // Events (SSE)
        .merge(events::router())
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
