//! SiteTrack Server - 工地进度跟踪后端
//!
//! 对比两次 3D 扫描的体积差，按分区树分配进度指标，
//! 并通过 SSE 向订阅者广播任务生命周期事件

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::env::constants::EVENT_SWEEP_INTERVAL_SECS;
use crate::config::EnvConfig;
use crate::state::AppState;

/// 初始化并运行服务
pub async fn init_and_run(config: EnvConfig) {
    let port = config.port;
    let state = Arc::new(AppState::new(config));

    // 演示项目（首次启动时）
    let demo_project_id = state.ensure_demo_project().await;
    info!(project_id = %demo_project_id, "Demo project ready");

    // 事件通道清扫
    let sweep_state = state.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(EVENT_SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            sweep_state.events.sweep().await;
        }
    });

    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {}: {}", addr, e));
    info!(addr = %addr, "Backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// 等待 Ctrl-C
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
