//! 应用状态

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::env::constants::DEMO_PROJECT_NAME;
use crate::config::EnvConfig;
use crate::domain::project::Project;
use crate::domain::zone::{Zone, ZoneKind};
use crate::infra::{PythonVolumeDiff, VolumeDiffEngine};

use super::event_hub::EventHub;
use super::project_store::ProjectStore;
use super::run_store::RunStore;
use super::scan_store::ScanStore;
use super::zone_store::ZoneStore;

/// 应用状态
pub struct AppState {
    // ========== 核心配置 ==========
    /// 环境配置
    pub config: EnvConfig,
    /// 服务启动时间
    pub started_at: DateTime<Utc>,

    // ========== 实体存储 ==========
    /// 项目存储
    pub projects: ProjectStore,
    /// 分区存储
    pub zones: ZoneStore,
    /// 扫描存储
    pub scans: ScanStore,
    /// 任务存储
    pub runs: RunStore,

    // ========== 事件与计算 ==========
    /// 事件总线
    pub events: EventHub,
    /// 体积对比引擎
    pub engine: Arc<dyn VolumeDiffEngine>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(config: EnvConfig) -> Self {
        info!(
            port = config.port,
            python = %config.python_bin,
            script = %config.volume_diff_script,
            "Loaded configuration"
        );

        let engine = Arc::new(PythonVolumeDiff::new(
            config.python_bin.clone(),
            config.volume_diff_script.clone(),
        ));

        Self::with_engine(config, engine)
    }

    /// 使用自定义引擎创建（测试注入）
    pub fn with_engine(config: EnvConfig, engine: Arc<dyn VolumeDiffEngine>) -> Self {
        Self {
            config,
            started_at: Utc::now(),
            projects: ProjectStore::new(),
            zones: ZoneStore::new(),
            scans: ScanStore::new(),
            runs: RunStore::new(),
            events: EventHub::new(),
            engine,
        }
    }

    /// 确保演示项目存在
    ///
    /// 没有任何项目时创建演示项目及其根分区，返回演示项目 ID
    pub async fn ensure_demo_project(&self) -> String {
        if let Some(existing) = self.projects.list().await.into_iter().next() {
            return existing.id;
        }

        let project = self.projects.create(Project::new(DEMO_PROJECT_NAME)).await;
        self.zones
            .create(Zone::new(
                project.id.clone(),
                DEMO_PROJECT_NAME,
                ZoneKind::Site,
                None,
            ))
            .await;

        info!(project_id = %project.id, "Seeded demo project");
        project.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_demo_project_is_idempotent() {
        let state = AppState::new(EnvConfig::default());

        let first = state.ensure_demo_project().await;
        let second = state.ensure_demo_project().await;
        assert_eq!(first, second);
        assert_eq!(state.projects.count().await, 1);

        // 根分区同时被创建
        let root = state.zones.find_root(&first).await.unwrap();
        assert_eq!(root.kind, ZoneKind::Site);
        assert!(root.parent_id.is_none());
    }
}
