//! 对比任务存储
//!
//! 任务记录只增不删；终态一旦写入就不再改变

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::run::{ComparisonRun, RunOutcome, RunStatus};

/// 任务存储
pub struct RunStore {
    runs: RwLock<HashMap<String, ComparisonRun>>,
}

impl RunStore {
    /// 创建新的任务存储
    pub fn new() -> Self {
        Self {
            runs: RwLock::new(HashMap::new()),
        }
    }

    /// 持久化新任务
    pub async fn create(&self, run: ComparisonRun) -> String {
        let run_id = run.id.clone();
        let mut runs = self.runs.write().await;
        runs.insert(run_id.clone(), run);
        run_id
    }

    /// 获取任务
    pub async fn get(&self, run_id: &str) -> Option<ComparisonRun> {
        let runs = self.runs.read().await;
        runs.get(run_id).cloned()
    }

    /// 获取项目的所有任务（创建时间倒序）
    pub async fn list(&self, project_id: &str) -> Vec<ComparisonRun> {
        let runs = self.runs.read().await;
        let mut list: Vec<ComparisonRun> = runs
            .values()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        list
    }

    /// 获取项目已完成的任务（创建时间正序，用于趋势统计）
    pub async fn done_runs(&self, project_id: &str) -> Vec<ComparisonRun> {
        let runs = self.runs.read().await;
        let mut list: Vec<ComparisonRun> = runs
            .values()
            .filter(|r| r.project_id == project_id && r.status == RunStatus::Done)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        list
    }

    /// 活跃任务数量（非终态）
    pub async fn active_count(&self) -> usize {
        let runs = self.runs.read().await;
        runs.values().filter(|r| !r.status.is_terminal()).count()
    }

    /// 标记任务进入处理中
    ///
    /// 仅允许从 queued 迁移；记录不存在或状态不符时返回 false
    pub async fn mark_processing(&self, run_id: &str) -> bool {
        let mut runs = self.runs.write().await;
        match runs.get_mut(run_id) {
            Some(run) if run.status == RunStatus::Queued => {
                run.status = RunStatus::Processing;
                true
            }
            _ => false,
        }
    }

    /// 写入完成结果
    ///
    /// 终态记录不可覆盖；记录不存在或已是终态时返回 false
    pub async fn finish_done(&self, run_id: &str, outcome: RunOutcome) -> bool {
        let mut runs = self.runs.write().await;
        match runs.get_mut(run_id) {
            Some(run) if !run.status.is_terminal() => {
                run.status = RunStatus::Done;
                run.error = None;
                run.alignment_confidence = outcome.confidence;
                run.volume_t1_m3 = outcome.volume_t1_m3;
                run.volume_t2_m3 = outcome.volume_t2_m3;
                run.volume_change_m3 = outcome.volume_change_m3;
                run.overall_progress_pct = outcome.overall_progress_pct;
                run.forecast_completion = Some(outcome.forecast_completion);
                run.metrics_by_zone = outcome.metrics_by_zone;
                true
            }
            _ => false,
        }
    }

    /// 写入失败结果
    pub async fn finish_failed(&self, run_id: &str, error: String) -> bool {
        let mut runs = self.runs.write().await;
        match runs.get_mut(run_id) {
            Some(run) if !run.status.is_terminal() => {
                run.status = RunStatus::Failed;
                run.error = Some(error);
                true
            }
            _ => false,
        }
    }
}

impl Default for RunStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::run::Confidence;
    use chrono::Utc;

    fn outcome() -> RunOutcome {
        RunOutcome {
            confidence: Confidence::Medium,
            volume_t1_m3: 100.0,
            volume_t2_m3: 108.0,
            volume_change_m3: 8.0,
            overall_progress_pct: 8.0,
            forecast_completion: Utc::now(),
            metrics_by_zone: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_run_lifecycle() {
        let store = RunStore::new();
        let run = ComparisonRun::new_queued("p1", "s1", "s2");
        let run_id = store.create(run).await;

        assert!(store.mark_processing(&run_id).await);
        assert_eq!(
            store.get(&run_id).await.unwrap().status,
            RunStatus::Processing
        );

        assert!(store.finish_done(&run_id, outcome()).await);
        let done = store.get(&run_id).await.unwrap();
        assert_eq!(done.status, RunStatus::Done);
        assert_eq!(done.volume_t2_m3, 108.0);
        assert!(done.forecast_completion.is_some());
    }

    #[tokio::test]
    async fn test_terminal_state_is_final() {
        let store = RunStore::new();
        let run_id = store.create(ComparisonRun::new_queued("p1", "s1", "s2")).await;

        store.mark_processing(&run_id).await;
        assert!(store.finish_failed(&run_id, "engine down".to_string()).await);

        // 终态之后的任何迁移都被拒绝
        assert!(!store.finish_done(&run_id, outcome()).await);
        assert!(!store.mark_processing(&run_id).await);

        let run = store.get(&run_id).await.unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.error.as_deref(), Some("engine down"));
    }

    #[tokio::test]
    async fn test_mark_processing_requires_queued() {
        let store = RunStore::new();
        let run_id = store.create(ComparisonRun::new_queued("p1", "s1", "s2")).await;

        assert!(store.mark_processing(&run_id).await);
        // 重复进入 processing 被拒绝（每个 run 只处理一次）
        assert!(!store.mark_processing(&run_id).await);
        // 不存在的记录
        assert!(!store.mark_processing("missing").await);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = RunStore::new();
        let mut first = ComparisonRun::new_queued("p1", "s1", "s2");
        first.created_at = Utc::now() - chrono::Duration::minutes(5);
        let first_id = first.id.clone();
        store.create(first).await;
        let second_id = store.create(ComparisonRun::new_queued("p1", "s1", "s3")).await;
        store.create(ComparisonRun::new_queued("other", "s1", "s2")).await;

        let list = store.list("p1").await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, second_id);
        assert_eq!(list[1].id, first_id);
    }

    #[tokio::test]
    async fn test_done_runs_filters_and_orders() {
        let store = RunStore::new();
        let mut old = ComparisonRun::new_queued("p1", "s1", "s2");
        old.created_at = Utc::now() - chrono::Duration::days(2);
        let old_id = old.id.clone();
        store.create(old).await;
        let new_id = store.create(ComparisonRun::new_queued("p1", "s2", "s3")).await;
        let failed_id = store.create(ComparisonRun::new_queued("p1", "s3", "s4")).await;

        for id in [&old_id, &new_id, &failed_id] {
            store.mark_processing(id).await;
        }
        store.finish_done(&old_id, outcome()).await;
        store.finish_done(&new_id, outcome()).await;
        store.finish_failed(&failed_id, "boom".to_string()).await;

        let done = store.done_runs("p1").await;
        assert_eq!(done.len(), 2);
        assert_eq!(done[0].id, old_id);
        assert_eq!(done[1].id, new_id);
    }
}
