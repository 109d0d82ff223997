//! 仪表盘聚合
//!
//! 只读取已完成的任务，独立于在线流水线

use serde::Serialize;

use crate::state::AppState;

/// 进度曲线上的一个点
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SeriesPoint {
    /// 任务创建时间
    pub t: String,
    #[serde(rename = "progressPct")]
    pub progress_pct: f64,
}

/// 仪表盘汇总
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub overall_progress_pct: f64,
    pub volume_change_m3: f64,
    #[serde(rename = "forecastCompletionISO")]
    pub forecast_completion: String,
    pub productivity_index: f64,
    pub series: Vec<SeriesPoint>,
}

/// 汇总项目的进度趋势
///
/// 最新一个 done 任务提供当前进度/体积变化/完工预测；
/// 生产力指数 = 日均进度速率相对 5%/天 基线的比值，保留两位小数，
/// 少于两个 done 任务时定义为 1.0
pub async fn summarize(state: &AppState, project_id: &str) -> DashboardSummary {
    let done = state.runs.done_runs(project_id).await;

    let latest = done.last();
    let overall_progress_pct = latest.map_or(0.0, |r| r.overall_progress_pct);
    let volume_change_m3 = latest.map_or(0.0, |r| r.volume_change_m3);
    let forecast_completion = latest
        .and_then(|r| r.forecast_completion)
        .map(|d| d.to_rfc3339())
        .unwrap_or_default();

    let productivity_index = match (done.first(), latest) {
        (Some(earliest), Some(latest)) if done.len() >= 2 => {
            let span_secs = (latest.created_at - earliest.created_at).num_seconds() as f64;
            let days_elapsed = (span_secs / 86_400.0).max(1.0);
            let rate = overall_progress_pct / days_elapsed;
            ((rate / 5.0 * 100.0).round() / 100.0).max(0.0)
        }
        _ => 1.0,
    };

    let series = done
        .iter()
        .map(|r| SeriesPoint {
            t: r.created_at.to_rfc3339(),
            progress_pct: r.overall_progress_pct,
        })
        .collect();

    DashboardSummary {
        overall_progress_pct,
        volume_change_m3,
        forecast_completion,
        productivity_index,
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use crate::config::EnvConfig;
    use crate::domain::run::{ComparisonRun, Confidence, RunOutcome};
    use crate::infra::PythonVolumeDiff;

    fn state() -> AppState {
        AppState::with_engine(
            EnvConfig::default(),
            Arc::new(PythonVolumeDiff::new("python3", "volume_diff.py")),
        )
    }

    /// 写入一个 done 任务，创建时间相对当前偏移 days_ago 天
    async fn seed_done_run(state: &AppState, project: &str, days_ago: i64, progress: f64) {
        let mut run = ComparisonRun::new_queued(project, "s1", "s2");
        run.created_at = Utc::now() - Duration::days(days_ago);
        let run_id = state.runs.create(run).await;
        state.runs.mark_processing(&run_id).await;
        state
            .runs
            .finish_done(
                &run_id,
                RunOutcome {
                    confidence: Confidence::Medium,
                    volume_t1_m3: 100.0,
                    volume_t2_m3: 100.0 + progress,
                    volume_change_m3: progress,
                    overall_progress_pct: progress,
                    forecast_completion: Utc::now() + Duration::days(10),
                    metrics_by_zone: Vec::new(),
                },
            )
            .await;
    }

    #[tokio::test]
    async fn test_empty_project_defaults() {
        let state = state();
        let summary = summarize(&state, "p1").await;

        assert_eq!(summary.overall_progress_pct, 0.0);
        assert_eq!(summary.volume_change_m3, 0.0);
        assert_eq!(summary.forecast_completion, "");
        assert_eq!(summary.productivity_index, 1.0);
        assert!(summary.series.is_empty());
    }

    #[tokio::test]
    async fn test_single_done_run_uses_baseline_index() {
        let state = state();
        seed_done_run(&state, "p1", 0, 42.0).await;

        let summary = summarize(&state, "p1").await;
        assert_eq!(summary.overall_progress_pct, 42.0);
        assert_eq!(summary.productivity_index, 1.0);
        assert_eq!(summary.series.len(), 1);
        assert!(!summary.forecast_completion.is_empty());
    }

    #[tokio::test]
    async fn test_productivity_index_from_span() {
        let state = state();
        // 10 天前 20%，现在 50% -> 速率 5%/天 -> 指数 1.0
        seed_done_run(&state, "p1", 10, 20.0).await;
        seed_done_run(&state, "p1", 0, 50.0).await;

        let summary = summarize(&state, "p1").await;
        assert_eq!(summary.overall_progress_pct, 50.0);
        assert_eq!(summary.productivity_index, 1.0);
    }

    #[tokio::test]
    async fn test_productivity_index_rounded_two_decimals() {
        let state = state();
        // 2 天跨度，最新 8% -> 速率 4%/天 -> 8/2/5 = 0.8
        seed_done_run(&state, "p1", 2, 3.0).await;
        seed_done_run(&state, "p1", 0, 8.0).await;

        let summary = summarize(&state, "p1").await;
        assert_eq!(summary.productivity_index, 0.8);
    }

    #[tokio::test]
    async fn test_series_is_creation_ordered() {
        let state = state();
        seed_done_run(&state, "p1", 5, 10.0).await;
        seed_done_run(&state, "p1", 3, 20.0).await;
        seed_done_run(&state, "p1", 1, 30.0).await;

        let summary = summarize(&state, "p1").await;
        let pcts: Vec<f64> = summary.series.iter().map(|p| p.progress_pct).collect();
        assert_eq!(pcts, vec![10.0, 20.0, 30.0]);
    }

    #[tokio::test]
    async fn test_failed_runs_are_ignored() {
        let state = state();
        seed_done_run(&state, "p1", 1, 25.0).await;

        let run_id = state
            .runs
            .create(ComparisonRun::new_queued("p1", "s1", "s2"))
            .await;
        state.runs.mark_processing(&run_id).await;
        state.runs.finish_failed(&run_id, "boom".to_string()).await;

        let summary = summarize(&state, "p1").await;
        assert_eq!(summary.series.len(), 1);
        assert_eq!(summary.overall_progress_pct, 25.0);
    }
}
