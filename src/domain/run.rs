//! 对比任务领域模型
//!
//! 一次 run = 对同一项目的两个扫描做一次体积对比

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 任务状态
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Processing,
    Done,
    Failed,
}

impl RunStatus {
    /// 转换为字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::Processing => "processing",
            RunStatus::Done => "done",
            RunStatus::Failed => "failed",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Done | RunStatus::Failed)
    }
}

/// 对齐置信度
///
/// 仅根据体积变化幅度得出的粗粒度可靠性标签
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// 转换为字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

/// 单个叶子分区的进度分配
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneMetric {
    pub zone_id: String,
    pub progress_pct: f64,
    pub volume_change_m3: f64,
}

/// 对比任务
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRun {
    pub id: String,
    pub project_id: String,
    #[serde(rename = "createdAtISO")]
    pub created_at: DateTime<Utc>,
    pub t1_scan_id: String,
    pub t2_scan_id: String,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub alignment_confidence: Confidence,
    #[serde(rename = "volumeT1M3")]
    pub volume_t1_m3: f64,
    #[serde(rename = "volumeT2M3")]
    pub volume_t2_m3: f64,
    pub volume_change_m3: f64,
    pub overall_progress_pct: f64,
    #[serde(rename = "forecastCompletionISO", skip_serializing_if = "Option::is_none")]
    pub forecast_completion: Option<DateTime<Utc>>,
    pub metrics_by_zone: Vec<ZoneMetric>,
}

impl ComparisonRun {
    /// 创建排队中的任务
    pub fn new_queued(
        project_id: impl Into<String>,
        t1_scan_id: impl Into<String>,
        t2_scan_id: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            created_at: Utc::now(),
            t1_scan_id: t1_scan_id.into(),
            t2_scan_id: t2_scan_id.into(),
            status: RunStatus::Queued,
            error: None,
            alignment_confidence: Confidence::Medium,
            volume_t1_m3: 0.0,
            volume_t2_m3: 0.0,
            volume_change_m3: 0.0,
            overall_progress_pct: 0.0,
            forecast_completion: None,
            metrics_by_zone: Vec::new(),
        }
    }
}

/// 任务完成时写入的结果字段
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub confidence: Confidence,
    pub volume_t1_m3: f64,
    pub volume_t2_m3: f64,
    pub volume_change_m3: f64,
    pub overall_progress_pct: f64,
    pub forecast_completion: DateTime<Utc>,
    pub metrics_by_zone: Vec<ZoneMetric>,
}

/// 项目事件
///
/// 通过事件总线按项目广播给订阅者
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RunEvent {
    #[serde(rename = "run.created")]
    Created {
        #[serde(rename = "runId")]
        run_id: String,
        status: RunStatus,
    },
    #[serde(rename = "run.progress")]
    Progress {
        #[serde(rename = "runId")]
        run_id: String,
        status: RunStatus,
        pct: u8,
    },
    #[serde(rename = "run.done")]
    Done {
        #[serde(rename = "runId")]
        run_id: String,
        status: RunStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}
