//! 进度指标分配
//!
//! 把一次体积对比的原始结果换算成总体进度、每个叶子分区的
//! 进度分配、置信度标签和完工预测

use chrono::{DateTime, Duration, Utc};

use crate::domain::run::{Confidence, ZoneMetric};
use crate::domain::zone::Zone;

/// 一次分配的完整结果
#[derive(Clone, Debug)]
pub struct Distribution {
    pub overall_progress_pct: f64,
    pub per_zone: Vec<ZoneMetric>,
    pub confidence: Confidence,
}

/// 计算总体进度百分比
///
/// (v2 - v1) / |v1| * 100，夹到 [0, 100]。
/// 任一体积 <= 0 时定义为 0，防止除零和外部引擎给出的非物理负体积
pub fn overall_progress(volume_t1: f64, volume_t2: f64) -> f64 {
    if volume_t1 <= 0.0 || volume_t2 <= 0.0 {
        return 0.0;
    }
    let delta = volume_t2 - volume_t1;
    (delta / volume_t1.abs() * 100.0).clamp(0.0, 100.0)
}

/// 体积变化幅度 -> 置信度标签
///
/// 阈值只看绝对值，严格小于
pub fn confidence(volume_change: f64) -> Confidence {
    let mag = volume_change.abs();
    if mag < 1.0 {
        Confidence::High
    } else if mag < 10.0 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// 线性速率完工预测
///
/// daysLeft = round((100 - 进度) * 0.6)，不为负，加到当前时间上。
/// 只是启发式外推，不是统计预测
pub fn forecast_completion(overall_progress_pct: f64) -> DateTime<Utc> {
    let days_left = ((100.0 - overall_progress_pct) * 0.6).round().max(0.0) as i64;
    Utc::now() + Duration::days(days_left)
}

/// 将总体进度分配到叶子分区
///
/// 第 i 个叶子（1 起）的权重 w_i = n <= 1 ? 1 : i/n，
/// 进度 = clamp(总体 * (0.7 + 0.6 * w_i), 0, 100)，保留一位小数；
/// 体积变化按叶子数量均分。
///
/// 注意：这是按位置单调的启发式分配，排序靠后的叶子拿到系统性
/// 更高的进度，没有物理含义，保留是为了与既有产出保持一致
pub fn distribute(volume_t1: f64, volume_t2: f64, leaves: &[Zone]) -> Distribution {
    let overall = overall_progress(volume_t1, volume_t2);
    let volume_change = volume_t2 - volume_t1;
    let n = leaves.len();

    let per_zone = leaves
        .iter()
        .enumerate()
        .map(|(i, zone)| {
            let w = if n <= 1 { 1.0 } else { (i + 1) as f64 / n as f64 };
            let pct = (overall * (0.7 + 0.6 * w)).clamp(0.0, 100.0);
            ZoneMetric {
                zone_id: zone.id.clone(),
                progress_pct: (pct * 10.0).round() / 10.0,
                volume_change_m3: volume_change / n.max(1) as f64,
            }
        })
        .collect();

    Distribution {
        overall_progress_pct: overall,
        per_zone,
        confidence: confidence(volume_change),
    }
}
