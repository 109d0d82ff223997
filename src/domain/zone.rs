//! 分区领域模型
//!
//! 工地按 site -> floor -> wing -> zone 组成一棵树，
//! 叶子分区是进度上报的最小单位

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 分区类型
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// 工地根节点（每个项目恰好一个，没有父节点）
    Site,
    Floor,
    Wing,
    Zone,
}

impl ZoneKind {
    /// 转换为字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Site => "site",
            ZoneKind::Floor => "floor",
            ZoneKind::Wing => "wing",
            ZoneKind::Zone => "zone",
        }
    }
}

/// 分区节点
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub kind: ZoneKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub completion_pct: f64,
    #[serde(rename = "createdAtISO")]
    pub created_at: DateTime<Utc>,
}

impl Zone {
    /// 创建新分区
    pub fn new(
        project_id: impl Into<String>,
        name: impl Into<String>,
        kind: ZoneKind,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            name: name.into(),
            kind,
            parent_id,
            completion_pct: 0.0,
            created_at: Utc::now(),
        }
    }
}

/// 计算叶子分区集合
///
/// 叶子 = 没有被任何其他分区引用为父节点的分区。
/// 保持输入顺序，线性时间。父节点 ID 悬空的分区（级联删除竞态）
/// 按普通候选节点处理，不报错。
pub fn leaf_zones(zones: &[Zone]) -> Vec<Zone> {
    let ids: HashSet<&str> = zones.iter().map(|z| z.id.as_str()).collect();

    let mut has_child: HashSet<&str> = HashSet::new();
    for z in zones {
        if let Some(ref pid) = z.parent_id {
            if ids.contains(pid.as_str()) {
                has_child.insert(pid.as_str());
            }
        }
    }

    zones
        .iter()
        .filter(|z| !has_child.contains(z.id.as_str()))
        .cloned()
        .collect()
}
