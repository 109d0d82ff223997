//! 分区存储
//!
//! 工地分区树，级联删除通过一次性构建的 parent -> children 索引
//! 加工作队列遍历完成，不使用递归

use std::collections::{HashMap, HashSet, VecDeque};

use tokio::sync::RwLock;

use crate::domain::zone::{Zone, ZoneKind};

/// 分区存储
pub struct ZoneStore {
    zones: RwLock<HashMap<String, Zone>>,
}

impl ZoneStore {
    /// 创建新的分区存储
    pub fn new() -> Self {
        Self {
            zones: RwLock::new(HashMap::new()),
        }
    }

    /// 创建分区
    pub async fn create(&self, zone: Zone) -> Zone {
        let mut zones = self.zones.write().await;
        zones.insert(zone.id.clone(), zone.clone());
        zone
    }

    /// 获取分区
    pub async fn get(&self, zone_id: &str) -> Option<Zone> {
        let zones = self.zones.read().await;
        zones.get(zone_id).cloned()
    }

    /// 获取项目的所有分区
    ///
    /// 按创建时间排序，同一时刻按 id 排序，保证叶子集合顺序稳定
    pub async fn list(&self, project_id: &str) -> Vec<Zone> {
        let zones = self.zones.read().await;
        let mut list: Vec<Zone> = zones
            .values()
            .filter(|z| z.project_id == project_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        list
    }

    /// 查找项目根节点（kind = site）
    pub async fn find_root(&self, project_id: &str) -> Option<Zone> {
        let zones = self.zones.read().await;
        zones
            .values()
            .find(|z| z.project_id == project_id && z.kind == ZoneKind::Site)
            .cloned()
    }

    /// 更新分区名称和完成度
    pub async fn update(
        &self,
        zone_id: &str,
        name: Option<String>,
        completion_pct: Option<f64>,
    ) -> Option<Zone> {
        let mut zones = self.zones.write().await;
        let zone = zones.get_mut(zone_id)?;
        if let Some(name) = name {
            zone.name = name;
        }
        if let Some(pct) = completion_pct {
            zone.completion_pct = pct.clamp(0.0, 100.0);
        }
        Some(zone.clone())
    }

    /// 更新完成度
    ///
    /// 分区不存在时返回 false；流水线对根节点的写入是尽力而为的
    pub async fn update_completion(&self, zone_id: &str, pct: f64) -> bool {
        let mut zones = self.zones.write().await;
        match zones.get_mut(zone_id) {
            Some(zone) => {
                zone.completion_pct = pct.clamp(0.0, 100.0);
                true
            }
            None => false,
        }
    }

    /// 级联删除分区及其全部后代
    ///
    /// 返回被删除的分区 ID 列表；起始分区不存在时返回空列表
    pub async fn delete_cascade(&self, zone_id: &str) -> Vec<String> {
        let mut zones = self.zones.write().await;
        if !zones.contains_key(zone_id) {
            return Vec::new();
        }

        let to_remove = {
            // 一次性构建 parent -> children 索引
            let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
            for zone in zones.values() {
                if let Some(ref pid) = zone.parent_id {
                    children.entry(pid.as_str()).or_default().push(zone.id.as_str());
                }
            }

            // 工作队列收集待删除集合
            let mut to_remove: HashSet<String> = HashSet::new();
            let mut queue: VecDeque<&str> = VecDeque::new();
            queue.push_back(zone_id);
            while let Some(cur) = queue.pop_front() {
                if !to_remove.insert(cur.to_string()) {
                    continue;
                }
                if let Some(kids) = children.get(cur) {
                    for kid in kids {
                        queue.push_back(kid);
                    }
                }
            }
            to_remove
        };

        // 批量移除
        zones.retain(|id, _| !to_remove.contains(id));
        to_remove.into_iter().collect()
    }
}

impl Default for ZoneStore {
    fn default() -> Self {
        Self::new()
    }
}
