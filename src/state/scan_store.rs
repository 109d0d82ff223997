//! 扫描存储

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::scan::Scan;

/// 扫描存储
pub struct ScanStore {
    scans: RwLock<HashMap<String, Scan>>,
}

impl ScanStore {
    /// 创建新的扫描存储
    pub fn new() -> Self {
        Self {
            scans: RwLock::new(HashMap::new()),
        }
    }

    /// 登记扫描
    pub async fn create(&self, scan: Scan) -> Scan {
        let mut scans = self.scans.write().await;
        scans.insert(scan.id.clone(), scan.clone());
        scan
    }

    /// 获取扫描
    pub async fn get(&self, scan_id: &str) -> Option<Scan> {
        let scans = self.scans.read().await;
        scans.get(scan_id).cloned()
    }

    /// 获取项目的所有扫描（上传时间倒序）
    pub async fn list(&self, project_id: &str) -> Vec<Scan> {
        let scans = self.scans.read().await;
        let mut list: Vec<Scan> = scans
            .values()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        list
    }

    /// 删除扫描，返回被删除的记录
    ///
    /// 调用方负责释放底层文件
    pub async fn delete(&self, scan_id: &str) -> Option<Scan> {
        let mut scans = self.scans.write().await;
        scans.remove(scan_id)
    }
}

impl Default for ScanStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_create_get_delete() {
        let store = ScanStore::new();
        let scan = store
            .create(Scan::new("p1", "t1.ply", "/tmp/t1.ply", 42, Utc::now(), None))
            .await;

        assert!(store.get(&scan.id).await.is_some());

        let removed = store.delete(&scan.id).await.unwrap();
        assert_eq!(removed.file_path, "/tmp/t1.ply");
        assert!(store.get(&scan.id).await.is_none());
        assert!(store.delete(&scan.id).await.is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_project() {
        let store = ScanStore::new();
        store
            .create(Scan::new("p1", "a.ply", "/tmp/a", 1, Utc::now(), None))
            .await;
        store
            .create(Scan::new("p2", "b.ply", "/tmp/b", 1, Utc::now(), None))
            .await;

        assert_eq!(store.list("p1").await.len(), 1);
        assert_eq!(store.list("p2").await.len(), 1);
        assert!(store.list("p3").await.is_empty());
    }
}
