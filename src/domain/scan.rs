//! 扫描领域模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 已上传的 3D 扫描
///
/// 创建后不可变，删除时需要同时释放底层文件
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub size_bytes: u64,
    /// 用户声明的采集时间
    #[serde(rename = "capturedAtISO")]
    pub captured_at: DateTime<Utc>,
    #[serde(rename = "uploadedAtISO")]
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// 存储文件路径（blob 引用）
    #[serde(skip_serializing)]
    pub file_path: String,
}

impl Scan {
    /// 登记新扫描
    pub fn new(
        project_id: impl Into<String>,
        name: impl Into<String>,
        file_path: impl Into<String>,
        size_bytes: u64,
        captured_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            name: name.into(),
            size_bytes,
            captured_at,
            uploaded_at: Utc::now(),
            notes,
            file_path: file_path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_serialization_hides_file_path() {
        let scan = Scan::new("p1", "t1.ply", "/data/scans/t1.ply", 1024, Utc::now(), None);
        let json = serde_json::to_string(&scan).unwrap();
        assert!(json.contains("\"sizeBytes\":1024"));
        assert!(json.contains("capturedAtISO"));
        // 文件路径属于内部存储细节，不对外暴露
        assert!(!json.contains("file_path"));
        assert!(!json.contains("/data/scans"));
    }
}
