//! 项目领域模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 工程项目
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(rename = "createdAtISO")]
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// 创建新项目
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}
