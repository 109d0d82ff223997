//! 项目存储

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::project::Project;

/// 项目存储
pub struct ProjectStore {
    projects: RwLock<HashMap<String, Project>>,
}

impl ProjectStore {
    /// 创建新的项目存储
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(HashMap::new()),
        }
    }

    /// 创建项目
    pub async fn create(&self, project: Project) -> Project {
        let mut projects = self.projects.write().await;
        projects.insert(project.id.clone(), project.clone());
        project
    }

    /// 获取项目
    pub async fn get(&self, project_id: &str) -> Option<Project> {
        let projects = self.projects.read().await;
        projects.get(project_id).cloned()
    }

    /// 获取所有项目（创建时间正序）
    pub async fn list(&self) -> Vec<Project> {
        let projects = self.projects.read().await;
        let mut list: Vec<Project> = projects.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        list
    }

    /// 项目数量
    pub async fn count(&self) -> usize {
        let projects = self.projects.read().await;
        projects.len()
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list() {
        let store = ProjectStore::new();
        assert_eq!(store.count().await, 0);

        let project = store.create(Project::new("Tower A")).await;
        assert_eq!(store.count().await, 1);
        assert_eq!(store.get(&project.id).await.unwrap().name, "Tower A");
        assert_eq!(store.list().await.len(), 1);
    }
}
