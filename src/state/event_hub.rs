//! 事件总线
//!
//! 按项目管理广播通道，供 SSE 订阅；投递尽力而为，
//! 不持久化不重放，订阅晚于发布的事件收不到

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::config::env::constants::EVENT_CHANNEL_CAPACITY;
use crate::domain::run::RunEvent;

/// 事件总线
///
/// 进程内唯一实例，启动时构建后通过共享状态传递
pub struct EventHub {
    /// 通道映射 (project_id -> sender)
    channels: RwLock<HashMap<String, broadcast::Sender<RunEvent>>>,
}

impl EventHub {
    /// 创建新的事件总线
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// 向项目的所有订阅者广播事件
    ///
    /// 没有订阅者时事件直接丢弃；慢订阅者只会丢自己的消息，
    /// 不会阻塞发布方
    pub async fn publish(&self, project_id: &str, event: RunEvent) {
        let channels = self.channels.read().await;
        if let Some(sender) = channels.get(project_id) {
            let delivered = sender.send(event).unwrap_or(0);
            debug!(project = %project_id, delivered, "Event published");
        }
    }

    /// 订阅项目事件
    ///
    /// 通道不存在时创建，连接生命周期结束后由清扫回收
    pub async fn subscribe(&self, project_id: &str) -> broadcast::Receiver<RunEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(project_id.to_string())
            .or_insert_with(|| broadcast::channel(EVENT_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// 清理没有活跃订阅者的通道
    pub async fn sweep(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, sender| sender.receiver_count() > 0);
    }

    /// 通道数量
    pub async fn count(&self) -> usize {
        let channels = self.channels.read().await;
        channels.len()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::run::RunStatus;

    fn created(run_id: &str) -> RunEvent {
        RunEvent::Created {
            run_id: run_id.to_string(),
            status: RunStatus::Queued,
        }
    }

    #[tokio::test]
    async fn test_publish_and_subscribe() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe("p1").await;

        hub.publish("p1", created("r1")).await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event, created("r1"));
    }

    #[tokio::test]
    async fn test_subscribers_isolated_by_project() {
        let hub = EventHub::new();
        let mut rx_a = hub.subscribe("project-a").await;
        let mut rx_b = hub.subscribe("project-b").await;

        hub.publish("project-a", created("r1")).await;
        hub.publish("project-b", created("r2")).await;

        // 每个订阅者只收到自己项目的事件
        assert_eq!(rx_a.recv().await.unwrap(), created("r1"));
        assert_eq!(rx_b.recv().await.unwrap(), created("r2"));
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let hub = EventHub::new();
        // 不 panic、不阻塞
        hub.publish("p1", created("r1")).await;
        assert_eq!(hub.count().await, 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let hub = EventHub::new();
        // 先制造一个通道再发布，然后新订阅者加入
        let _early = hub.subscribe("p1").await;
        hub.publish("p1", created("r1")).await;

        let mut late = hub.subscribe("p1").await;
        assert!(late.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sweep_removes_orphan_channels() {
        let hub = EventHub::new();
        {
            let _rx = hub.subscribe("p1").await;
            assert_eq!(hub.count().await, 1);
        }
        // 订阅者全部断开后通道被回收
        hub.sweep().await;
        assert_eq!(hub.count().await, 0);
    }
}
