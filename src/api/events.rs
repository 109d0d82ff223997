//! 事件订阅 API
//!
//! 按项目订阅任务生命周期事件的 SSE 流

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use std::{convert::Infallible, sync::Arc};
use tokio::sync::broadcast;
use tracing::warn;

use crate::state::AppState;

/// 订阅查询参数
#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    #[serde(rename = "projectId")]
    pub project_id: String,
}

/// 创建事件订阅路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/events", get(subscribe_events))
}

/// 订阅项目事件流
///
/// GET /api/events?projectId=
///
/// 投递尽力而为：连接晚于事件发布就收不到该事件；
/// 订阅者断开对任务处理没有任何影响
async fn subscribe_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubscribeQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.events.subscribe(&query.project_id).await;
    let project_id = query.project_id;

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let json = serde_json::to_string(&event).unwrap_or_default();
                    yield Ok(Event::default().data(json));
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // 慢消费者只丢自己的消息
                    warn!(project = %project_id, lagged = n, "Event subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("keepalive"),
    )
}
